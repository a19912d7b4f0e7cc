//! # Sequences
//!
//! The contracts every node of a lazy sequence graph satisfies.
//!
//! * [`Seq`] - a forward stream plus a streaming backward pass
//! * [`Rereader`] - a [`Seq`] whose past steps can be replayed
//! * [`EagerSeq`] - a fully materialized sequence, bridged to the lazy world
//!   by [`lazify`](crate::lazify::lazify) and [`unlazify`](crate::lazify::unlazify)

mod core_trait;

pub use core_trait::*;
