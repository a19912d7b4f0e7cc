//! # Lazify / Unlazify
//!
//! Bridges between fully materialized sequences ([`EagerSeq`](crate::seq::EagerSeq))
//! and lazily streamed ones ([`Seq`](crate::seq::Seq)).
//!
//! Eager propagation takes gradients in natural step order, while lazy
//! gradient streams deliver the last step first. Both adapters convert between
//! the two conventions.

mod const_seq;
mod lazified;
mod unlazify;

pub use const_seq::ConstSeq;
pub use lazified::{lazify, Lazified};
pub use unlazify::{unlazify, Unlazified};
