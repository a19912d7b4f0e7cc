//! # Tapes
//!
//! Replay of already-produced steps without recomputation.
//!
//! * [`Tape`] - an append-only recording readable by range
//! * [`ReferenceTape`] - an in-memory tape
//! * [`TapeRereader`] - a constant [`Rereader`](crate::seq::Rereader) over a tape
//! * [`SeqRereader`] - records any [`Seq`](crate::seq::Seq) to a tape as it is produced

mod core_trait;
mod reference;
mod seq_rereader;
mod tape_rereader;

pub use core_trait::Tape;
pub use reference::ReferenceTape;
pub use seq_rereader::SeqRereader;
pub use tape_rereader::TapeRereader;
