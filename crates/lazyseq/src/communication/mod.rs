//! # Streams
//!
//! Batch streams are the only synchronization primitive between the tasks of
//! a sequence graph: forward producers, tape writers and propagation workers
//! all talk through [`BatchStream`]s.

pub mod constant;
mod batch_stream;
mod forward;

pub use batch_stream::{BatchSender, BatchStream};
pub use forward::Forward;
