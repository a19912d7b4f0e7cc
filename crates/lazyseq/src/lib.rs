//! # lazyseq
//!
//! Lazy, streaming sequence graphs for recurrent models: forward and backward
//! passes are processed one time step at a time instead of materializing a
//! whole sequence in memory.
//!
//! ## Overview
//!
//! A sequence is a time-ordered stream of [`Batch`](batch::Batch)es, one per
//! step. Each batch carries one presence flag per *lane* (one logical
//! sequence's slot) and the packed feature vectors of the present lanes.
//!
//! Key components include:
//!
//! - [`seq::Seq`] - the lazy sequence contract: a forward stream and a
//!   streaming backward pass
//! - [`pack::Pack`] - several sequences of different lengths batched into one
//!   wider sequence
//! - [`seq::Rereader`] and [`tape`] - replay of steps that were already produced
//! - [`lazify`] - bridges between eager and lazy sequences
//!
//! ## Architecture
//!
//! ### Streams
//!
//! Tasks exchange batches over bounded [`BatchStream`](communication::BatchStream)s
//! of capacity one, so a producer never runs more than a step ahead of its
//! consumer. Closing a stream is the only end-of-data signal.
//!
//! ### Gradients
//!
//! Gradient streams run in reverse: the last step's gradient arrives first.
//! [`autodiff::Grad`] is the shared accumulator concurrent propagation
//! workers write into.
//!
//! ### Cleanup
//!
//! Every `propagate` drains its own forward stream, read or not. A producer
//! blocked on an unread stream would otherwise never finish.
//!
//! ## Features
//!
//! - **candle** - Enables the candle backend
//! - **burn** - Enables the burn backend
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lazyseq::backend::CpuCreator;
//! use lazyseq::batch::Batch;
//! use lazyseq::lazify::{lazify, ConstSeq};
//! use lazyseq::pack::Pack;
//! use lazyseq::seq::{Rereader, Seq};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> lazyseq::Result<()> {
//! let short = ConstSeq::new(CpuCreator, vec![Batch::new(vec![true], vec![1.0f32])]);
//! let long = ConstSeq::new(CpuCreator, vec![
//!     Batch::new(vec![true], vec![2.0f32]),
//!     Batch::new(vec![true], vec![3.0f32]),
//! ]);
//! let inputs: Vec<Arc<dyn Rereader<CpuCreator>>> = vec![
//!     Arc::new(lazify::<CpuCreator, _>(short)),
//!     Arc::new(lazify::<CpuCreator, _>(long)),
//! ];
//! let pack = Pack::new(CpuCreator, inputs);
//!
//! let steps = pack.forward().collect().await;
//! assert_eq!(steps[1].present, vec![false, true]);
//!
//! let replay = pack.reread(1, 2)?.collect_all().await;
//! assert_eq!(replay, steps[1..].to_vec());
//! # Ok(())
//! # }
//! ```

mod core;
mod error;

pub mod autodiff;
pub mod backend;
pub mod batch;
pub mod communication;
pub mod lazify;
pub mod pack;
pub mod seq;
pub mod tape;

pub use error::{Result, SeqError};

#[cfg(test)]
pub(crate) mod testing;
