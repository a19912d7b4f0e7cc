//! # Pack
//!
//! Batches several sequences into one wider sequence.
//!
//! ```text
//!   seq A (2 lanes, 3 steps)   seq B (1 lane, 5 steps)        pack
//!   t0  [T T]                  [T]                      ->  [T T T]
//!   t1  [T T]                  [T]                      ->  [T T T]
//!   t2  [T T]                  [T]                      ->  [T T T]
//!   t3   --                    [T]                      ->  [F F T]
//!   t4   --                    [T]                      ->  [F F T]
//! ```
//!
//! Gradients flowing back into a pack are split along the same lane ranges
//! and propagated into every input whose variables are being accumulated,
//! one concurrent task per input.

mod engine;
mod state;

pub use engine::Pack;
pub use state::PackLayout;
