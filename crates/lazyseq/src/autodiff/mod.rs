//! # Variables and Gradients
//!
//! The minimal autodiff surface the sequence core needs: variable identities
//! and sets of them for pruning, and a shared accumulator that concurrent
//! propagation workers write into.

mod grad;
mod gradient;
mod var;

pub use grad::Grad;
pub use gradient::Gradient;
pub use var::{VarId, VarSet};
