//! # Batch
//!
//! The per-timestep data unit. A [`Batch`] holds one presence flag per lane and
//! a packed buffer with the feature vectors of the present lanes, concatenated
//! in lane order.

mod operations;

pub use operations::{filler, join, split};

/// All lanes' data at one time index.
///
/// `packed` is `Some` exactly when at least one lane is present, and then
/// holds `num_present() * width` elements. An all-absent batch with no packed
/// data is a *filler* batch: it keeps the lane count of a pack constant after
/// the sequence owning those lanes has ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<V> {
    pub present: Vec<bool>,
    pub packed: Option<V>,
}

impl<V> Batch<V> {
    /// Creates a batch from presence flags and the packed vectors of the present lanes.
    pub fn new(present: Vec<bool>, packed: V) -> Self {
        Self {
            present,
            packed: Some(packed),
        }
    }

    /// Number of lanes, present or not
    pub fn lanes(&self) -> usize {
        self.present.len()
    }

    /// Number of lanes carrying data
    pub fn num_present(&self) -> usize {
        self.present.iter().filter(|p| **p).count()
    }

    /// Whether no lane carries data
    pub fn is_filler(&self) -> bool {
        self.num_present() == 0
    }
}
