use std::fmt::Debug;
use crate::error::Result;

/// A flat numeric buffer holding the packed feature vectors of a batch.
pub trait Vector: Debug + Clone + Send + Sync + 'static {
    /// Number of scalar elements in the buffer
    fn len(&self) -> usize;

    /// Whether the buffer holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out the elements in `start..end`
    fn slice(&self, start: usize, end: usize) -> Result<Self>;
}

/// The execution context a sequence's vectors are created in.
///
/// Creators are shared by reference between every node of a graph, so cloning
/// should be cheap.
pub trait Creator: Debug + Clone + Send + Sync + 'static {
    /// The vector type produced by this creator
    type Vector: Vector;

    /// Concatenate `vectors` end to end, in the order supplied.
    ///
    /// Concatenating an empty slice yields an empty vector.
    fn concat(&self, vectors: &[Self::Vector]) -> Result<Self::Vector>;
}
