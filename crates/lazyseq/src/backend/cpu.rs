//! Plain `Vec<f32>` backend, always available.
use super::{Creator, Vector};
use crate::error::{Result, SeqError};

impl Vector for Vec<f32> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn slice(&self, start: usize, end: usize) -> Result<Self> {
        self.get(start..end)
            .map(|s| s.to_vec())
            .ok_or_else(|| SeqError::backend(format!(
                "slice {}..{} out of range for vector of length {}", start, end, Vec::len(self)
            )))
    }
}

/// Creator for `Vec<f32>` vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuCreator;

impl Creator for CpuCreator {
    type Vector = Vec<f32>;

    fn concat(&self, vectors: &[Self::Vector]) -> Result<Self::Vector> {
        Ok(vectors.concat())
    }
}
