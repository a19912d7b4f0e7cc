//! Rank-1 burn tensors as packed vectors.
use super::{Creator, Vector};
use crate::error::{Result, SeqError};
use burn::prelude::{Backend as BurnBackend, Tensor};

impl<B> Vector for Tensor<B, 1>
where
    B: BurnBackend,
{
    fn len(&self) -> usize {
        self.dims()[0]
    }

    fn slice(&self, start: usize, end: usize) -> Result<Self> {
        let len = self.dims()[0];
        if start > end || end > len {
            return Err(SeqError::backend(format!(
                "slice {}..{} out of range for tensor of length {}", start, end, len
            )));
        }
        Ok(self.clone().narrow(0, start, end - start))
    }
}

/// Creator for rank-1 burn tensors on `device`.
#[derive(Debug, Clone)]
pub struct BurnCreator<B: BurnBackend> {
    pub device: B::Device,
}

impl<B: BurnBackend> BurnCreator<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B> Creator for BurnCreator<B>
where
    B: BurnBackend,
{
    type Vector = Tensor<B, 1>;

    fn concat(&self, vectors: &[Self::Vector]) -> Result<Self::Vector> {
        if vectors.is_empty() {
            return Ok(Tensor::zeros([0], &self.device));
        }
        Ok(Tensor::cat(vectors.to_vec(), 0))
    }
}
