use super::{Creator, Vector};
use crate::error::{Result, SeqError};
use candle_core::{DType, Device, Tensor};

impl Vector for Tensor {
    fn len(&self) -> usize {
        self.elem_count()
    }

    fn slice(&self, start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(SeqError::backend(format!("slice {}..{} has start past end", start, end)));
        }
        self.flatten_all()
            .and_then(|flat| flat.narrow(0, start, end - start))
            .map_err(|e| SeqError::backend(e.to_string()))
    }
}

/// Creator for rank-1 candle tensors living on `device`.
#[derive(Debug, Clone)]
pub struct CandleCreator {
    pub device: Device,
    pub dtype: DType,
}

impl CandleCreator {
    pub fn new(device: Device, dtype: DType) -> Self {
        Self { device, dtype }
    }
}

impl Creator for CandleCreator {
    type Vector = Tensor;

    fn concat(&self, vectors: &[Self::Vector]) -> Result<Self::Vector> {
        if vectors.is_empty() {
            return Tensor::zeros(0, self.dtype, &self.device)
                .map_err(|e| SeqError::backend(e.to_string()));
        }
        let flat = vectors
            .iter()
            .map(|t| t.flatten_all())
            .collect::<candle_core::Result<Vec<_>>>()
            .map_err(|e| SeqError::backend(e.to_string()))?;
        Tensor::cat(&flat, 0).map_err(|e| SeqError::backend(e.to_string()))
    }
}
