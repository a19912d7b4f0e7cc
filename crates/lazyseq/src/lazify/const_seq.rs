use async_trait::async_trait;
use crate::autodiff::{Grad, VarSet};
use crate::backend::Creator;
use crate::batch::Batch;
use crate::error::Result;
use crate::seq::EagerSeq;

/// An eager sequence of constant data.
///
/// Depends on no variables, so gradients handed to it are dropped.
#[derive(Debug, Clone)]
pub struct ConstSeq<C>
where
    C: Creator,
{
    creator: C,
    outs: Vec<Batch<C::Vector>>,
}

impl<C> ConstSeq<C>
where
    C: Creator,
{
    pub fn new(creator: C, outs: Vec<Batch<C::Vector>>) -> Self {
        Self { creator, outs }
    }
}

#[async_trait]
impl<C> EagerSeq<C> for ConstSeq<C>
where
    C: Creator,
{
    fn creator(&self) -> &C {
        &self.creator
    }

    fn output(&self) -> &[Batch<C::Vector>] {
        &self.outs
    }

    fn vars(&self) -> VarSet {
        VarSet::new()
    }

    async fn propagate(&self, _upstream: Vec<Batch<C::Vector>>, _grad: &Grad<C::Vector>) -> Result<()> {
        Ok(())
    }
}
