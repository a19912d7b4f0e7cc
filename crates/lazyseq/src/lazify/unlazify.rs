use std::sync::Arc;
use async_trait::async_trait;
use crate::autodiff::{Grad, VarSet};
use crate::backend::Creator;
use crate::batch::Batch;
use crate::communication::BatchStream;
use crate::error::{Result, SeqError};
use crate::seq::{EagerSeq, Seq};

/// A lazy [`Seq`] read fully into memory.
///
/// Built by [`unlazify`].
pub struct Unlazified<C, S>
where
    C: Creator,
    S: Seq<C> + ?Sized,
{
    seq: Arc<S>,
    outs: Vec<Batch<C::Vector>>,
    vars: VarSet,
}

/// Creates an [`EagerSeq`] by fully reading a lazy one.
///
/// `seq` must be unread: fails with [`SeqError::AlreadyConsumed`] if anything
/// has received from its forward stream. Calling `propagate` on `seq` directly
/// afterwards is not supported.
pub async fn unlazify<C, S>(seq: Arc<S>) -> Result<Unlazified<C, S>>
where
    C: Creator,
    S: Seq<C> + ?Sized,
{
    if seq.forward().consumed() {
        return Err(SeqError::AlreadyConsumed);
    }
    let outs = seq.forward().collect().await;
    let vars = seq.vars().await?;
    Ok(Unlazified { seq, outs, vars })
}

#[async_trait]
impl<C, S> EagerSeq<C> for Unlazified<C, S>
where
    C: Creator,
    S: Seq<C> + ?Sized,
{
    fn creator(&self) -> &C {
        self.seq.creator()
    }

    fn output(&self) -> &[Batch<C::Vector>] {
        &self.outs
    }

    fn vars(&self) -> VarSet {
        self.vars.clone()
    }

    async fn propagate(&self, upstream: Vec<Batch<C::Vector>>, grad: &Grad<C::Vector>) -> Result<()> {
        let stream = BatchStream::from_batches(upstream.into_iter().rev());
        self.seq.propagate(stream, grad).await
    }
}
