use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, warn};
use crate::autodiff::{Grad, VarSet};
use crate::backend::Creator;
use crate::communication::{BatchSender, BatchStream, Forward};
use crate::error::Result;
use crate::seq::{Rereader, Seq};
use super::Tape;

/// Turns a [`Seq`] into a [`Rereader`] by recording its outputs to a [`Tape`].
///
/// A background task copies every forward batch of the wrapped sequence into
/// the tape's write side, so the wrapped sequence is read exactly once no
/// matter how many rereads follow.
pub struct SeqRereader<C, S, T>
where
    C: Creator,
    S: Seq<C> + ?Sized,
    T: Tape<C> + ?Sized,
{
    seq: Arc<S>,
    tape: Arc<T>,
    forward: Forward<C::Vector>,
}

impl<C, S, T> SeqRereader<C, S, T>
where
    C: Creator,
    S: Seq<C> + ?Sized + 'static,
    T: Tape<C> + ?Sized,
{
    /// Starts recording `seq` into `tape` through `writer`.
    ///
    /// `writer` must be the write side of `tape`; see
    /// [`ReferenceTape::new`](super::ReferenceTape::new).
    pub fn new(seq: Arc<S>, tape: Arc<T>, writer: BatchSender<C::Vector>) -> Result<Self> {
        let recorded = seq.clone();
        tokio::spawn(async move {
            let mut steps = 0usize;
            while let Some(batch) = recorded.forward().next().await {
                if writer.send(batch).await.is_err() {
                    warn!(steps, "tape writer closed early; discarding remaining steps");
                    recorded.forward().drain().await;
                    break;
                }
                steps += 1;
            }
            debug!(steps, "sequence recorded to tape");
        });

        let forward = Forward::new(tape.read(0, None)?);
        Ok(Self { seq, tape, forward })
    }
}

#[async_trait]
impl<C, S, T> Seq<C> for SeqRereader<C, S, T>
where
    C: Creator,
    S: Seq<C> + ?Sized,
    T: Tape<C> + ?Sized,
{
    fn creator(&self) -> &C {
        self.seq.creator()
    }

    fn forward(&self) -> &Forward<C::Vector> {
        &self.forward
    }

    async fn vars(&self) -> Result<VarSet> {
        self.seq.vars().await
    }

    async fn propagate(&self, upstream: BatchStream<C::Vector>, grad: &Grad<C::Vector>) -> Result<()> {
        self.forward.drain().await;
        self.seq.propagate(upstream, grad).await
    }
}

impl<C, S, T> Rereader<C> for SeqRereader<C, S, T>
where
    C: Creator,
    S: Seq<C> + ?Sized,
    T: Tape<C> + ?Sized,
{
    fn reread(&self, start: usize, end: usize) -> Result<BatchStream<C::Vector>> {
        self.tape.read(start, Some(end))
    }
}
