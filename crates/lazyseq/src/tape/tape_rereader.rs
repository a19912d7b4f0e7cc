use std::sync::Arc;
use async_trait::async_trait;
use crate::autodiff::{Grad, VarSet};
use crate::backend::Creator;
use crate::communication::{BatchStream, Forward};
use crate::error::Result;
use crate::seq::{Rereader, Seq};
use super::Tape;

/// A constant [`Rereader`] replaying a [`Tape`].
pub struct TapeRereader<C, T>
where
    C: Creator,
    T: Tape<C> + ?Sized,
{
    tape: Arc<T>,
    forward: Forward<C::Vector>,
}

impl<C, T> TapeRereader<C, T>
where
    C: Creator,
    T: Tape<C> + ?Sized,
{
    /// Creates a rereader whose forward stream is the whole tape.
    pub fn new(tape: Arc<T>) -> Result<Self> {
        let forward = Forward::new(tape.read(0, None)?);
        Ok(Self { tape, forward })
    }
}

#[async_trait]
impl<C, T> Seq<C> for TapeRereader<C, T>
where
    C: Creator,
    T: Tape<C> + ?Sized,
{
    fn creator(&self) -> &C {
        self.tape.creator()
    }

    fn forward(&self) -> &Forward<C::Vector> {
        &self.forward
    }

    async fn vars(&self) -> Result<VarSet> {
        Ok(VarSet::new())
    }

    async fn propagate(&self, mut upstream: BatchStream<C::Vector>, _grad: &Grad<C::Vector>) -> Result<()> {
        // Callers rely on this to release an unread forward stream.
        self.forward.drain().await;
        upstream.drain().await;
        Ok(())
    }
}

impl<C, T> Rereader<C> for TapeRereader<C, T>
where
    C: Creator,
    T: Tape<C> + ?Sized,
{
    fn reread(&self, start: usize, end: usize) -> Result<BatchStream<C::Vector>> {
        self.tape.read(start, Some(end))
    }
}
