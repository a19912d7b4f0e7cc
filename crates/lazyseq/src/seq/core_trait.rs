use async_trait::async_trait;
use crate::autodiff::{Grad, VarSet};
use crate::backend::Creator;
use crate::batch::Batch;
use crate::communication::{BatchStream, Forward};
use crate::error::Result;

/// # Seq
///
/// A lazily computed sequence: a forward stream of batches, one per time step,
/// and a backward entry point taking a stream of gradients.
///
/// ## Forward
///
/// [`Seq::forward`] is consumed once. Sequences backed by a producer task
/// compute step `t + 1` only after step `t` has been received.
///
/// ## Backward
///
/// [`Seq::propagate`] receives one gradient batch per forward step, delivered
/// last step first, and accumulates into `grad`. Implementations must drain
/// their own forward stream before returning, whether or not anybody read it:
/// the producer would otherwise wait forever on its next send.
///
/// ## Variables
///
/// [`Seq::vars`] may only be final after the forward stream has been fully
/// observed, so callers should drain forward first.
#[async_trait]
pub trait Seq<C>: Send + Sync
where
    C: Creator,
{
    /// The execution context of this sequence's vectors
    fn creator(&self) -> &C;

    /// The forward output stream
    fn forward(&self) -> &Forward<C::Vector>;

    /// The variables this sequence's outputs depend on
    async fn vars(&self) -> Result<VarSet>;

    /// Back-propagates `upstream` into `grad`.
    async fn propagate(&self, upstream: BatchStream<C::Vector>, grad: &Grad<C::Vector>) -> Result<()>;
}

/// # Rereader
///
/// A [`Seq`] whose steps can be replayed.
///
/// [`Rereader::reread`] streams the half-open range `[start, end)` of time steps
/// and may be called any number of times, before or after the forward stream is
/// consumed. Rereading the same range twice yields identical batches.
pub trait Rereader<C>: Seq<C>
where
    C: Creator,
{
    /// Streams steps `start..end`.
    fn reread(&self, start: usize, end: usize) -> Result<BatchStream<C::Vector>>;
}

/// # EagerSeq
///
/// A sequence whose every output step is already computed.
///
/// Unlike [`Seq`], propagation takes the full list of upstream gradients in
/// natural step order.
#[async_trait]
pub trait EagerSeq<C>: Send + Sync
where
    C: Creator,
{
    fn creator(&self) -> &C;

    /// Every output step, in order
    fn output(&self) -> &[Batch<C::Vector>];

    fn vars(&self) -> VarSet;

    /// Back-propagates one gradient per output step into `grad`.
    async fn propagate(&self, upstream: Vec<Batch<C::Vector>>, grad: &Grad<C::Vector>) -> Result<()>;
}
