use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, error, trace, warn};
use crate::autodiff::{Grad, VarSet};
use crate::backend::Creator;
use crate::batch::{filler, join, split, Batch};
use crate::communication::{BatchSender, BatchStream, Forward};
use crate::core::worker::WorkerGroup;
use crate::error::{Result, SeqError};
use crate::seq::{Rereader, Seq};
use super::state::{Lifecycle, PackLayout, PackState};

/// # Pack
///
/// Several sequences aggregated into one sequence with wider batches.
///
/// At every time step the batches of all inputs are joined in input order.
/// Inputs that already ended contribute filler lanes, so the lane count stays
/// constant and the pack lasts as long as its longest input.
///
/// A pack of [`Rereader`]s is itself a [`Rereader`].
///
/// ## Lifecycle
///
/// A background task produces the forward stream. Once every input is
/// exhausted it records the [`PackLayout`] (lanes and length per input and the
/// merged variables) and only then closes the stream, so a caller that has seen
/// the end of [`Seq::forward`] can rely on [`Pack::layout_now`] succeeding.
pub struct Pack<C, S>
where
    C: Creator,
    S: Seq<C> + ?Sized,
{
    creator: C,
    inputs: Vec<Arc<S>>,
    forward: Forward<C::Vector>,
    lifecycle: Lifecycle,
}

impl<C, S> Pack<C, S>
where
    C: Creator,
    S: Seq<C> + ?Sized + 'static,
{
    /// Packs `inputs` and starts producing the joined forward stream.
    pub fn new(creator: C, inputs: Vec<Arc<S>>) -> Self {
        let (out, stream) = BatchStream::channel();
        let (state, lifecycle) = Lifecycle::new();
        tokio::spawn(produce(creator.clone(), inputs.clone(), out, state));
        Self {
            creator,
            inputs,
            forward: Forward::new(stream),
            lifecycle,
        }
    }
}

impl<C, S> Pack<C, S>
where
    C: Creator,
    S: Seq<C> + ?Sized,
{
    pub fn inputs(&self) -> &[Arc<S>] {
        &self.inputs
    }

    /// The layout, waiting for the forward pass to complete.
    ///
    /// Someone has to drain [`Seq::forward`] for this to return.
    pub async fn layout(&self) -> Result<Arc<PackLayout>> {
        self.lifecycle.wait().await
    }

    /// The layout, failing with [`SeqError::NotFinalized`] while the forward
    /// pass is still running.
    pub fn layout_now(&self) -> Result<Arc<PackLayout>> {
        self.lifecycle.now()
    }
}

async fn produce<C, S>(
    creator: C,
    inputs: Vec<Arc<S>>,
    out: BatchSender<C::Vector>,
    state: watch::Sender<PackState>,
)
where
    C: Creator,
    S: Seq<C> + ?Sized,
{
    let mut lanes_per_seq = vec![0; inputs.len()];
    let mut lens = vec![0; inputs.len()];
    let mut step = 0usize;

    let outcome = loop {
        let mut open = 0;
        let mut batches: Vec<Batch<C::Vector>> = Vec::with_capacity(inputs.len());
        for (idx, input) in inputs.iter().enumerate() {
            match input.forward().next().await {
                Some(batch) => {
                    open += 1;
                    lanes_per_seq[idx] = batch.lanes();
                    lens[idx] += 1;
                    batches.push(batch);
                }
                None => batches.push(filler(lanes_per_seq[idx])),
            }
        }
        if open == 0 {
            break Ok(());
        }

        let joined = match join(&creator, &batches) {
            Ok(joined) => joined,
            Err(e) => break Err(e),
        };
        trace!(step, lanes = joined.lanes(), open, "pack step");
        if out.send(joined).await.is_err() {
            warn!(step, "pack dropped before its forward stream was read");
            break Err(SeqError::worker("pack forward stream dropped"));
        }
        step += 1;
    };

    let outcome = match outcome {
        Ok(()) => merge_vars::<C, S>(&inputs).await,
        Err(e) => {
            error!(error = %e, step, "pack forward failed");
            for input in &inputs {
                input.forward().drain().await;
            }
            Err(e)
        }
    };

    match outcome {
        Ok(vars) => {
            debug!(steps = step, ?lens, ?lanes_per_seq, "pack forward finalized");
            state.send_replace(PackState::Finalized(Arc::new(PackLayout::new(lanes_per_seq, lens, vars))));
        }
        Err(e) => {
            state.send_replace(PackState::Failed(e));
        }
    }
    // Finalize before closing the stream so readers that saw the end can trust the layout.
    drop(out);
}

async fn merge_vars<C, S>(inputs: &[Arc<S>]) -> Result<VarSet>
where
    C: Creator,
    S: Seq<C> + ?Sized,
{
    let mut vars = VarSet::new();
    for input in inputs {
        vars = vars.merge(&input.vars().await?);
    }
    Ok(vars)
}

#[async_trait]
impl<C, S> Seq<C> for Pack<C, S>
where
    C: Creator,
    S: Seq<C> + ?Sized + 'static,
{
    fn creator(&self) -> &C {
        &self.creator
    }

    fn forward(&self) -> &Forward<C::Vector> {
        &self.forward
    }

    async fn vars(&self) -> Result<VarSet> {
        Ok(self.layout().await?.vars().clone())
    }

    async fn propagate(&self, mut upstream: BatchStream<C::Vector>, grad: &Grad<C::Vector>) -> Result<()> {
        self.forward.drain().await;
        let layout = self.layout().await?;

        // Resolve every input's variables before any worker exists.
        let mut input_vars = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            input_vars.push(input.vars().await?);
        }

        let mut workers = WorkerGroup::new();
        let mut downstreams: Vec<Option<BatchSender<C::Vector>>> = Vec::with_capacity(self.inputs.len());
        for (idx, (input, vars)) in self.inputs.iter().zip(&input_vars).enumerate() {
            if !grad.with(|g| g.intersects(vars)).await {
                debug!(input = idx, "no gradient needed; skipping input");
                downstreams.push(None);
                continue;
            }
            let (tx, rx) = BatchStream::channel();
            let input = input.clone();
            let grad = grad.clone();
            workers.spawn(async move { input.propagate(rx, &grad).await });
            downstreams.push(Some(tx));
        }

        debug!(workers = workers.len(), inputs = self.inputs.len(), "propagating pack");
        let mut received = 0;
        let mut failure = None;
        while let Some(up_batch) = upstream.recv().await {
            received += 1;
            if failure.is_some() {
                continue;
            }
            match split(&up_batch, layout.lanes_per_seq()) {
                Ok(parts) => {
                    for (part, downstream) in parts.into_iter().zip(&downstreams) {
                        if let (Some(part), Some(downstream)) = (part, downstream) {
                            // A closed downstream means its worker already failed; wait() reports it.
                            let _ = downstream.send(part).await;
                        }
                    }
                }
                Err(e) => failure = Some(e),
            }
        }

        drop(downstreams);
        let worker_res = workers.wait().await;

        if let Some(e) = failure {
            return Err(e);
        }
        if received != layout.steps() {
            return Err(SeqError::UpstreamLength {
                expected: layout.steps(),
                actual: received,
            });
        }
        worker_res
    }
}

impl<C, S> Rereader<C> for Pack<C, S>
where
    C: Creator,
    S: Rereader<C> + ?Sized + 'static,
{
    fn reread(&self, start: usize, end: usize) -> Result<BatchStream<C::Vector>> {
        let layout = self.layout_now()?;
        if start > end {
            return Err(SeqError::InvalidRange { start, end });
        }
        if end > layout.steps() {
            return Err(SeqError::RangeOutOfBounds {
                end,
                len: layout.steps(),
            });
        }

        // Each source is paired with the step its real data runs up to.
        let mut sources = Vec::with_capacity(self.inputs.len());
        for (input, &len) in self.inputs.iter().zip(layout.lens()) {
            if len <= start {
                sources.push((BatchStream::empty(), start));
            } else {
                let bound = end.min(len);
                sources.push((input.reread(start, bound)?, bound));
            }
        }

        let (tx, stream) = BatchStream::channel();
        let creator = self.creator.clone();
        tokio::spawn(async move {
            'steps: for step in start..end {
                let mut batches = Vec::with_capacity(sources.len());
                for (idx, ((source, bound), &lanes)) in sources.iter_mut().zip(layout.lanes_per_seq()).enumerate() {
                    match source.recv().await {
                        Some(batch) => batches.push(batch),
                        None if step < *bound => {
                            error!(input = idx, step, bound = *bound, "pack input reread ended early");
                            break 'steps;
                        }
                        None => batches.push(filler(lanes)),
                    }
                }
                let joined = match join(&creator, &batches) {
                    Ok(joined) => joined,
                    Err(e) => {
                        error!(error = %e, step, "pack reread failed");
                        break;
                    }
                };
                if tx.send(joined).await.is_err() {
                    trace!(start, step, "pack reread dropped");
                    break;
                }
            }
        });
        Ok(stream)
    }
}
