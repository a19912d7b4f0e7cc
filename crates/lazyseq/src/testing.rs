//! Instrumented sequences over the `Vec<f32>` backend.
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use async_trait::async_trait;
use crate::autodiff::{Grad, Gradient, VarId, VarSet};
use crate::backend::CpuCreator;
use crate::batch::Batch;
use crate::communication::{BatchStream, Forward};
use crate::error::Result;
use crate::seq::{EagerSeq, Seq};

pub(crate) fn step(present: &[bool], packed: &[f32]) -> Batch<Vec<f32>> {
    Batch::new(present.to_vec(), packed.to_vec())
}

/// `len` steps of `lanes` present lanes, each lane one element wide and
/// holding `base + t`.
pub(crate) fn steps(len: usize, lanes: usize, base: f32) -> Vec<Batch<Vec<f32>>> {
    (0..len)
        .map(|t| Batch::new(vec![true; lanes], vec![base + t as f32; lanes]))
        .collect()
}

async fn accumulate(var: Option<VarId>, grad: &Grad<Vec<f32>>, batches: &[Batch<Vec<f32>>]) {
    let Some(var) = var else { return };
    let total: f32 = batches
        .iter()
        .filter_map(|b| b.packed.as_ref())
        .flat_map(|p| p.iter())
        .sum();
    grad.with(|g| {
        if let Some(acc) = g.get_mut(&var) {
            acc[0] += total;
        }
    })
    .await;
}

/// A lazy sequence fed by a producer task that records when it has sent
/// every batch.
pub(crate) struct ChannelSeq {
    creator: CpuCreator,
    forward: Forward<Vec<f32>>,
    var: Option<VarId>,
    finished: Arc<AtomicBool>,
    propagations: AtomicUsize,
    received: Mutex<Vec<Batch<Vec<f32>>>>,
}

impl ChannelSeq {
    /// A constant sequence
    pub fn new(batches: Vec<Batch<Vec<f32>>>) -> Self {
        Self::build(batches, None)
    }

    /// A sequence depending on one fresh variable
    pub fn with_var(batches: Vec<Batch<Vec<f32>>>) -> Self {
        Self::build(batches, Some(VarId::new()))
    }

    fn build(batches: Vec<Batch<Vec<f32>>>, var: Option<VarId>) -> Self {
        let (tx, rx) = BatchStream::channel();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        tokio::spawn(async move {
            for batch in batches {
                if tx.send(batch).await.is_err() {
                    return;
                }
            }
            flag.store(true, Ordering::SeqCst);
        });
        Self {
            creator: CpuCreator,
            forward: Forward::new(rx),
            var,
            finished,
            propagations: AtomicUsize::new(0),
            received: Mutex::new(vec![]),
        }
    }

    pub fn var(&self) -> VarId {
        self.var.expect("sequence has no variable")
    }

    /// A gradient tracking this sequence's variable
    pub fn gradient(&self) -> Gradient<Vec<f32>> {
        let mut g = Gradient::new();
        g.insert(self.var(), vec![0.0]);
        g
    }

    /// Whether the producer sent every batch
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn propagations(&self) -> usize {
        self.propagations.load(Ordering::SeqCst)
    }

    pub fn received_in_arrival_order(&self) -> Vec<Batch<Vec<f32>>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Seq<CpuCreator> for ChannelSeq {
    fn creator(&self) -> &CpuCreator {
        &self.creator
    }

    fn forward(&self) -> &Forward<Vec<f32>> {
        &self.forward
    }

    async fn vars(&self) -> Result<VarSet> {
        Ok(self.var.into_iter().collect())
    }

    async fn propagate(&self, upstream: BatchStream<Vec<f32>>, grad: &Grad<Vec<f32>>) -> Result<()> {
        self.propagations.fetch_add(1, Ordering::SeqCst);
        self.forward.drain().await;
        let batches = upstream.collect_all().await;
        accumulate(self.var, grad, &batches).await;
        self.received.lock().unwrap().extend(batches);
        Ok(())
    }
}

/// An eager sequence with one variable that records the gradients it gets.
pub(crate) struct RecordingEager {
    creator: CpuCreator,
    outs: Vec<Batch<Vec<f32>>>,
    var: VarId,
    received: Mutex<Vec<Batch<Vec<f32>>>>,
}

impl RecordingEager {
    pub fn new(outs: Vec<Batch<Vec<f32>>>) -> Self {
        Self {
            creator: CpuCreator,
            outs,
            var: VarId::new(),
            received: Mutex::new(vec![]),
        }
    }

    pub fn var(&self) -> VarId {
        self.var
    }

    pub fn gradient(&self) -> Gradient<Vec<f32>> {
        let mut g = Gradient::new();
        g.insert(self.var, vec![0.0]);
        g
    }

    /// Gradients received, in natural step order
    pub fn received(&self) -> Vec<Batch<Vec<f32>>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl EagerSeq<CpuCreator> for RecordingEager {
    fn creator(&self) -> &CpuCreator {
        &self.creator
    }

    fn output(&self) -> &[Batch<Vec<f32>>] {
        &self.outs
    }

    fn vars(&self) -> VarSet {
        [self.var].into_iter().collect()
    }

    async fn propagate(&self, upstream: Vec<Batch<Vec<f32>>>, grad: &Grad<Vec<f32>>) -> Result<()> {
        accumulate(Some(self.var), grad, &upstream).await;
        self.received.lock().unwrap().extend(upstream);
        Ok(())
    }
}
