use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use lazyseq::autodiff::{Grad, Gradient, VarId, VarSet};
use lazyseq::backend::CpuCreator;
use lazyseq::batch::Batch;
use lazyseq::communication::BatchStream;
use lazyseq::lazify::{lazify, unlazify, ConstSeq};
use lazyseq::pack::Pack;
use lazyseq::seq::{EagerSeq, Rereader, Seq};
use lazyseq::tape::{ReferenceTape, SeqRereader, TapeRereader};

type V = Vec<f32>;

fn steps(len: usize, lanes: usize, base: f32) -> Vec<Batch<V>> {
    (0..len)
        .map(|t| Batch::new(vec![true; lanes], vec![base + t as f32; lanes]))
        .collect()
}

/// An eager sequence with one variable; records gradients in step order.
struct Recorder {
    outs: Vec<Batch<V>>,
    var: VarId,
    seen: Mutex<Vec<Batch<V>>>,
}

impl Recorder {
    fn new(outs: Vec<Batch<V>>) -> Self {
        Self { outs, var: VarId::new(), seen: Mutex::new(vec![]) }
    }
}

#[async_trait]
impl EagerSeq<CpuCreator> for Recorder {
    fn creator(&self) -> &CpuCreator {
        &CpuCreator
    }

    fn output(&self) -> &[Batch<V>] {
        &self.outs
    }

    fn vars(&self) -> VarSet {
        [self.var].into_iter().collect()
    }

    async fn propagate(&self, upstream: Vec<Batch<V>>, grad: &Grad<V>) -> lazyseq::Result<()> {
        let total: f32 = upstream.iter().filter_map(|b| b.packed.as_ref()).flatten().sum();
        grad.with(|g| {
            if let Some(acc) = g.get_mut(&self.var) {
                acc[0] += total;
            }
        })
        .await;
        self.seen.lock().unwrap().extend(upstream);
        Ok(())
    }
}

async fn tape_with(batches: Vec<Batch<V>>) -> Arc<ReferenceTape<CpuCreator>> {
    let (tape, writer) = ReferenceTape::new(CpuCreator);
    for batch in batches {
        writer.send(batch).await.unwrap();
    }
    Arc::new(tape)
}

#[tokio::test]
async fn tape_rereaders_pack_and_replay() {
    let a: TapeRereader<CpuCreator, _> = TapeRereader::new(tape_with(steps(2, 1, 0.0)).await).unwrap();
    let b: TapeRereader<CpuCreator, _> = TapeRereader::new(tape_with(steps(4, 2, 100.0)).await).unwrap();
    let inputs: Vec<Arc<dyn Rereader<CpuCreator>>> = vec![Arc::new(a), Arc::new(b)];
    let pack = Pack::new(CpuCreator, inputs);

    let out = pack.forward().collect().await;
    assert_eq!(out.len(), 4);
    assert_eq!(out[3].present, vec![false, true, true]);
    assert_eq!(out[3].packed, Some(vec![103.0, 103.0]));

    for (start, end) in [(0, 4), (1, 3), (2, 4)] {
        let replay = pack.reread(start, end).unwrap().collect_all().await;
        assert_eq!(replay, out[start..end].to_vec());
    }

    assert!(pack.vars().await.unwrap().is_empty());
    let upstream = BatchStream::from_batches(out.into_iter().rev());
    pack.propagate(upstream, &Grad::new(Gradient::new())).await.unwrap();
}

#[tokio::test]
async fn seq_rereader_records_a_pack_once() {
    let left = Arc::new(lazify::<CpuCreator, _>(ConstSeq::new(CpuCreator, steps(3, 1, 0.0))));
    let right = Arc::new(lazify::<CpuCreator, _>(ConstSeq::new(CpuCreator, steps(1, 1, 50.0))));
    let inputs: Vec<Arc<dyn Seq<CpuCreator>>> = vec![left, right];
    let pack = Arc::new(Pack::new(CpuCreator, inputs));

    let (tape, writer) = ReferenceTape::new(CpuCreator);
    let rereader: SeqRereader<CpuCreator, _, _> = SeqRereader::new(pack.clone(), Arc::new(tape), writer).unwrap();

    let forward = rereader.forward().collect().await;
    assert_eq!(forward.len(), 3);
    assert!(pack.forward().next().await.is_none());

    let first = rereader.reread(0, 3).unwrap().collect_all().await;
    let second = rereader.reread(0, 3).unwrap().collect_all().await;
    assert_eq!(first, forward);
    assert_eq!(second, forward);
}

#[tokio::test]
async fn unlazified_pack_routes_gradients_in_step_order() {
    let a = Arc::new(lazify::<CpuCreator, _>(Recorder::new(steps(2, 1, 0.0))));
    let b = Arc::new(lazify::<CpuCreator, _>(Recorder::new(steps(3, 1, 0.0))));
    let inputs: Vec<Arc<dyn Rereader<CpuCreator>>> = vec![a.clone(), b.clone()];
    let pack = Arc::new(Pack::new(CpuCreator, inputs));

    let eager = unlazify::<CpuCreator, _>(pack.clone()).await.unwrap();
    assert_eq!(eager.output().len(), 3);
    assert!(eager.vars().contains(&a.inner().var));

    // Natural step order: gradient value t + 1 at step t.
    let upstream: Vec<_> = eager
        .output()
        .iter()
        .enumerate()
        .map(|(t, b)| Batch {
            present: b.present.clone(),
            packed: b.packed.as_ref().map(|p| vec![t as f32 + 1.0; p.len()]),
        })
        .collect();

    let mut gradient = Gradient::new();
    gradient.insert(a.inner().var, vec![0.0]);
    gradient.insert(b.inner().var, vec![0.0]);
    let grad = Grad::new(gradient);
    eager.propagate(upstream, &grad).await.unwrap();

    let seen_b: Vec<f32> = b.inner().seen.lock().unwrap().iter().map(|g| g.packed.as_ref().unwrap()[0]).collect();
    assert_eq!(seen_b, vec![1.0, 2.0, 3.0]);
    let g = grad.into_inner().unwrap();
    assert_eq!(g.get(&a.inner().var), Some(&vec![3.0]));
    assert_eq!(g.get(&b.inner().var), Some(&vec![6.0]));
}

#[tokio::test]
async fn unlazify_rejects_a_read_pack() {
    let seq = Arc::new(lazify::<CpuCreator, _>(ConstSeq::new(CpuCreator, steps(2, 1, 0.0))));
    let inputs: Vec<Arc<dyn Seq<CpuCreator>>> = vec![seq];
    let pack = Arc::new(Pack::new(CpuCreator, inputs));
    pack.forward().next().await;
    assert!(matches!(
        unlazify::<CpuCreator, _>(pack).await,
        Err(lazyseq::SeqError::AlreadyConsumed)
    ));
}
