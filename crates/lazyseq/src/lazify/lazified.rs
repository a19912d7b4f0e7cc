use async_trait::async_trait;
use tracing::debug;
use crate::autodiff::{Grad, VarSet};
use crate::backend::Creator;
use crate::communication::{BatchStream, Forward};
use crate::error::{Result, SeqError};
use crate::seq::{EagerSeq, Rereader, Seq};

/// An [`EagerSeq`] exposed as a lazy [`Rereader`].
///
/// Built by [`lazify`].
pub struct Lazified<C, E>
where
    C: Creator,
{
    seq: E,
    forward: Forward<C::Vector>,
}

/// Creates a lazy sequence out of an eager one.
///
/// The forward stream replays the eager outputs; rereads slice them.
pub fn lazify<C, E>(seq: E) -> Lazified<C, E>
where
    C: Creator,
    E: EagerSeq<C>,
{
    let forward = Forward::new(BatchStream::from_batches(seq.output().to_vec()));
    Lazified { seq, forward }
}

impl<C, E> Lazified<C, E>
where
    C: Creator,
    E: EagerSeq<C>,
{
    /// The wrapped eager sequence
    pub fn inner(&self) -> &E {
        &self.seq
    }
}

#[async_trait]
impl<C, E> Seq<C> for Lazified<C, E>
where
    C: Creator,
    E: EagerSeq<C>,
{
    fn creator(&self) -> &C {
        self.seq.creator()
    }

    fn forward(&self) -> &Forward<C::Vector> {
        &self.forward
    }

    async fn vars(&self) -> Result<VarSet> {
        Ok(self.seq.vars())
    }

    async fn propagate(&self, mut upstream: BatchStream<C::Vector>, grad: &Grad<C::Vector>) -> Result<()> {
        self.forward.drain().await;

        let expected = self.seq.output().len();
        let mut reversed = Vec::with_capacity(expected);
        while reversed.len() < expected {
            match upstream.recv().await {
                Some(batch) => reversed.push(batch),
                None => {
                    return Err(SeqError::TooFewUpstream {
                        expected,
                        actual: reversed.len(),
                    });
                }
            }
        }
        let extra = upstream.drain().await;
        if extra > 0 {
            debug!(expected, extra, "upstream overran lazified sequence");
            return Err(SeqError::TooManyUpstream { expected });
        }

        // Gradients arrive last step first.
        reversed.reverse();
        self.seq.propagate(reversed, grad).await
    }
}

impl<C, E> Rereader<C> for Lazified<C, E>
where
    C: Creator,
    E: EagerSeq<C>,
{
    fn reread(&self, start: usize, end: usize) -> Result<BatchStream<C::Vector>> {
        if start > end {
            return Err(SeqError::InvalidRange { start, end });
        }
        let out = self.seq.output();
        if end > out.len() {
            return Err(SeqError::RangeOutOfBounds { end, len: out.len() });
        }
        Ok(BatchStream::from_batches(out[start..end].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::Gradient;
    use crate::backend::CpuCreator;
    use crate::batch::Batch;
    use crate::testing::{RecordingEager, step};

    fn eager(len: usize) -> RecordingEager {
        RecordingEager::new((0..len).map(|i| step(&[true], &[i as f32])).collect())
    }

    #[tokio::test]
    async fn test_forward_replays_outputs() {
        let lazy = lazify::<CpuCreator, _>(eager(3));
        let got = lazy.forward().collect().await;
        assert_eq!(got, lazy.inner().output().to_vec());
    }

    #[tokio::test]
    async fn test_propagate_restores_step_order() {
        let lazy = lazify::<CpuCreator, _>(eager(3));
        let grad = Grad::new(lazy.inner().gradient());
        let upstream = BatchStream::from_batches(vec![
            step(&[true], &[30.0]),
            step(&[true], &[20.0]),
            step(&[true], &[10.0]),
        ]);
        lazy.propagate(upstream, &grad).await.unwrap();

        let received = lazy.inner().received();
        let firsts: Vec<_> = received.iter().map(|b| b.packed.clone().unwrap()[0]).collect();
        assert_eq!(firsts, vec![10.0, 20.0, 30.0]);
        assert!(lazy.forward().next().await.is_none());
    }

    #[tokio::test]
    async fn test_propagate_too_few() {
        let lazy = lazify::<CpuCreator, _>(eager(3));
        let grad = Grad::new(Gradient::new());
        let upstream = BatchStream::from_batches(vec![step(&[true], &[1.0])]);
        assert_eq!(
            lazy.propagate(upstream, &grad).await,
            Err(SeqError::TooFewUpstream { expected: 3, actual: 1 })
        );
    }

    #[tokio::test]
    async fn test_propagate_too_many() {
        let lazy = lazify::<CpuCreator, _>(eager(1));
        let grad = Grad::new(Gradient::new());
        let upstream = BatchStream::from_batches(vec![step(&[true], &[1.0]), step(&[true], &[2.0])]);
        assert_eq!(
            lazy.propagate(upstream, &grad).await,
            Err(SeqError::TooManyUpstream { expected: 1 })
        );
        assert!(lazy.inner().received().is_empty());
    }

    #[tokio::test]
    async fn test_reread_ranges_concatenate() {
        let lazy = lazify::<CpuCreator, _>(eager(6));
        for (a, b, c) in [(0, 0, 6), (0, 2, 6), (1, 3, 5), (4, 6, 6), (2, 2, 2)] {
            let mut parts = lazy.reread(a, b).unwrap().collect_all().await;
            parts.extend(lazy.reread(b, c).unwrap().collect_all().await);
            let whole = lazy.reread(a, c).unwrap().collect_all().await;
            assert_eq!(parts, whole);
            assert_eq!(whole.len(), c - a);
        }
    }

    #[tokio::test]
    async fn test_reread_bad_ranges() {
        let lazy = lazify::<CpuCreator, _>(eager(2));
        assert!(matches!(lazy.reread(2, 1), Err(SeqError::InvalidRange { start: 2, end: 1 })));
        assert!(matches!(lazy.reread(0, 3), Err(SeqError::RangeOutOfBounds { end: 3, len: 2 })));
        let _: Vec<Batch<Vec<f32>>> = lazy.reread(2, 2).unwrap().collect_all().await;
    }
}
