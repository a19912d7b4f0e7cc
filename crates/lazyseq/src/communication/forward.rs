use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use crate::batch::Batch;
use super::BatchStream;

/// The forward output of a lazy sequence.
///
/// Shared by every holder of the sequence, so it hands out batches through
/// `&self`. Each batch is delivered once, to whichever caller asks first.
pub struct Forward<V> {
    stream: Mutex<BatchStream<V>>,
    consumed: AtomicBool,
}

impl<V> Forward<V> {
    pub fn new(stream: BatchStream<V>) -> Self {
        Self {
            stream: Mutex::new(stream),
            consumed: AtomicBool::new(false),
        }
    }

    /// Receives the next forward batch, or `None` once the sequence has ended.
    pub async fn next(&self) -> Option<Batch<V>> {
        self.consumed.store(true, Ordering::SeqCst);
        self.stream.lock().await.recv().await
    }

    /// Reads every remaining forward batch.
    pub async fn collect(&self) -> Vec<Batch<V>> {
        self.consumed.store(true, Ordering::SeqCst);
        let mut stream = self.stream.lock().await;
        let mut res = vec![];
        while let Some(batch) = stream.recv().await {
            res.push(batch);
        }
        res
    }

    /// Discards every remaining forward batch so the producer can finish.
    pub async fn drain(&self) -> usize {
        self.consumed.store(true, Ordering::SeqCst);
        self.stream.lock().await.drain().await
    }

    /// Whether anyone has started reading this forward stream.
    pub fn consumed(&self) -> bool {
        self.consumed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_next_marks_consumed() {
        let fwd = Forward::new(BatchStream::from_batches(vec![
            Batch::new(vec![true], vec![1.0f32]),
            Batch::new(vec![true], vec![2.0f32]),
        ]));
        assert!(!fwd.consumed());
        assert_eq!(fwd.next().await.unwrap().packed, Some(vec![1.0]));
        assert!(fwd.consumed());
        assert_eq!(fwd.drain().await, 1);
        assert!(fwd.next().await.is_none());
    }
}
