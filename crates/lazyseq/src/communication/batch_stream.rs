use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use futures::Stream;
use tokio::sync::mpsc;
use crate::batch::Batch;
use super::constant::STREAM_CAPACITY;

/// Sending half of a [`BatchStream`]. Dropping every sender closes the stream.
pub type BatchSender<V> = mpsc::Sender<Batch<V>>;

/// # BatchStream
///
/// A time-ordered stream of batches.
///
/// `BatchStream` implements the `Stream` trait from the `futures` crate. It is
/// backed either by a bounded channel fed from another task, or by batches
/// that are already in memory.
///
/// ## Channel-backed streams
///
/// Created with [`BatchStream::channel`]. The channel holds
/// [`STREAM_CAPACITY`] batches, so a sender waits until the previous batch has
/// been taken. The stream ends once every [`BatchSender`] is dropped and the
/// buffered batches are consumed; an ended stream keeps returning `None`.
///
/// Dropping the stream makes the producer's next `send` fail, which producers
/// in this crate treat as a request to stop.
pub struct BatchStream<V> {
    inner: Inner<V>,
}

enum Inner<V> {
    Channel(mpsc::Receiver<Batch<V>>),
    Buffered(VecDeque<Batch<V>>),
}

impl<V> BatchStream<V> {
    /// Creates a connected sender and stream pair.
    pub fn channel() -> (BatchSender<V>, Self) {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        (tx, Self { inner: Inner::Channel(rx) })
    }

    /// Creates a stream replaying batches that already exist.
    pub fn from_batches(batches: impl IntoIterator<Item = Batch<V>>) -> Self {
        Self {
            inner: Inner::Buffered(batches.into_iter().collect()),
        }
    }

    /// Creates a stream that is already closed.
    pub fn empty() -> Self {
        Self::from_batches(vec![])
    }

    /// Receives the next batch, or `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<Batch<V>> {
        match &mut self.inner {
            Inner::Channel(rx) => rx.recv().await,
            Inner::Buffered(batches) => batches.pop_front(),
        }
    }

    /// Reads the remaining batches into memory.
    pub async fn collect_all(mut self) -> Vec<Batch<V>> {
        let mut res = vec![];
        while let Some(batch) = self.recv().await {
            res.push(batch);
        }
        res
    }

    /// Discards the remaining batches, returning how many there were.
    pub async fn drain(&mut self) -> usize {
        let mut count = 0;
        while self.recv().await.is_some() {
            count += 1;
        }
        count
    }
}

// Never pin-projected; batches are moved out by value.
impl<V> Unpin for BatchStream<V> {}

impl<V> Stream for BatchStream<V> {
    type Item = Batch<V>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match &mut self.get_mut().inner {
            Inner::Channel(rx) => rx.poll_recv(cx),
            Inner::Buffered(batches) => Poll::Ready(batches.pop_front()),
        }
    }
}
