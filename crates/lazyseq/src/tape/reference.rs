use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, trace};
use crate::backend::Creator;
use crate::batch::Batch;
use crate::communication::{BatchSender, BatchStream};
use crate::error::{Result, SeqError};
use super::Tape;

struct TapeLog<V> {
    batches: Vec<Batch<V>>,
    closed: bool,
}

/// An in-memory [`Tape`].
///
/// Batches written to the sender returned by [`ReferenceTape::new`] are
/// appended in order; dropping the sender closes the tape.
pub struct ReferenceTape<C>
where
    C: Creator,
{
    creator: C,
    log: Arc<watch::Sender<TapeLog<C::Vector>>>,
}

impl<C> ReferenceTape<C>
where
    C: Creator,
{
    /// Creates an empty tape and its write side.
    pub fn new(creator: C) -> (Self, BatchSender<C::Vector>) {
        let (log, _) = watch::channel(TapeLog {
            batches: vec![],
            closed: false,
        });
        let log = Arc::new(log);
        let (writer, mut incoming) = BatchStream::channel();

        let ingest = log.clone();
        tokio::spawn(async move {
            while let Some(batch) = incoming.recv().await {
                ingest.send_modify(|log| log.batches.push(batch));
            }
            ingest.send_modify(|log| log.closed = true);
            debug!(len = ingest.borrow().batches.len(), "tape closed");
        });

        (Self { creator, log }, writer)
    }

    /// Number of steps written so far
    pub fn len(&self) -> usize {
        self.log.borrow().batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the write side has been dropped
    pub fn is_closed(&self) -> bool {
        self.log.borrow().closed
    }
}

impl<C> Tape<C> for ReferenceTape<C>
where
    C: Creator,
{
    fn creator(&self) -> &C {
        &self.creator
    }

    fn read(&self, start: usize, end: Option<usize>) -> Result<BatchStream<C::Vector>> {
        if let Some(end) = end {
            if start > end {
                return Err(SeqError::InvalidRange { start, end });
            }
        }
        {
            let log = self.log.borrow();
            let len = log.batches.len();
            if log.closed && end.unwrap_or(start) > len {
                return Err(SeqError::RangeOutOfBounds {
                    end: end.unwrap_or(start),
                    len,
                });
            }
        }

        let (tx, stream) = BatchStream::channel();
        let mut updates = self.log.subscribe();
        tokio::spawn(async move {
            let mut idx = start;
            while end.is_none_or(|end| idx < end) {
                let next = match updates.wait_for(|log| log.batches.len() > idx || log.closed).await {
                    Ok(log) => log.batches.get(idx).cloned(),
                    Err(_) => None,
                };
                let Some(batch) = next else {
                    if let Some(end) = end {
                        error!(start, end, available = idx, "tape closed before requested range was written");
                    }
                    break;
                };
                if tx.send(batch).await.is_err() {
                    trace!(start, idx, "tape reader dropped");
                    break;
                }
                idx += 1;
            }
        });
        Ok(stream)
    }
}
