use crate::backend::Creator;
use crate::communication::BatchStream;
use crate::error::Result;

/// # Tape
///
/// An append-only recording of a sequence, addressable by time index.
///
/// A tape is written incrementally through its write side (a
/// [`BatchSender`](crate::communication::BatchSender) handed out when the tape
/// is created) and read by any number of concurrent replays, including while
/// writes are still happening. Reads observe batches in write order.
pub trait Tape<C>: Send + Sync
where
    C: Creator,
{
    fn creator(&self) -> &C;

    /// Streams steps `start..end`, or `start..` through the end of the tape when
    /// `end` is `None`.
    ///
    /// Steps not yet written are waited for.
    fn read(&self, start: usize, end: Option<usize>) -> Result<BatchStream<C::Vector>>;
}
