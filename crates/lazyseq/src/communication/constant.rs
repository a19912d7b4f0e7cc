/// # Constants governing stream behaviour

/// Capacity of every inter-task batch stream.
///
/// With a capacity of one a producer can run at most one step ahead of its
/// consumer.
pub const STREAM_CAPACITY: usize = 1;
