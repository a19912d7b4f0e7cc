//! # Core Task Plumbing
//!
//! * [`worker`] - Groups of background tasks awaited together. Pack
//!   propagation runs one task per input that needs gradients and waits for
//!   all of them before returning.
pub(crate) mod worker;
