use std::sync::Arc;
use tokio::sync::Mutex;
use super::Gradient;

/// A shared handle to a [`Gradient`].
///
/// Propagation workers run concurrently against the same accumulator; every
/// access goes through [`Grad::with`], which holds the lock for the duration
/// of the closure.
#[derive(Debug)]
pub struct Grad<V> {
    inner: Arc<Mutex<Gradient<V>>>,
}

impl<V> Clone for Grad<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> Grad<V> {
    pub fn new(gradient: Gradient<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(gradient)),
        }
    }

    /// Runs `f` with exclusive access to the accumulator.
    pub async fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Gradient<V>) -> R,
    {
        let mut gradient = self.inner.lock().await;
        f(&mut gradient)
    }

    /// Returns the accumulator once this is the last handle, or `self` otherwise.
    pub fn into_inner(self) -> Result<Gradient<V>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
