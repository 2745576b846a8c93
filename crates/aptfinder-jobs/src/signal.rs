//! Suppress signal shared with the refresh loop

use tokio::sync::watch;

/// Read side of the poller's "job in flight" flag.
///
/// Raised for the whole of `Starting` and `Running`, lowered otherwise.
#[derive(Debug, Clone)]
pub struct SuppressSignal {
    rx: watch::Receiver<bool>,
}

impl SuppressSignal {
    /// Follow the flag carried by `rx`
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// A signal that is never raised, for views without a poller
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_set(&self) -> bool {
        *self.rx.borrow()
    }
}
