//! Stop handles for the scheduler loops.

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle to a running scheduler loop.
///
/// Dropping it detaches the loop; call [`TaskHandle::stop`] for an
/// orderly shutdown. Stopping only suppresses the next tick -- work
/// already in flight finishes first.
pub struct TaskHandle {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub(crate) fn new(stop: watch::Sender<bool>, handle: JoinHandle<()>) -> Self {
        Self { stop, handle }
    }

    /// Signal the loop to exit and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}
