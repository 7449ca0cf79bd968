//! A process-wide shutdown signal shared by every long-lived periodic worker
//! (restocker, durable writer, log flusher, leader watchdog).
//!
//! `spec.md`'s design notes call out that the periodic workers "must honor a
//! shutdown signal promptly, even though the original design has no shutdown
//! path" — this is that path. Every worker loop selects on
//! `ShutdownSignal::recv()` alongside its sleep/accept future instead of
//! sleeping unconditionally.

use tokio::sync::watch;

#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

impl Shutdown {
    /// True once a shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once a shutdown has been requested. Safe to await repeatedly
    /// and from multiple clones.
    pub async fn recv(&mut self) {
        if *self.rx.borrow() {
            return;
        }
        // `changed()` only errors once every sender has been dropped, which
        // only happens at process exit; treat that the same as a shutdown.
        let _ = self.rx.changed().await;
    }
}

/// Create a linked `(ShutdownHandle, Shutdown)` pair and wire `ShutdownHandle`
/// to fire on SIGINT/SIGTERM via `ctrlc`.
pub fn install() -> anyhow::Result<Shutdown> {
    let (tx, rx) = watch::channel(false);
    let handle = ShutdownHandle { tx };
    ctrlc::set_handler(move || handle.trigger())?;
    Ok(Shutdown { rx })
}

/// Create a linked pair without installing a signal handler, for tests and
/// for embedding multiple services in one process.
pub fn channel() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, Shutdown { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recv_resolves_after_trigger() {
        let (handle, mut shutdown) = channel();
        assert!(!shutdown.is_shutting_down());
        handle.trigger();
        shutdown.recv().await;
        assert!(shutdown.is_shutting_down());
    }
}
