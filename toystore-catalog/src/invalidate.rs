//! Bounded invalidation fan-out: after a successful `Order` or a restock,
//! push `Invalidate(product_name)` to the front-end from a capped pool of
//! concurrent tasks. No retry, no queue — a task that can't get a permit
//! drops its invalidation immediately, and a task whose RPC fails logs and
//! drops too (`spec.md` §4.1).

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::warn;

use crate::client::FrontendClient;

#[derive(Clone)]
pub struct Invalidator {
    client: FrontendClient,
    semaphore: Arc<Semaphore>,
}

impl Invalidator {
    pub fn new(client: FrontendClient, max_workers: usize) -> Self {
        Self { client, semaphore: Arc::new(Semaphore::new(max_workers)) }
    }

    /// Fire-and-forget submission. Returns immediately; the invalidation
    /// runs on a spawned task.
    pub fn submit(&self, product_name: String) {
        let Ok(permit) = self.semaphore.clone().try_acquire_owned() else {
            warn!(product_name, "invalidation worker pool saturated, dropping");
            return;
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(err) = client.invalidate(&product_name).await {
                warn!(product_name, %err, "invalidation failed, dropping");
            }
        });
    }
}
