//! Leader election over the order replicas (`spec.md` §4.3). Soft and
//! re-derived: there is no consensus, so a partition can produce two
//! simultaneous leaders (`spec.md` §9) — this module deliberately does not
//! try to prevent that, only to pick a plausible one quickly.
//!
//! Grounded on the state-machine shape of the workspace template's
//! `resilience::reconnect::ResilientMarketFeed`: an atomically-readable
//! current state for the fast path, and a mutex-guarded re-election
//! procedure so only one election runs at a time.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, warn};

use crate::clients::OrderClient;

const NO_LEADER: i64 = -1;
const WATCHDOG_INTERVAL: Duration = Duration::from_secs(1);

pub struct Election {
    leader_id: AtomicI64,
    election_lock: AsyncMutex<()>,
    replicas: Vec<OrderClient>,
}

impl Election {
    pub fn new(mut replicas: Vec<OrderClient>) -> Self {
        replicas.sort_by_key(|r| r.component_id);
        Self { leader_id: AtomicI64::new(NO_LEADER), election_lock: AsyncMutex::new(()), replicas }
    }

    /// Read without locking — the fast path every request takes
    /// (`spec.md` §4.3 "read without locking on the fast path").
    pub fn current_leader(&self) -> Option<u8> {
        match self.leader_id.load(Ordering::Relaxed) {
            NO_LEADER => None,
            id => Some(id as u8),
        }
    }

    fn client_for(&self, component_id: u8) -> Option<&OrderClient> {
        self.replicas.iter().find(|r| r.component_id == component_id)
    }

    /// Run the election procedure from `spec.md` §4.3. Returns the new
    /// leader id, or `None` if no replica answered at all.
    pub async fn elect(&self) -> Option<u8> {
        let _guard = self.election_lock.lock().await;

        if let Some(current) = self.current_leader() {
            if let Some(client) = self.client_for(current) {
                if client.ping(current as i64).await.is_ok() {
                    return Some(current);
                }
            }
        }

        for candidate in &self.replicas {
            if candidate.ping(0).await.is_ok() {
                self.leader_id.store(candidate.component_id as i64, Ordering::Relaxed);
                info!(leader = candidate.component_id, "elected new leader");

                for announce in self.replicas.iter().filter(|r| r.component_id >= candidate.component_id) {
                    if let Err(err) = announce.ping(candidate.component_id as i64).await {
                        warn!(replica = announce.component_id, %err, "leader announcement failed, ignoring");
                    }
                }
                return Some(candidate.component_id);
            }
        }

        warn!("election found no live replica");
        None
    }

    /// Run `elect`, terminating the process if nothing answered
    /// (`spec.md` §4.3 step 4, §7 "no order replica reachable → front-end
    /// terminates").
    pub async fn elect_or_die(&self) -> u8 {
        match self.elect().await {
            Some(id) => id,
            None => {
                error!("no order replica reachable, terminating");
                std::process::exit(1);
            }
        }
    }

    pub fn client(&self, component_id: u8) -> Option<&OrderClient> {
        self.client_for(component_id)
    }
}

/// Probe the current leader once a second; re-elect when it stops
/// answering (`spec.md` §4.3 "invoked ... from a dedicated watchdog").
pub async fn run_watchdog(election: std::sync::Arc<Election>, mut shutdown: toystore_core::shutdown::Shutdown) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = tokio::time::sleep(WATCHDOG_INTERVAL) => {}
        }

        let Some(leader) = election.current_leader() else {
            election.elect_or_die().await;
            continue;
        };
        let Some(client) = election.client(leader) else {
            election.elect_or_die().await;
            continue;
        };
        if client.ping(leader as i64).await.is_err() {
            warn!(leader, "watchdog detected dead leader, re-electing");
            election.elect_or_die().await;
        }
    }
}
