use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::engine::ledger::AssignmentLedger;
use crate::models::courier::{Courier, CourierId};
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub couriers: DashMap<CourierId, Courier>,
    pub ledger: AssignmentLedger,
    /// Held by every request that touches couriers or orders, so each write
    /// applies as a unit and reads never see half of one.
    pub write_lock: Mutex<()>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            couriers: DashMap::new(),
            ledger: AssignmentLedger::new(),
            write_lock: Mutex::new(()),
            metrics: Metrics::new(),
        }
    }

    pub fn courier(&self, courier_id: CourierId) -> Option<Courier> {
        self.couriers.get(&courier_id).map(|entry| entry.value().clone())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
