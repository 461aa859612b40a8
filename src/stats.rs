use std::time::Duration;

use serde::Serialize;

/// Counters owned by a single worker for one level. No sharing: each worker
/// mutates only its own record and hands it back at the join barrier.
#[derive(Debug, Default, Clone, Serialize)]
pub struct WorkerStats {
    pub dequeued: u64,
    pub tests_performed: u64,
    pub edges_deleted: u64,
    pub untestable: u64,
    pub test_nanos: u64,
    pub dequeue_nanos: u64,
}

impl WorkerStats {
    pub fn time_in_test(&self) -> Duration {
        Duration::from_nanos(self.test_nanos)
    }

    pub fn time_in_dequeue(&self) -> Duration {
        Duration::from_nanos(self.dequeue_nanos)
    }
}

/// One entry per completed level, in order.
#[derive(Debug, Clone, Serialize)]
pub struct LevelStats {
    pub level: usize,
    pub queued: usize,
    pub duration_ms: f64,
    pub workers: Vec<WorkerStats>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStats {
    pub levels: Vec<LevelStats>,
}

impl RunStats {
    pub fn total_tests(&self) -> u64 {
        self.levels
            .iter()
            .flat_map(|level| &level.workers)
            .map(|worker| worker.tests_performed)
            .sum()
    }

    pub fn total_deleted(&self) -> u64 {
        self.levels
            .iter()
            .flat_map(|level| &level.workers)
            .map(|worker| worker.edges_deleted)
            .sum()
    }
}
