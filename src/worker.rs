#[cfg(feature = "stats")]
use std::time::Instant;

use tracing::{debug, trace};

use crate::gauss::{CiOutcome, GaussCiTest};
use crate::graph::{Graph, SharedGraph};
use crate::queue::{EdgeTask, WorkQueue};
use crate::sepset::SeparationSets;
#[cfg(feature = "stats")]
use crate::stats::WorkerStats;
use crate::subsets::Combinations;

#[cfg(feature = "stats")]
pub(crate) type WorkerReport = WorkerStats;
#[cfg(not(feature = "stats"))]
pub(crate) type WorkerReport = ();

/// One member of the per-level pool. Holds shared references to the level's
/// immutable state (frozen graph, correlation-backed test) and to the two
/// concurrently mutated stores (working graph, separation sets). Drains the
/// queue until empty; an empty pop is end-of-level because the engine fills
/// the queue before spawning.
pub(crate) struct Worker<'a> {
    level: usize,
    alpha: f64,
    frozen: &'a Graph,
    working: &'a SharedGraph,
    sepsets: &'a SeparationSets,
    test: &'a GaussCiTest,
    queue: &'a WorkQueue,
    #[cfg(feature = "stats")]
    stats: WorkerStats,
}

impl<'a> Worker<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        level: usize,
        alpha: f64,
        frozen: &'a Graph,
        working: &'a SharedGraph,
        sepsets: &'a SeparationSets,
        test: &'a GaussCiTest,
        queue: &'a WorkQueue,
    ) -> Self {
        Self {
            level,
            alpha,
            frozen,
            working,
            sepsets,
            test,
            queue,
            #[cfg(feature = "stats")]
            stats: WorkerStats::default(),
        }
    }

    pub(crate) fn run(mut self) -> WorkerReport {
        loop {
            #[cfg(feature = "stats")]
            let popped_at = Instant::now();
            let Some(task) = self.queue.try_pop() else {
                break;
            };
            #[cfg(feature = "stats")]
            {
                self.stats.dequeue_nanos += popped_at.elapsed().as_nanos() as u64;
                self.stats.dequeued += 1;
            }
            self.process(task);
        }
        self.into_report()
    }

    /// Evaluates edge `{x, y}` against every conditioning set of the current
    /// cardinality drawn from the frozen adjacency of `x`. The first
    /// rejecting set deletes the edge and publishes the witness; remaining
    /// sets are skipped, as is the whole task once another worker removed
    /// the edge.
    fn process(&mut self, task: EdgeTask) {
        let EdgeTask { x, y } = task;
        let pool: Vec<_> = self
            .frozen
            .neighbors(x)
            .iter()
            .copied()
            .filter(|&v| v != y)
            .collect();
        if pool.len() < self.level {
            // Mirrors the enqueue precondition; nothing to test here.
            return;
        }

        let mut witness = Vec::with_capacity(self.level);
        let mut combos = Combinations::new(pool.len(), self.level);
        while let Some(selection) = combos.next() {
            if !self.working.contains_edge(x, y) {
                return;
            }
            witness.clear();
            witness.extend(selection.iter().map(|&at| pool[at]));

            #[cfg(feature = "stats")]
            let started = Instant::now();
            let outcome = self.test.pvalue(x, y, &witness);
            #[cfg(feature = "stats")]
            {
                self.stats.test_nanos += started.elapsed().as_nanos() as u64;
                self.stats.tests_performed += 1;
            }

            match outcome {
                CiOutcome::PValue(p) if p >= self.alpha => {
                    self.working.delete_edge(x, y);
                    self.sepsets.set_if_empty(x, y, &witness);
                    #[cfg(feature = "stats")]
                    {
                        self.stats.edges_deleted += 1;
                    }
                    trace!(x = x.0, y = y.0, level = self.level, "worker.edge.deleted");
                    return;
                }
                CiOutcome::PValue(_) => {}
                CiOutcome::Singular => {
                    #[cfg(feature = "stats")]
                    {
                        self.stats.untestable += 1;
                    }
                    debug!(x = x.0, y = y.0, level = self.level, "worker.test.singular");
                }
                CiOutcome::InsufficientSamples => {
                    // Every set at this level has the same size, so none is
                    // testable; keep the edge.
                    #[cfg(feature = "stats")]
                    {
                        self.stats.untestable += 1;
                    }
                    debug!(
                        x = x.0,
                        y = y.0,
                        level = self.level,
                        "worker.test.insufficient_samples"
                    );
                    return;
                }
            }
        }
    }

    #[cfg(feature = "stats")]
    fn into_report(self) -> WorkerReport {
        self.stats
    }

    #[cfg(not(feature = "stats"))]
    fn into_report(self) -> WorkerReport {}
}
