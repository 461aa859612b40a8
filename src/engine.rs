use std::collections::BTreeSet;
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::SkeletonConfig;
use crate::correlation::CorrelationMatrix;
use crate::dataset::Dataset;
use crate::gauss::{CiOutcome, GaussCiTest};
use crate::graph::{Graph, SharedGraph};
use crate::queue::{EdgeTask, WorkQueue};
use crate::sepset::SeparationSets;
#[cfg(feature = "stats")]
use crate::stats::{LevelStats, RunStats};
use crate::types::{Result, SkeletonError, VarId};
use crate::worker::Worker;

/// Everything a run surrenders to the caller: the estimated skeleton, the
/// witnesses that justified each deletion, and (when compiled in) the
/// per-level worker statistics.
#[derive(Debug)]
pub struct SkeletonOutput {
    pub graph: Graph,
    pub separation_sets: SeparationSets,
    #[cfg(feature = "stats")]
    pub stats: RunStats,
}

/// PC skeleton estimator. Construction validates the inputs and bootstraps
/// the correlation matrix; [`Skeleton::run`] executes the level loop and
/// consumes the engine.
pub struct Skeleton {
    config: SkeletonConfig,
    n_vars: usize,
    test: GaussCiTest,
    graph: Graph,
    sepsets: SeparationSets,
}

impl Skeleton {
    pub fn new(data: &Dataset, config: SkeletonConfig) -> Result<Self> {
        config.validate()?;
        let p = data.n_vars();
        if p < 2 {
            return Err(SkeletonError::TooFewVariables(p));
        }
        let n = data.n_samples();
        if n <= 3 {
            return Err(SkeletonError::TooFewSamples(n));
        }
        let correlation_started = Instant::now();
        let correlation = CorrelationMatrix::from_dataset(data);
        info!(
            vars = p,
            samples = n,
            alpha = config.alpha,
            workers = config.workers,
            duration_ms = correlation_started.elapsed().as_secs_f64() * 1_000.0,
            "engine.correlation.ready"
        );
        Ok(Self {
            config,
            n_vars: p,
            test: GaussCiTest::new(n, correlation),
            graph: Graph::complete(p),
            sepsets: SeparationSets::new(p),
        })
    }

    /// Runs level 0 and then the parallel levels until no node can supply a
    /// conditioning set of the required size.
    pub fn run(mut self) -> SkeletonOutput {
        #[cfg(feature = "stats")]
        let mut run_stats = RunStats::default();

        let (screened, screen_ms) = self.marginal_screen();
        debug!(screened, "engine.level0.screened");
        #[cfg(feature = "stats")]
        run_stats.levels.push(LevelStats {
            level: 0,
            queued: screened,
            duration_ms: screen_ms,
            workers: Vec::new(),
        });
        #[cfg(not(feature = "stats"))]
        let _ = screen_ms;

        let working = SharedGraph::from_graph(&self.graph);
        let mut nodes: BTreeSet<VarId> =
            (0..self.n_vars).map(|v| VarId(v as u32)).collect();
        let mut level = 1usize;

        loop {
            if self.config.max_level.is_some_and(|cap| level > cap) {
                debug!(level, "engine.level.cap_reached");
                break;
            }
            if nodes.is_empty() {
                debug!(level, "engine.level.no_nodes");
                break;
            }

            let plan = plan_level(&self.graph, &nodes, level);
            for v in &plan.exhausted {
                nodes.remove(v);
            }
            if plan.tasks.is_empty() {
                debug!(level, "engine.level.no_tests");
                break;
            }

            let queued = plan.tasks.len();
            let queue = WorkQueue::with_capacity(queued);
            for task in plan.tasks {
                queue.push(task);
            }

            let level_started = Instant::now();
            let mut reports = Vec::with_capacity(self.config.workers);
            thread::scope(|scope| {
                let handles: Vec<_> = (0..self.config.workers)
                    .map(|_| {
                        let worker = Worker::new(
                            level,
                            self.config.alpha,
                            &self.graph,
                            &working,
                            &self.sepsets,
                            &self.test,
                            &queue,
                        );
                        scope.spawn(move || worker.run())
                    })
                    .collect();
                for handle in handles {
                    reports.push(handle.join().expect("worker thread panicked"));
                }
            });
            let duration_ms = level_started.elapsed().as_secs_f64() * 1_000.0;

            self.graph = working.snapshot();
            #[cfg(debug_assertions)]
            self.graph.verify();
            info!(
                level,
                queued,
                remaining = self.graph.edge_count(),
                duration_ms,
                "engine.level.completed"
            );
            #[cfg(feature = "stats")]
            run_stats.levels.push(LevelStats {
                level,
                queued,
                duration_ms,
                workers: reports,
            });
            #[cfg(not(feature = "stats"))]
            drop(reports);

            level += 1;
            debug_assert!(level < self.n_vars.max(2), "level loop failed to terminate");
        }

        SkeletonOutput {
            graph: self.graph,
            separation_sets: self.sepsets,
            #[cfg(feature = "stats")]
            stats: run_stats,
        }
    }

    /// Level 0: every pair against the empty conditioning set, sequentially.
    /// Returns the number of pairs examined and the elapsed milliseconds.
    fn marginal_screen(&mut self) -> (usize, f64) {
        let level_started = Instant::now();
        let mut deleted = 0usize;
        let mut queued = 0usize;
        for i in 0..self.n_vars {
            for j in (i + 1)..self.n_vars {
                let (x, y) = (VarId(i as u32), VarId(j as u32));
                queued += 1;
                if let CiOutcome::PValue(p) = self.test.pvalue(x, y, &[]) {
                    if p >= self.config.alpha {
                        self.graph.delete_edge(x, y);
                        self.sepsets.set_if_empty(x, y, &[]);
                        deleted += 1;
                    }
                }
            }
        }
        let duration_ms = level_started.elapsed().as_secs_f64() * 1_000.0;
        info!(
            level = 0usize,
            queued,
            deleted,
            remaining = self.graph.edge_count(),
            duration_ms,
            "engine.level.completed"
        );
        (queued, duration_ms)
    }
}

pub(crate) struct LevelPlan {
    pub(crate) tasks: Vec<EdgeTask>,
    pub(crate) exhausted: Vec<VarId>,
}

/// Fills the per-level candidate list from the frozen graph. A node with
/// fewer than `level + 1` neighbors cannot supply a conditioning set against
/// any neighbor, now or at any later level, and is reported as exhausted.
///
/// The enqueue rule `y < x || neighbor_count(y) - 1 < level` makes the
/// covering exact: when both endpoints qualify, only the higher-indexed one
/// enqueues the edge; when one endpoint qualifies, that endpoint enqueues it.
pub(crate) fn plan_level(frozen: &Graph, nodes: &BTreeSet<VarId>, level: usize) -> LevelPlan {
    let mut tasks = Vec::new();
    let mut exhausted = Vec::new();
    for &x in nodes {
        if frozen.neighbor_count(x) < level + 1 {
            exhausted.push(x);
            continue;
        }
        for &y in frozen.neighbors(x) {
            if y < x || frozen.neighbor_count(y) < level + 1 {
                tasks.push(EdgeTask { x, y });
            }
        }
    }
    #[cfg(debug_assertions)]
    assert_exact_covering(frozen, nodes, level, &tasks);
    LevelPlan { tasks, exhausted }
}

/// Every edge with a qualifying endpoint must be enqueued exactly once.
#[cfg(debug_assertions)]
fn assert_exact_covering(
    frozen: &Graph,
    nodes: &BTreeSet<VarId>,
    level: usize,
    tasks: &[EdgeTask],
) {
    use std::collections::HashMap;

    let mut enqueued: HashMap<(VarId, VarId), usize> = HashMap::new();
    for task in tasks {
        let key = if task.x < task.y {
            (task.x, task.y)
        } else {
            (task.y, task.x)
        };
        *enqueued.entry(key).or_default() += 1;
    }
    for (&pair, &count) in &enqueued {
        assert!(
            count == 1,
            "edge {}-{} enqueued {count} times at level {level}",
            pair.0,
            pair.1
        );
    }
    for &x in nodes {
        if frozen.neighbor_count(x) < level + 1 {
            continue;
        }
        for &y in frozen.neighbors(x) {
            let key = if x < y { (x, y) } else { (y, x) };
            assert!(
                enqueued.contains_key(&key),
                "edge {x}-{y} has a qualifying endpoint but was not enqueued at level {level}"
            );
        }
    }
}
