use crossbeam_queue::ArrayQueue;

use crate::types::VarId;

/// Instruction to evaluate edge `{x, y}` at the current level. The pair is
/// unordered as far as the edge is concerned; `x` is the endpoint whose
/// frozen adjacency feeds the conditioning-set enumeration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EdgeTask {
    pub x: VarId,
    pub y: VarId,
}

/// Lock-free multi-producer multi-consumer queue of test instructions. The
/// engine fills it completely before any worker starts, so an empty pop
/// means end-of-level, never "producer not done yet".
#[derive(Debug)]
pub struct WorkQueue {
    tasks: ArrayQueue<EdgeTask>,
}

impl WorkQueue {
    /// The engine counts candidate pairs while planning the level, so the
    /// capacity is exact.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: ArrayQueue::new(capacity.max(1)),
        }
    }

    pub fn push(&self, task: EdgeTask) {
        if self.tasks.push(task).is_err() {
            panic!("work queue filled beyond its planned capacity");
        }
    }

    pub fn try_pop(&self) -> Option<EdgeTask> {
        self.tasks.pop()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
