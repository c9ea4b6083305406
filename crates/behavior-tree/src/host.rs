//! Host tick/timer contract.
//!
//! The engine needs exactly two primitives from its host: "wake this node on
//! every tick until cancelled" and "wake this node once after a delay,
//! cancellable". Both are expressed by [`Scheduler`]. When a registered task
//! fires, the host hands the resulting [`Wake`] back to
//! [`BehaviorTree::wake`](crate::BehaviorTree::wake).
//!
//! [`TaskQueue`] is a frame-driven implementation on a virtual clock, used by
//! the reference host and the tests.

use std::collections::BTreeMap;
use std::time::Duration;

/// Runtime identifier of a node: its pre-order index in the built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn next(self) -> Self {
        NodeId(self.0 + 1)
    }
}

/// Handle of a task registered with a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// A fired task, addressed to the node that registered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    pub node: NodeId,
    pub task: TaskId,
}

/// Host facility for resuming nodes that span several ticks.
pub trait Scheduler {
    /// Wakes `node` on every tick until the task is cancelled.
    fn every_tick(&mut self, node: NodeId) -> TaskId;

    /// Wakes `node` once after `delay`.
    fn after(&mut self, node: NodeId, delay: Duration) -> TaskId;

    /// Cancels a task. Unknown or already fired tasks are ignored.
    fn cancel(&mut self, task: TaskId);
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    EveryTick,
    At(Duration),
}

#[derive(Debug, Clone, Copy)]
struct Task {
    node: NodeId,
    trigger: Trigger,
}

/// Frame-driven scheduler on a virtual clock.
///
/// Tasks fire in registration order. A task registered while a batch is
/// being dispatched fires on the next [`advance`](Self::advance) at the
/// earliest.
#[derive(Debug, Default)]
pub struct TaskQueue {
    now: Duration,
    next_id: u64,
    tasks: BTreeMap<TaskId, Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of registered tasks that have not fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_pending(&self, task: TaskId) -> bool {
        self.tasks.contains_key(&task)
    }

    /// Returns `true` if `node` owns at least one pending task.
    pub fn has_tasks_for(&self, node: NodeId) -> bool {
        self.tasks.values().any(|task| task.node == node)
    }

    /// Moves the clock forward by `dt` and returns the tasks due this tick.
    ///
    /// One-shot timers are removed as they fire; per-tick tasks stay.
    pub fn advance(&mut self, dt: Duration) -> Vec<Wake> {
        self.now += dt;

        let now = self.now;
        let mut due = Vec::new();
        self.tasks.retain(|&task, entry| match entry.trigger {
            Trigger::EveryTick => {
                due.push(Wake {
                    node: entry.node,
                    task,
                });
                true
            }
            Trigger::At(deadline) if deadline <= now => {
                due.push(Wake {
                    node: entry.node,
                    task,
                });
                false
            }
            Trigger::At(_) => true,
        });
        due
    }

    fn register(&mut self, node: NodeId, trigger: Trigger) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, Task { node, trigger });
        id
    }
}

impl Scheduler for TaskQueue {
    fn every_tick(&mut self, node: NodeId) -> TaskId {
        self.register(node, Trigger::EveryTick)
    }

    fn after(&mut self, node: NodeId, delay: Duration) -> TaskId {
        let deadline = self.now + delay;
        self.register(node, Trigger::At(deadline))
    }

    fn cancel(&mut self, task: TaskId) {
        self.tasks.remove(&task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(100);

    #[test]
    fn every_tick_fires_until_cancelled() {
        let mut queue = TaskQueue::new();
        let task = queue.every_tick(NodeId(3));

        assert_eq!(queue.advance(FRAME), vec![Wake { node: NodeId(3), task }]);
        assert_eq!(queue.advance(FRAME).len(), 1);

        queue.cancel(task);
        assert!(queue.advance(FRAME).is_empty());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn timer_fires_once_at_deadline() {
        let mut queue = TaskQueue::new();
        let task = queue.after(NodeId(1), Duration::from_millis(250));

        assert!(queue.advance(FRAME).is_empty());
        assert!(queue.advance(FRAME).is_empty());
        assert_eq!(queue.advance(FRAME), vec![Wake { node: NodeId(1), task }]);
        assert!(!queue.is_pending(task));
        assert!(queue.advance(FRAME).is_empty());
    }

    #[test]
    fn tasks_fire_in_registration_order() {
        let mut queue = TaskQueue::new();
        let a = queue.every_tick(NodeId(5));
        let b = queue.after(NodeId(2), Duration::ZERO);

        let fired: Vec<TaskId> = queue.advance(FRAME).into_iter().map(|w| w.task).collect();
        assert_eq!(fired, vec![a, b]);
        assert!(queue.has_tasks_for(NodeId(5)));
        assert!(!queue.has_tasks_for(NodeId(2)));
    }
}
