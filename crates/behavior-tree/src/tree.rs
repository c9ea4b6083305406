//! Built behavior tree.

use std::fmt;
use std::time::Duration;

use crate::blackboard::Blackboard;
use crate::host::{Scheduler, TaskQueue, Wake};
use crate::node::{Cx, Node, Report, StateObserver};
use crate::random::Sampler;
use crate::status::NodeState;

/// A runnable tree: the root node plus the blackboard its units share.
///
/// The host drives it with [`evaluate`](Self::evaluate), feeds fired tasks
/// back through [`wake`](Self::wake) (or lets [`tick`](Self::tick) do both
/// with a [`TaskQueue`]), and cancels it with [`stop`](Self::stop). Every
/// call returns the terminal results the root delivered during the call.
pub struct BehaviorTree<T> {
    root: Box<dyn Node<T>>,
    blackboard: Blackboard,
    sampler: Box<dyn Sampler>,
    observer: Option<Box<dyn StateObserver>>,
    node_count: u32,
}

impl<T> BehaviorTree<T> {
    pub(crate) fn new(
        root: Box<dyn Node<T>>,
        blackboard: Blackboard,
        sampler: Box<dyn Sampler>,
        observer: Option<Box<dyn StateObserver>>,
        node_count: u32,
    ) -> Self {
        Self {
            root,
            blackboard,
            sampler,
            observer,
            node_count,
        }
    }

    /// Starts an activation of the root. No-op while the tree is running.
    pub fn evaluate(&mut self, target: &mut T, scheduler: &mut dyn Scheduler) -> Report {
        self.with_cx(target, scheduler, |root, cx| {
            let mut report = Report::new();
            root.evaluate(cx, &mut report);
            report
        })
    }

    /// Delivers a fired host task to the node that registered it.
    pub fn wake(&mut self, wake: Wake, target: &mut T, scheduler: &mut dyn Scheduler) -> Report {
        if !self.root.core().contains(wake.node) {
            tracing::warn!(node = wake.node.0, "wake for a node outside this tree");
            return Report::new();
        }
        self.with_cx(target, scheduler, |root, cx| {
            let mut report = Report::new();
            root.resume(wake, cx, &mut report);
            report
        })
    }

    /// Advances `queue` by `dt` and dispatches every due task.
    pub fn tick(&mut self, queue: &mut TaskQueue, target: &mut T, dt: Duration) -> Report {
        let mut report = Report::new();
        for wake in queue.advance(dt) {
            for state in self.wake(wake, target, queue) {
                report.push(state);
            }
        }
        report
    }

    /// Cancels every active node. The tree can be evaluated again afterwards.
    pub fn stop(&mut self, target: &mut T, scheduler: &mut dyn Scheduler) {
        self.with_cx(target, scheduler, |root, cx| root.stop(cx));
    }

    pub fn state(&self) -> NodeState {
        self.root.state()
    }

    pub fn is_running(&self) -> bool {
        self.root.core().is_running()
    }

    pub fn root(&self) -> &dyn Node<T> {
        self.root.as_ref()
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Number of runtime nodes, function subtrees included.
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn set_observer(&mut self, observer: impl StateObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn with_cx<R>(
        &mut self,
        target: &mut T,
        scheduler: &mut dyn Scheduler,
        f: impl FnOnce(&mut dyn Node<T>, &mut Cx<'_, T>) -> R,
    ) -> R {
        let Self {
            root,
            blackboard,
            sampler,
            observer,
            ..
        } = self;
        let mut cx = Cx::new(target, blackboard, scheduler, sampler.as_mut());
        if let Some(observer) = observer.as_deref_mut() {
            cx = cx.with_observer(observer);
        }
        f(root.as_mut(), &mut cx)
    }
}

impl<T> fmt::Debug for BehaviorTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("root", &self.root)
            .field("node_count", &self.node_count)
            .field("blackboard", &self.blackboard)
            .finish_non_exhaustive()
    }
}
