//! Decorator behavior nodes.
//!
//! Decorators wrap a single child and change its result or its activation
//! pattern: [`Root`] (terminal-only forwarding, also used for function
//! subtrees), [`InverseDecorator`] (NOT logic), [`Repeater`] and [`Loop`].

use std::slice;
use std::time::Duration;

use crate::host::{TaskId, Wake};
use crate::node::{Cx, Node, NodeCore, Report, evaluate_child, resume_child};
use crate::status::NodeState;

/// Top of a tree or of a function subtree.
///
/// Forwards only terminal results of its child; `Running` stays internal.
pub struct Root<T> {
    core: NodeCore,
    child: Box<dyn Node<T>>,
}

impl<T> Root<T> {
    pub fn new(core: NodeCore, child: Box<dyn Node<T>>) -> Self {
        Self {
            core: core.spanning(slice::from_ref(&child)),
            child,
        }
    }

    fn forward(&mut self, child_report: Report, cx: &mut Cx<'_, T>, report: &mut Report) {
        for state in child_report {
            if state.is_terminal() {
                self.core.emit(state, cx, report);
            }
        }
    }
}

impl<T> Node<T> for Root<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.core.change_state(NodeState::Running, cx);
        let child_report = evaluate_child(self.child.as_mut(), cx);
        self.forward(child_report, cx, report);
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        if !self.child.core().contains(wake.node) {
            return;
        }
        let child_report = resume_child(self.child.as_mut(), wake, cx);
        self.forward(child_report, cx, report);
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        self.child.stop(cx);
        self.core.reset(cx);
    }
}

/// Inverts the result of its child.
///
/// # Semantics
///
/// - `True` becomes `False` and `False` becomes `True`
/// - `Running` passes through unchanged
pub struct InverseDecorator<T> {
    core: NodeCore,
    child: Box<dyn Node<T>>,
}

impl<T> InverseDecorator<T> {
    pub fn new(core: NodeCore, child: Box<dyn Node<T>>) -> Self {
        Self {
            core: core.spanning(slice::from_ref(&child)),
            child,
        }
    }

    fn forward(&mut self, child_report: Report, cx: &mut Cx<'_, T>, report: &mut Report) {
        for state in child_report {
            if state.is_terminal() || state.is_running() {
                self.core.emit(state.invert(), cx, report);
            }
        }
    }
}

impl<T> Node<T> for InverseDecorator<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.core.change_state(NodeState::Running, cx);
        let child_report = evaluate_child(self.child.as_mut(), cx);
        self.forward(child_report, cx, report);
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        if !self.child.core().contains(wake.node) {
            return;
        }
        let child_report = resume_child(self.child.as_mut(), wake, cx);
        self.forward(child_report, cx, report);
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        self.child.stop(cx);
        self.core.reset(cx);
    }
}

/// Re-activates its child every time it finishes. Never terminates.
///
/// A child that finishes within its own activation is restarted on the next
/// host tick rather than in the same call, so an always-succeeding child
/// cannot spin forever inside one tick.
pub struct Repeater<T> {
    core: NodeCore,
    child: Box<dyn Node<T>>,
    deferred: Option<TaskId>,
}

impl<T> Repeater<T> {
    pub fn new(core: NodeCore, child: Box<dyn Node<T>>) -> Self {
        Self {
            core: core.spanning(slice::from_ref(&child)),
            child,
            deferred: None,
        }
    }

    fn activate(&mut self, cx: &mut Cx<'_, T>) {
        let child_report = evaluate_child(self.child.as_mut(), cx);
        if let Some(result) = child_report.terminal() {
            tracing::trace!(node = %self.core.key(), %result, "child finished immediately");
            self.deferred = Some(cx.scheduler().every_tick(self.core.id()));
        }
    }

    fn cancel_deferred(&mut self, cx: &mut Cx<'_, T>) {
        if let Some(task) = self.deferred.take() {
            cx.scheduler().cancel(task);
        }
    }
}

impl<T> Node<T> for Repeater<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.cancel_deferred(cx);
        self.core.emit(NodeState::Running, cx, report);
        self.activate(cx);
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, _report: &mut Report) {
        if wake.node == self.core.id() {
            if self.deferred == Some(wake.task) {
                self.cancel_deferred(cx);
                self.activate(cx);
            }
            return;
        }
        if !self.child.core().contains(wake.node) {
            return;
        }
        let child_report = resume_child(self.child.as_mut(), wake, cx);
        if child_report.terminal().is_some() {
            self.activate(cx);
        }
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        self.cancel_deferred(cx);
        self.child.stop(cx);
        self.core.reset(cx);
    }
}

/// Activates its child once per period. Never terminates.
///
/// Each cycle reports `Running` to the parent; child results are logged and
/// otherwise ignored. A child still running when the period elapses is left
/// alone, since evaluating a running node is a no-op.
///
/// The parent never sees `True` or `False` from a `Loop`, so a Sequencer or
/// Selector above it stays on it until stopped.
pub struct Loop<T> {
    core: NodeCore,
    child: Box<dyn Node<T>>,
    period: Duration,
    timer: Option<TaskId>,
}

impl<T> Loop<T> {
    pub fn new(core: NodeCore, child: Box<dyn Node<T>>, period: Duration) -> Self {
        Self {
            core: core.spanning(slice::from_ref(&child)),
            child,
            period,
            timer: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn cycle(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        self.core.emit(NodeState::Running, cx, report);
        let child_report = evaluate_child(self.child.as_mut(), cx);
        tracing::debug!(node = %self.core.key(), child = ?child_report.as_slice(), "loop cycle");
        self.timer = Some(cx.scheduler().after(self.core.id(), self.period));
    }

    fn cancel_timer(&mut self, cx: &mut Cx<'_, T>) {
        if let Some(task) = self.timer.take() {
            cx.scheduler().cancel(task);
        }
    }
}

impl<T> Node<T> for Loop<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.cancel_timer(cx);
        self.cycle(cx, report);
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        if wake.node == self.core.id() {
            if self.timer == Some(wake.task) {
                self.timer = None;
                self.cycle(cx, report);
            }
            return;
        }
        if !self.child.core().contains(wake.node) {
            return;
        }
        let child_report = resume_child(self.child.as_mut(), wake, cx);
        tracing::trace!(node = %self.core.key(), child = ?child_report.as_slice(), "loop child resumed");
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        self.cancel_timer(cx);
        self.child.stop(cx);
        self.core.reset(cx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NodeId;
    use crate::node::NodeKind;
    use crate::test_support::{Harness, Stub};

    const FRAME: Duration = Duration::from_millis(100);

    fn core(id: u32, kind: NodeKind) -> NodeCore {
        NodeCore::new(NodeId(id), kind, format!("n{id}"))
    }

    #[test]
    fn root_hides_running() {
        let (child, _) = Stub::new(1, &[NodeState::Running]);
        let mut root = Root::new(core(0, NodeKind::Root), child);

        let mut h = Harness::new();
        assert!(h.evaluate(&mut root).is_empty());
        assert!(root.core().is_running());

        let report = h.resume(&mut root, NodeId(1), &[NodeState::Running, NodeState::True]);
        assert_eq!(report.as_slice(), &[NodeState::True]);
    }

    #[test]
    fn inverse_swaps_terminals_and_passes_running() {
        let (child, _) = Stub::new(1, &[NodeState::Running]);
        let mut inv = InverseDecorator::new(core(0, NodeKind::InverseDecorator), child);

        let mut h = Harness::new();
        assert_eq!(h.evaluate(&mut inv).as_slice(), &[NodeState::Running]);
        let report = h.resume(&mut inv, NodeId(1), &[NodeState::True]);
        assert_eq!(report.as_slice(), &[NodeState::False]);
    }

    #[test]
    fn double_inverse_round_trips() {
        for result in [NodeState::True, NodeState::False] {
            let (child, _) = Stub::new(2, &[result]);
            let inner = InverseDecorator::new(core(1, NodeKind::InverseDecorator), child);
            let mut outer = InverseDecorator::new(core(0, NodeKind::InverseDecorator), Box::new(inner));

            let mut h = Harness::new();
            assert_eq!(h.evaluate(&mut outer).as_slice(), &[result]);
        }
    }

    #[test]
    fn repeater_defers_immediate_results_to_next_tick() {
        let (child, calls) = Stub::new(1, &[NodeState::True]);
        let mut rep = Repeater::new(core(0, NodeKind::Repeater), child);

        let mut h = Harness::new();
        assert_eq!(h.evaluate(&mut rep).as_slice(), &[NodeState::Running]);
        assert_eq!(calls.borrow().evaluated, 1);

        for tick in 2..=4 {
            assert!(h.tick(&mut rep, FRAME).is_empty());
            assert_eq!(calls.borrow().evaluated, tick);
        }
        assert!(rep.core().is_running());
    }

    #[test]
    fn repeater_restarts_after_asynchronous_result() {
        let (child, calls) = Stub::new(1, &[NodeState::Running]);
        let mut rep = Repeater::new(core(0, NodeKind::Repeater), child);

        let mut h = Harness::new();
        h.evaluate(&mut rep);
        let report = h.resume(&mut rep, NodeId(1), &[NodeState::False]);
        assert!(report.is_empty());
        assert_eq!(calls.borrow().evaluated, 2);
        assert_eq!(h.queue.pending(), 0);
    }

    #[test]
    fn repeater_stop_cancels_deferred_restart() {
        let (child, calls) = Stub::new(1, &[NodeState::True]);
        let mut rep = Repeater::new(core(0, NodeKind::Repeater), child);

        let mut h = Harness::new();
        h.evaluate(&mut rep);
        h.stop(&mut rep);

        assert_eq!(h.queue.pending(), 0);
        assert_eq!(rep.core().state(), NodeState::Waiting);
        assert_eq!(calls.borrow().stopped, 1);
    }

    #[test]
    fn loop_reactivates_on_period() {
        let (child, calls) = Stub::new(1, &[NodeState::True]);
        let mut lp = Loop::new(core(0, NodeKind::Loop), child, Duration::from_millis(500));

        let mut h = Harness::new();
        assert_eq!(h.evaluate(&mut lp).as_slice(), &[NodeState::Running]);
        assert_eq!(calls.borrow().evaluated, 1);

        for _ in 0..4 {
            assert!(h.tick(&mut lp, FRAME).is_empty());
        }
        assert_eq!(calls.borrow().evaluated, 1);

        assert_eq!(h.tick(&mut lp, FRAME).as_slice(), &[NodeState::Running]);
        assert_eq!(calls.borrow().evaluated, 2);
    }

    #[test]
    fn loop_stop_cancels_timer() {
        let (child, _) = Stub::new(1, &[NodeState::Running]);
        let mut lp = Loop::new(core(0, NodeKind::Loop), child, Duration::from_millis(500));

        let mut h = Harness::new();
        h.evaluate(&mut lp);
        assert_eq!(h.queue.pending(), 1);
        h.stop(&mut lp);
        assert_eq!(h.queue.pending(), 0);
        assert!(h.tick(&mut lp, Duration::from_secs(1)).is_empty());
    }
}
