//! Leaf nodes hosting behavior units.

use std::sync::Arc;

use crate::host::{TaskId, Wake};
use crate::node::{Cx, Node, NodeCore, Report};
use crate::status::NodeState;
use crate::unit::{Action, Condition, UnitContext, UnitResult, guarded};

/// Executes a condition unit against the context, catching panics.
pub(crate) fn run_condition<T>(
    unit: &mut dyn Condition<T>,
    cx: &mut Cx<'_, T>,
) -> UnitResult<bool> {
    let mut ucx = UnitContext::new(&mut *cx.target, &mut *cx.blackboard);
    guarded(|| unit.execute(&mut ucx))
}

/// Polls a condition unit once per activation.
pub struct ConditionNode<T> {
    core: NodeCore,
    unit_name: Arc<str>,
    unit: Box<dyn Condition<T>>,
}

impl<T> ConditionNode<T> {
    pub fn new(core: NodeCore, unit_name: impl Into<Arc<str>>, unit: Box<dyn Condition<T>>) -> Self {
        Self {
            core,
            unit_name: unit_name.into(),
            unit,
        }
    }
}

impl<T> Node<T> for ConditionNode<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.core.change_state(NodeState::Running, cx);

        match run_condition(self.unit.as_mut(), cx) {
            Ok(verdict) => self.core.emit(NodeState::from_bool(verdict), cx, report),
            Err(error) => {
                tracing::error!(node = %self.core.key(), unit = %self.unit_name, %error, "condition unit faulted");
                self.core.fault(cx, report);
            }
        }
    }

    fn resume(&mut self, _wake: Wake, _cx: &mut Cx<'_, T>, _report: &mut Report) {}

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        self.core.reset(cx);
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Start,
    Update,
    Stop,
}

/// Runs an action unit across host ticks.
///
/// On activation the unit is started and updated once; it is then updated
/// on every host tick until it calls `finish`. Cancelling a running action
/// calls the unit's `stop` exactly once and delivers no result.
pub struct ActionNode<T> {
    core: NodeCore,
    unit_name: Arc<str>,
    unit: Box<dyn Action<T>>,
    task: Option<TaskId>,
}

impl<T> ActionNode<T> {
    pub fn new(core: NodeCore, unit_name: impl Into<Arc<str>>, unit: Box<dyn Action<T>>) -> Self {
        Self {
            core,
            unit_name: unit_name.into(),
            unit,
            task: None,
        }
    }

    /// Calls one unit phase. Returns the verdict if the unit finished.
    fn invoke(&mut self, phase: Phase, cx: &mut Cx<'_, T>) -> UnitResult<Option<bool>> {
        let unit = &mut self.unit;
        let mut ucx = UnitContext::new(&mut *cx.target, &mut *cx.blackboard);
        guarded(|| match phase {
            Phase::Start => unit.start(&mut ucx),
            Phase::Update => unit.update(&mut ucx),
            Phase::Stop => unit.stop(&mut ucx),
        })?;
        Ok(ucx.finished())
    }

    fn step(&mut self, phase: Phase, cx: &mut Cx<'_, T>, report: &mut Report) {
        match self.invoke(phase, cx) {
            Ok(None) => {}
            Ok(Some(success)) => {
                self.cancel_task(cx);
                tracing::debug!(node = %self.core.key(), unit = %self.unit_name, success, "action finished");
                self.core.emit(NodeState::from_bool(success), cx, report);
            }
            Err(error) => {
                self.cancel_task(cx);
                tracing::error!(node = %self.core.key(), unit = %self.unit_name, ?phase, %error, "action unit faulted");
                self.core.fault(cx, report);
            }
        }
    }

    fn cancel_task(&mut self, cx: &mut Cx<'_, T>) {
        if let Some(task) = self.task.take() {
            cx.scheduler().cancel(task);
        }
    }
}

impl<T> Node<T> for ActionNode<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.cancel_task(cx);
        self.core.change_state(NodeState::Running, cx);

        self.step(Phase::Start, cx, report);
        if !self.core.is_running() {
            return;
        }
        self.step(Phase::Update, cx, report);
        if self.core.is_running() {
            self.task = Some(cx.scheduler().every_tick(self.core.id()));
        }
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        if wake.node != self.core.id() || self.task != Some(wake.task) {
            return;
        }
        tracing::trace!(node = %self.core.key(), "action update");
        self.step(Phase::Update, cx, report);
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        self.cancel_task(cx);
        if self.core.is_running() {
            if let Err(error) = self.invoke(Phase::Stop, cx) {
                tracing::error!(node = %self.core.key(), unit = %self.unit_name, %error, "action unit failed to stop");
            }
        }
        self.core.reset(cx);
    }
}
