//! Condition-gated decorator.
//!
//! [`LoopConditionNode`] polls a condition unit on a fixed period and
//! activates or cancels its child as the condition changes. The
//! [`ConditionMode`] decides when polling stops.

use std::slice;
use std::time::Duration;

use crate::host::{TaskId, Wake};
use crate::leaf::run_condition;
use crate::node::{Cx, Node, NodeCore, Report, evaluate_child, resume_child};
use crate::status::NodeState;
use crate::unit::Condition;

/// When a [`LoopConditionNode`] stops polling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionMode {
    /// Poll exactly once.
    Once,

    /// Stop polling once the condition holds and the child was activated.
    True,

    /// Keep the child active while the condition holds; cancel it and stop
    /// polling once the condition turns false.
    #[strum(to_string = "True -> False", serialize = "TrueToFalse", serialize = "True->False")]
    #[cfg_attr(feature = "serde", serde(rename = "True -> False", alias = "TrueToFalse"))]
    TrueToFalse,

    /// Follow the condition indefinitely.
    Both,
}

/// Gates a child subtree on a periodically polled condition.
///
/// # Semantics
///
/// - condition holds and the last reported state is not `True`: report
///   `Running` and activate the child
/// - condition fails and the last reported state is not `False`: report
///   `False` and cancel the child
/// - child results are forwarded and become the last reported state
///
/// In [`ConditionMode::TrueToFalse`] polling halts on the first `False` the
/// node reports, whether it comes from the condition or from the child. A
/// condition that is already false on the first poll therefore reports `False`
/// and halts immediately.
pub struct LoopConditionNode<T> {
    core: NodeCore,
    child: Box<dyn Node<T>>,
    unit_name: String,
    unit: Box<dyn Condition<T>>,
    mode: ConditionMode,
    period: Duration,
    timer: Option<TaskId>,
    last: NodeState,
}

impl<T> LoopConditionNode<T> {
    pub fn new(
        core: NodeCore,
        child: Box<dyn Node<T>>,
        unit_name: impl Into<String>,
        unit: Box<dyn Condition<T>>,
        mode: ConditionMode,
        period: Duration,
    ) -> Self {
        Self {
            core: core.spanning(slice::from_ref(&child)),
            child,
            unit_name: unit_name.into(),
            unit,
            mode,
            period,
            timer: None,
            last: NodeState::Waiting,
        }
    }

    pub fn mode(&self) -> ConditionMode {
        self.mode
    }

    /// Whether a poll is scheduled.
    pub fn is_polling(&self) -> bool {
        self.timer.is_some()
    }

    fn poll(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        let verdict = match run_condition(self.unit.as_mut(), cx) {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::error!(node = %self.core.key(), unit = %self.unit_name, %error, "condition unit faulted");
                self.child.stop(cx);
                self.last = NodeState::False;
                self.core.fault(cx, report);
                return;
            }
        };
        tracing::trace!(node = %self.core.key(), verdict, mode = %self.mode, "condition polled");

        let mut halt = false;
        if verdict {
            if self.last != NodeState::True {
                self.core.emit(NodeState::Running, cx, report);
                let child_report = evaluate_child(self.child.as_mut(), cx);
                halt |= self.forward(child_report, cx, report);
                if self.mode == ConditionMode::True {
                    halt = true;
                }
            }
        } else if self.last != NodeState::False {
            self.last = NodeState::False;
            self.core.emit(NodeState::False, cx, report);
            self.child.stop(cx);
            if self.mode == ConditionMode::TrueToFalse {
                halt = true;
            }
        }

        if self.mode == ConditionMode::Once {
            halt = true;
        }
        if !halt {
            self.timer = Some(cx.scheduler().after(self.core.id(), self.period));
        }
    }

    /// Forwards child results. Returns `true` if polling must halt.
    fn forward(&mut self, child_report: Report, cx: &mut Cx<'_, T>, report: &mut Report) -> bool {
        let mut halt = false;
        for state in child_report {
            if state.is_terminal() || state.is_running() {
                self.last = state;
                self.core.emit(state, cx, report);
                if state == NodeState::False && self.mode == ConditionMode::TrueToFalse {
                    halt = true;
                }
            }
        }
        halt
    }

    fn cancel_timer(&mut self, cx: &mut Cx<'_, T>) {
        if let Some(task) = self.timer.take() {
            cx.scheduler().cancel(task);
        }
    }
}

impl<T> Node<T> for LoopConditionNode<T> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        if self.core.is_running() {
            return;
        }
        self.cancel_timer(cx);
        self.core.change_state(NodeState::Running, cx);
        self.last = NodeState::Running;
        self.poll(cx, report);
    }

    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report) {
        if wake.node == self.core.id() {
            if self.timer == Some(wake.task) {
                self.timer = None;
                self.poll(cx, report);
            }
            return;
        }
        if !self.child.core().contains(wake.node) {
            return;
        }
        let child_report = resume_child(self.child.as_mut(), wake, cx);
        if self.forward(child_report, cx, report) {
            self.cancel_timer(cx);
        }
    }

    fn stop(&mut self, cx: &mut Cx<'_, T>) {
        self.cancel_timer(cx);
        self.child.stop(cx);
        self.core.reset(cx);
    }
}
