//! Node evaluation contract.
//!
//! Every node implements [`Node`]. Evaluation is event driven: `evaluate`
//! starts an activation, `resume` continues it when a host task registered
//! by the node (or one of its descendants) fires, and `stop` cancels it.
//!
//! Instead of invoking a continuation, a node appends the states it reports
//! to its parent to a [`Report`]. The parent reacts to them in order once the
//! call returns. In-progress evaluation lives in the node's own fields (a
//! cursor for composites, a task handle for timed nodes), so no closures are
//! kept between ticks.
//!
//! Node ids are assigned in pre-order, which makes every subtree a contiguous
//! id range. A wake-up is routed from the root down to the node that
//! registered it by following the child whose range contains the target id.

use std::sync::Arc;

use crate::blackboard::Blackboard;
use crate::host::{NodeId, Scheduler, Wake};
use crate::random::Sampler;
use crate::status::NodeState;

/// Concrete node kinds, as named in node-graph descriptors.
///
/// Parsing is case-insensitive and accepts the spellings emitted by the
/// graph editor (`RootNode`, `LoopNode`, `InverseDecorater`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    #[strum(to_string = "Root", serialize = "RootNode")]
    Root,
    Selector,
    WeightedRandomSelector,
    #[strum(to_string = "Sequencer", serialize = "Sequence")]
    Sequencer,
    SimpleParallel,
    Repeater,
    #[strum(to_string = "Loop", serialize = "LoopNode")]
    Loop,
    #[strum(
        to_string = "InverseDecorator",
        serialize = "InverseDecorater",
        serialize = "Inverter"
    )]
    InverseDecorator,
    #[strum(to_string = "ConditionNode", serialize = "Condition")]
    ConditionNode,
    LoopConditionNode,
    #[strum(to_string = "ActionNode", serialize = "Action")]
    ActionNode,
    #[strum(to_string = "FunctionNode", serialize = "Function")]
    FunctionNode,
}

/// A node state transition, as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange<'a> {
    pub id: NodeId,
    /// Stable descriptor id of the node.
    pub key: &'a str,
    pub kind: NodeKind,
    pub state: NodeState,
}

/// Receives every node state transition.
pub trait StateObserver {
    fn on_change(&mut self, change: &StateChange<'_>);
}

impl<F> StateObserver for F
where
    F: FnMut(&StateChange<'_>),
{
    fn on_change(&mut self, change: &StateChange<'_>) {
        self(change)
    }
}

/// Everything a node may touch while it runs.
pub struct Cx<'a, T> {
    pub(crate) target: &'a mut T,
    pub(crate) blackboard: &'a mut Blackboard,
    pub(crate) scheduler: &'a mut dyn Scheduler,
    pub(crate) sampler: &'a mut dyn Sampler,
    pub(crate) observer: Option<&'a mut dyn StateObserver>,
}

impl<'a, T> Cx<'a, T> {
    pub fn new(
        target: &'a mut T,
        blackboard: &'a mut Blackboard,
        scheduler: &'a mut dyn Scheduler,
        sampler: &'a mut dyn Sampler,
    ) -> Self {
        Self {
            target,
            blackboard,
            scheduler,
            sampler,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a mut dyn StateObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn target(&mut self) -> &mut T {
        &mut *self.target
    }

    pub fn blackboard(&mut self) -> &mut Blackboard {
        &mut *self.blackboard
    }

    pub fn scheduler(&mut self) -> &mut dyn Scheduler {
        &mut *self.scheduler
    }

    pub fn sampler(&mut self) -> &mut dyn Sampler {
        &mut *self.sampler
    }

    fn notify(&mut self, core: &NodeCore) {
        tracing::trace!(
            node = %core.key,
            kind = %core.kind,
            state = %core.state,
            "node state changed"
        );
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_change(&StateChange {
                id: core.id,
                key: &core.key,
                kind: core.kind,
                state: core.state,
            });
        }
    }
}

/// States a node reported to its parent during one call, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    states: Vec<NodeState>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: NodeState) {
        self.states.push(state);
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn as_slice(&self) -> &[NodeState] {
        &self.states
    }

    /// Last terminal state reported, if any.
    pub fn terminal(&self) -> Option<NodeState> {
        self.states.iter().rev().copied().find(|s| s.is_terminal())
    }
}

impl IntoIterator for Report {
    type Item = NodeState;
    type IntoIter = std::vec::IntoIter<NodeState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.into_iter()
    }
}

/// Identity and state shared by every node.
#[derive(Debug, Clone)]
pub struct NodeCore {
    id: NodeId,
    end: NodeId,
    key: Arc<str>,
    kind: NodeKind,
    state: NodeState,
}

impl NodeCore {
    pub fn new(id: NodeId, kind: NodeKind, key: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            end: id.next(),
            key: key.into(),
            kind,
            state: NodeState::Waiting,
        }
    }

    /// Extends the id span of this node over `children`.
    ///
    /// Children must have been numbered after this node.
    pub fn spanning<T>(mut self, children: &[Box<dyn Node<T>>]) -> Self {
        if let Some(end) = children.iter().map(|c| c.core().end).max() {
            self.end = self.end.max(end);
        }
        self
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Returns `true` if `id` is this node or one of its descendants.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.id <= id && id < self.end
    }

    /// Number of nodes in this subtree, itself included.
    pub fn span(&self) -> u32 {
        self.end.0 - self.id.0
    }

    /// The single mutation point of a node's state. Always notifies.
    pub fn change_state<T>(&mut self, state: NodeState, cx: &mut Cx<'_, T>) {
        self.state = state;
        cx.notify(self);
    }

    /// Changes state and reports it to the parent.
    pub fn emit<T>(&mut self, state: NodeState, cx: &mut Cx<'_, T>, report: &mut Report) {
        self.change_state(state, cx);
        report.push(state);
    }

    /// Marks a faulted unit: `Warning` for observers, `False` for the parent.
    pub fn fault<T>(&mut self, cx: &mut Cx<'_, T>, report: &mut Report) {
        self.change_state(NodeState::Warning, cx);
        report.push(NodeState::False);
    }

    /// Returns to `Waiting`. No-op if already waiting.
    pub fn reset<T>(&mut self, cx: &mut Cx<'_, T>) {
        if self.state != NodeState::Waiting {
            self.change_state(NodeState::Waiting, cx);
        }
    }
}

/// A runtime behavior tree node.
pub trait Node<T> {
    fn core(&self) -> &NodeCore;

    /// Begins an activation. No-op while the node is `Running`.
    fn evaluate(&mut self, cx: &mut Cx<'_, T>, report: &mut Report);

    /// Continues after a host task fired for this node or a descendant.
    fn resume(&mut self, wake: Wake, cx: &mut Cx<'_, T>, report: &mut Report);

    /// Cancels this node and every active descendant, leaving it `Waiting`.
    ///
    /// Safe to call on an idle node. Never aborts part way.
    fn stop(&mut self, cx: &mut Cx<'_, T>);

    fn state(&self) -> NodeState {
        self.core().state()
    }
}

impl<T> std::fmt::Debug for dyn Node<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core();
        f.debug_struct("Node")
            .field("id", &core.id)
            .field("key", &core.key())
            .field("kind", &core.kind)
            .field("state", &core.state)
            .finish()
    }
}

/// Index of the child whose subtree contains `node`.
pub(crate) fn route<T>(children: &[Box<dyn Node<T>>], node: NodeId) -> Option<usize> {
    children.iter().position(|child| child.core().contains(node))
}

/// Stops every node in `children`, in order.
pub(crate) fn stop_all<T>(children: &mut [Box<dyn Node<T>>], cx: &mut Cx<'_, T>) {
    for child in children.iter_mut() {
        child.stop(cx);
    }
}

/// Evaluates `child` and returns what it reported.
pub(crate) fn evaluate_child<T>(child: &mut dyn Node<T>, cx: &mut Cx<'_, T>) -> Report {
    let mut report = Report::new();
    child.evaluate(cx, &mut report);
    report
}

/// Resumes `child` and returns what it reported.
pub(crate) fn resume_child<T>(child: &mut dyn Node<T>, wake: Wake, cx: &mut Cx<'_, T>) -> Report {
    let mut report = Report::new();
    child.resume(wake, cx, &mut report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_editor_spellings() {
        assert_eq!("RootNode".parse::<NodeKind>(), Ok(NodeKind::Root));
        assert_eq!("LoopNode".parse::<NodeKind>(), Ok(NodeKind::Loop));
        assert_eq!(
            "InverseDecorater".parse::<NodeKind>(),
            Ok(NodeKind::InverseDecorator)
        );
        assert_eq!("sequencer".parse::<NodeKind>(), Ok(NodeKind::Sequencer));
        assert!("Teleporter".parse::<NodeKind>().is_err());
        assert_eq!(NodeKind::InverseDecorator.to_string(), "InverseDecorator");
    }

    #[test]
    fn core_contains_its_span() {
        let core = NodeCore::new(NodeId(2), NodeKind::Selector, "sel");
        assert!(core.contains(NodeId(2)));
        assert!(!core.contains(NodeId(3)));
        assert!(!core.contains(NodeId(1)));
        assert_eq!(core.span(), 1);
    }

    #[test]
    fn report_terminal_is_last_terminal() {
        let mut report = Report::new();
        report.push(NodeState::Running);
        assert_eq!(report.terminal(), None);
        report.push(NodeState::False);
        report.push(NodeState::Running);
        assert_eq!(report.terminal(), Some(NodeState::False));
    }
}
