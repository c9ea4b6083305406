//! State reported by behavior tree nodes.

/// The evaluation state of a node.
///
/// # Event-driven Semantics
///
/// A node moves `Waiting -> Running -> {True, False}` during one activation
/// and back to `Waiting` when it is cancelled. Nodes that span several host
/// ticks stay `Running` in between.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeState {
    /// Not running.
    #[default]
    Waiting,

    /// In progress; spans multiple ticks.
    Running,

    /// Succeeded this evaluation.
    True,

    /// Failed this evaluation.
    False,

    /// Diagnostic only. Never consumed by control flow.
    Completed,

    /// Diagnostic only. Set on a node whose behavior unit faulted.
    Warning,
}

impl NodeState {
    /// Returns `true` for `True` and `False`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeState::True | NodeState::False)
    }

    /// Returns `true` if this state is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, NodeState::Running)
    }

    /// Maps a boolean verdict to `True` or `False`.
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value {
            NodeState::True
        } else {
            NodeState::False
        }
    }

    /// Swaps `True` and `False`. Every other state is returned unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            NodeState::True => NodeState::False,
            NodeState::False => NodeState::True,
            other => other,
        }
    }
}
