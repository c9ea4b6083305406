//! Construction-time errors.
//!
//! Every error here is fatal to tree construction: [`TreeBuilder::build`]
//! returns it and no tree is produced.
//!
//! [`TreeBuilder::build`]: crate::TreeBuilder::build

use thiserror::Error;

use crate::node::NodeKind;
use crate::slot::{SlotDirection, ValueKind};

/// Which registry a unit name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum UnitRole {
    Action,
    Condition,
}

/// Errors raised while binding descriptor arguments to unit slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("no {direction} slot named `{slot}`")]
    UnknownSlot {
        slot: String,
        direction: SlotDirection,
    },

    #[error("slot `{slot}` is declared as {declared} but requested as {requested}")]
    KindMismatch {
        slot: String,
        declared: ValueKind,
        requested: ValueKind,
    },

    #[error("literal `{literal}` is not a valid {kind} for slot `{slot}`")]
    InvalidLiteral {
        slot: String,
        literal: String,
        kind: ValueKind,
    },
}

/// Errors raised while validating a WeightedRandomSelector weight vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("{weights} weight(s) for {children} child(ren)")]
    LengthMismatch { weights: usize, children: usize },

    #[error("weight #{index} is {value}; weights must be finite and non-negative")]
    InvalidWeight { index: usize, value: f32 },

    #[error("weights sum to zero")]
    ZeroSum,
}

/// Errors surfaced by the tree builder.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("node graph is empty")]
    EmptyGraph,

    #[error("node graph has no root descriptor")]
    MissingRoot,

    #[error("node `{parent}` references missing child `{child}`")]
    MissingNode { parent: String, child: String },

    #[error("node `{id}` has unknown kind `{kind}`")]
    UnknownNodeKind { id: String, kind: String },

    #[error("node `{id}` references unknown {role} type `{name}`")]
    UnknownBehaviorType {
        id: String,
        role: UnitRole,
        name: String,
    },

    #[error("node `{id}` ({unit}) expects {expected} {direction} argument(s), found {found}")]
    ArgumentArityMismatch {
        id: String,
        unit: String,
        direction: SlotDirection,
        expected: usize,
        found: usize,
    },

    #[error("{kind} node `{id}` expects {expected} child(ren), found {found}")]
    ChildCountMismatch {
        id: String,
        kind: NodeKind,
        expected: &'static str,
        found: usize,
    },

    #[error("node `{id}` is missing parameter `{name}`")]
    MissingParameter { id: String, name: &'static str },

    #[error("node `{id}` has invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        id: String,
        name: &'static str,
        reason: String,
    },

    #[error("node `{id}` has invalid weights: {source}")]
    InvalidWeights {
        id: String,
        #[source]
        source: WeightError,
    },

    #[error("node `{id}` is reachable more than once")]
    SharedChild { id: String },

    #[error("node `{id}` references unknown subtree `{name}`")]
    UnknownSubtree { id: String, name: String },

    #[error("subtree `{name}` includes itself")]
    RecursiveSubtree { name: String },

    #[error("node `{id}` ({unit}): {source}")]
    Bind {
        id: String,
        unit: String,
        #[source]
        source: BindError,
    },

    #[error("variable `{name}`: {reason}")]
    InvalidVariable { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, BuildError>;
