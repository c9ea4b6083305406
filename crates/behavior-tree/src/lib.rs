//! Event-driven behavior tree interpreter for real-time agent simulation.
//!
//! Trees are built from a node-graph descriptor ([`TreeGraph`]) against a
//! registry of behavior units ([`UnitRegistry`]) and then driven by a host
//! that owns the clock ([`Scheduler`]).
//!
//! - **Event driven**: nodes that span several ticks register a host task
//!   and are resumed by [`BehaviorTree::wake`]; nothing is polled from the top
//! - **Explicit resumable state**: every node keeps its own cursor or task
//!   handle; no closures outlive a call
//! - **Typed blackboard**: behavior units exchange data through typed
//!   [`Input`]/[`Output`] handles bound at build time
//!
//! # Architecture
//!
//! - [`Node`]: evaluation contract shared by every node
//! - [`NodeState`]: `Waiting`, `Running`, `True`, `False` (plus diagnostics)
//! - Composite nodes: [`Selector`], [`Sequencer`], [`WeightedRandomSelector`],
//!   [`SimpleParallel`]
//! - Decorator nodes: [`Root`], [`InverseDecorator`], [`Repeater`], [`Loop`],
//!   [`LoopConditionNode`]
//! - Leaf nodes: [`ConditionNode`], [`ActionNode`]
//! - Construction: [`TreeBuilder`], [`UnitRegistry`], [`TreeLibrary`]

pub mod blackboard;
pub mod builder;
pub mod composite;
pub mod conditional;
pub mod config;
pub mod decorator;
pub mod error;
pub mod graph;
pub mod host;
pub mod leaf;
pub mod node;
pub mod random;
pub mod registry;
pub mod slot;
pub mod status;
pub mod tree;
pub mod unit;

#[cfg(test)]
mod test_support;

pub use blackboard::{Blackboard, BlackboardError};
pub use builder::TreeBuilder;
pub use composite::{Selector, Sequencer, SimpleParallel, WeightedRandomSelector};
pub use conditional::{ConditionMode, LoopConditionNode};
pub use config::TreeConfig;
pub use decorator::{InverseDecorator, Loop, Repeater, Root};
pub use error::{BindError, BuildError, UnitRole, WeightError};
pub use graph::{Argument, NodeDescriptor, NodeParams, SubtreeRef, TreeGraph, TreeLibrary, VariableDecl};
pub use host::{NodeId, Scheduler, TaskId, TaskQueue, Wake};
pub use leaf::{ActionNode, ConditionNode};
pub use node::{Cx, Node, NodeCore, NodeKind, Report, StateChange, StateObserver};
pub use random::{RandSampler, Sampler};
#[cfg(any(test, feature = "test-support"))]
pub use random::ScriptedSampler;
pub use registry::{Bindings, UnitFactory, UnitRegistry, UnitRegistryBuilder, UnitSpec};
pub use slot::{
    CustomKindName, Input, Output, SlotDecl, SlotDirection, SlotValue, ValueKind, Vec2, Vec3,
};
pub use status::NodeState;
pub use tree::BehaviorTree;
pub use unit::{Action, Condition, UnitContext, UnitError, UnitResult};
