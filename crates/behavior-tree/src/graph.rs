//! Node-graph descriptors consumed by the tree builder.
//!
//! A [`TreeGraph`] is a flat list of [`NodeDescriptor`]s linked by id, plus
//! the blackboard variables the graph declares. Kind tags and modes are kept
//! as text so unknown values surface as build errors naming the node,
//! not as deserialization failures.

use std::collections::BTreeMap;
use std::fmt;

use crate::node::NodeKind;
use crate::slot::ValueKind;

/// A complete node graph.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeGraph {
    pub variables: Vec<VariableDecl>,
    pub nodes: Vec<NodeDescriptor>,
}

impl TreeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, variable: VariableDecl) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_node(mut self, node: NodeDescriptor) -> Self {
        self.nodes.push(node);
        self
    }

    /// The first descriptor whose kind is `Root`.
    pub fn root(&self) -> Option<&NodeDescriptor> {
        self.nodes
            .iter()
            .find(|node| node.kind.parse::<NodeKind>() == Ok(NodeKind::Root))
    }

    pub fn find(&self, id: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One node of a [`TreeGraph`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDescriptor {
    /// Kind tag, e.g. `"Sequencer"` or `"LoopNode"`.
    pub kind: String,
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: NodeParams,
}

impl NodeDescriptor {
    pub fn new(kind: impl fmt::Display, id: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.into(),
            children: Vec::new(),
            params: NodeParams::default(),
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.params.unit = Some(unit.into());
        self
    }

    pub fn with_mode(mut self, mode: impl fmt::Display) -> Self {
        self.params.mode = Some(mode.to_string());
        self
    }

    pub fn with_weights(mut self, weights: impl IntoIterator<Item = f32>) -> Self {
        self.params.weights = weights.into_iter().collect();
        self
    }

    pub fn with_input(mut self, input: Argument) -> Self {
        self.params.inputs.push(input);
        self
    }

    pub fn with_output(mut self, variable: impl Into<String>) -> Self {
        self.params.outputs.push(variable.into());
        self
    }

    pub fn with_period_ms(mut self, period_ms: u64) -> Self {
        self.params.period_ms = Some(period_ms);
        self
    }

    pub fn with_subtree(mut self, subtree: SubtreeRef) -> Self {
        self.params.subtree = Some(subtree);
        self
    }
}

/// Per-kind descriptor payload. Fields a kind does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeParams {
    /// Behavior unit type name (ConditionNode, LoopConditionNode, ActionNode).
    pub unit: Option<String>,
    /// LoopConditionNode mode: `Once`, `True`, `True -> False` or `Both`.
    pub mode: Option<String>,
    /// WeightedRandomSelector weights, one per child.
    pub weights: Vec<f32>,
    /// Input arguments, bound positionally to the unit's input slots.
    pub inputs: Vec<Argument>,
    /// Output variables, bound positionally to the unit's output slots.
    pub outputs: Vec<String>,
    /// Polling period override for Loop and LoopConditionNode.
    pub period_ms: Option<u64>,
    /// FunctionNode subtree.
    pub subtree: Option<SubtreeRef>,
}

/// Descriptor-level input argument.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Argument {
    /// Constant, parsed into the slot type at build time.
    Literal(String),
    /// Blackboard variable, read every time the unit uses the input.
    Variable(String),
}

impl Argument {
    pub fn literal(text: impl fmt::Display) -> Self {
        Argument::Literal(text.to_string())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Argument::Variable(name.into())
    }
}

/// Where a FunctionNode finds its nested graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubtreeRef {
    Inline(Box<TreeGraph>),
    /// Looked up in the builder's [`TreeLibrary`].
    Named(String),
}

/// A blackboard variable declared by a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDecl {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: Option<ValueKind>,
    /// Initial value, as a literal of `kind`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<String>,
}

impl VariableDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            value: None,
        }
    }

    pub fn seeded(name: impl Into<String>, kind: ValueKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            value: Some(value.into()),
        }
    }
}

/// Named graphs available to FunctionNodes.
#[derive(Debug, Clone, Default)]
pub struct TreeLibrary {
    graphs: BTreeMap<String, TreeGraph>,
}

impl TreeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a graph, replacing any graph of the same name.
    pub fn insert(&mut self, name: impl Into<String>, graph: TreeGraph) -> Option<TreeGraph> {
        self.graphs.insert(name.into(), graph)
    }

    pub fn with(mut self, name: impl Into<String>, graph: TreeGraph) -> Self {
        self.insert(name, graph);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TreeGraph> {
        self.graphs.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
