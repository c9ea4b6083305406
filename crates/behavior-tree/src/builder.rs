//! Tree construction from node-graph descriptors.
//!
//! [`TreeBuilder`] walks the graph depth first from its root descriptor,
//! numbering nodes in pre-order and building children before their parent.
//! Behavior units are looked up in a [`UnitRegistry`] and bound to the
//! descriptor's arguments; FunctionNode subtrees come inline or from a
//! [`TreeLibrary`]. Any inconsistency aborts the build.

use std::collections::HashSet;
use std::time::Duration;

use crate::blackboard::Blackboard;
use crate::composite::{Selector, Sequencer, SimpleParallel, WeightedRandomSelector};
use crate::conditional::{ConditionMode, LoopConditionNode};
use crate::config::TreeConfig;
use crate::decorator::{InverseDecorator, Loop, Repeater, Root};
use crate::error::{BuildError, Result, UnitRole};
use crate::graph::{Argument, NodeDescriptor, NodeParams, SubtreeRef, TreeGraph, TreeLibrary};
use crate::host::NodeId;
use crate::leaf::{ActionNode, ConditionNode};
use crate::node::{Node, NodeCore, NodeKind, StateObserver};
use crate::random::{RandSampler, Sampler};
use crate::registry::{Bindings, UnitFactory, UnitRegistry};
use crate::slot::SlotDirection;
use crate::tree::BehaviorTree;
use crate::unit::Condition;

/// Builds [`BehaviorTree`]s against a unit registry.
pub struct TreeBuilder<'r, T> {
    registry: &'r UnitRegistry<T>,
    library: Option<&'r TreeLibrary>,
    config: TreeConfig,
    sampler: Option<Box<dyn Sampler>>,
    observer: Option<Box<dyn StateObserver>>,
}

impl<'r, T: 'static> TreeBuilder<'r, T> {
    pub fn new(registry: &'r UnitRegistry<T>) -> Self {
        Self {
            registry,
            library: None,
            config: TreeConfig::default(),
            sampler: None,
            observer: None,
        }
    }

    /// Named subtrees for `SubtreeRef::Named` function nodes.
    pub fn with_library(mut self, library: &'r TreeLibrary) -> Self {
        self.library = Some(library);
        self
    }

    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the sampler derived from [`TreeConfig::seed`].
    pub fn with_sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    pub fn with_observer(mut self, observer: impl StateObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn build(self, graph: &TreeGraph) -> Result<BehaviorTree<T>> {
        let mut assembly = Assembly {
            registry: self.registry,
            library: self.library,
            config: self.config,
            next: NodeId(0),
            blackboard: Blackboard::new(),
            declared: HashSet::new(),
            subtrees: Vec::new(),
        };

        let root_desc = graph
            .root()
            .ok_or(if graph.is_empty() {
                BuildError::EmptyGraph
            } else {
                BuildError::MissingRoot
            })?;
        let root_id = assembly.alloc();
        let child = assembly.build_body(graph, "")?;
        let root: Box<dyn Node<T>> = Box::new(Root::new(
            NodeCore::new(root_id, NodeKind::Root, root_desc.id.as_str()),
            child,
        ));

        let sampler = self.sampler.unwrap_or_else(|| match self.config.seed {
            Some(seed) => Box::new(RandSampler::seeded(seed)),
            None => Box::new(RandSampler::from_entropy()),
        });

        tracing::debug!(
            root = %root_desc.id,
            nodes = assembly.next.0,
            variables = assembly.blackboard.len(),
            "behavior tree built"
        );
        Ok(BehaviorTree::new(
            root,
            assembly.blackboard,
            sampler,
            self.observer,
            assembly.next.0,
        ))
    }
}

/// How many children a kind accepts.
#[derive(Debug, Clone, Copy)]
enum Arity {
    None,
    One,
    Two,
    AtLeastOne,
}

impl Arity {
    fn of(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Selector | NodeKind::Sequencer | NodeKind::WeightedRandomSelector => {
                Arity::AtLeastOne
            }
            NodeKind::SimpleParallel => Arity::Two,
            NodeKind::Root
            | NodeKind::Repeater
            | NodeKind::Loop
            | NodeKind::InverseDecorator
            | NodeKind::LoopConditionNode => Arity::One,
            NodeKind::ConditionNode | NodeKind::ActionNode | NodeKind::FunctionNode => Arity::None,
        }
    }

    fn accepts(self, count: usize) -> bool {
        match self {
            Arity::None => count == 0,
            Arity::One => count == 1,
            Arity::Two => count == 2,
            Arity::AtLeastOne => count >= 1,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Arity::None => "no",
            Arity::One => "exactly 1",
            Arity::Two => "exactly 2",
            Arity::AtLeastOne => "at least 1",
        }
    }
}

/// Mutable state of one build.
struct Assembly<'r, T> {
    registry: &'r UnitRegistry<T>,
    library: Option<&'r TreeLibrary>,
    config: TreeConfig,
    next: NodeId,
    blackboard: Blackboard,
    declared: HashSet<String>,
    /// Named subtrees currently being expanded, outermost first.
    subtrees: Vec<String>,
}

impl<T: 'static> Assembly<'_, T> {
    fn alloc(&mut self) -> NodeId {
        let id = self.next;
        self.next = id.next();
        id
    }

    /// Builds the subtree under `graph`'s root descriptor.
    fn build_body(&mut self, graph: &TreeGraph, prefix: &str) -> Result<Box<dyn Node<T>>> {
        if graph.is_empty() {
            return Err(BuildError::EmptyGraph);
        }
        let root = graph.root().ok_or(BuildError::MissingRoot)?;
        self.declare(graph)?;

        let key = scoped(prefix, &root.id);
        let [child_id] = root.children.as_slice() else {
            return Err(BuildError::ChildCountMismatch {
                id: key,
                kind: NodeKind::Root,
                expected: Arity::One.describe(),
                found: root.children.len(),
            });
        };
        let child = graph.find(child_id).ok_or_else(|| BuildError::MissingNode {
            parent: key,
            child: child_id.clone(),
        })?;

        let mut visited = HashSet::from([root.id.as_str()]);
        let node = self.build_node(graph, child, prefix, &mut visited)?;

        for desc in &graph.nodes {
            if !visited.contains(desc.id.as_str()) {
                tracing::warn!(node = %scoped(prefix, &desc.id), "descriptor unreachable from root; ignored");
            }
        }
        Ok(node)
    }

    /// Registers and seeds the variables `graph` declares.
    fn declare(&mut self, graph: &TreeGraph) -> Result<()> {
        for decl in &graph.variables {
            match (decl.kind, decl.value.as_deref()) {
                (Some(kind), Some(value)) => {
                    if !kind.seed(&mut self.blackboard, &decl.name, value) {
                        return Err(BuildError::InvalidVariable {
                            name: decl.name.clone(),
                            reason: format!("`{value}` is not a valid {kind}"),
                        });
                    }
                }
                (None, Some(_)) => {
                    return Err(BuildError::InvalidVariable {
                        name: decl.name.clone(),
                        reason: "an initial value needs a kind".to_owned(),
                    });
                }
                _ => {}
            }
            self.declared.insert(decl.name.clone());
        }
        Ok(())
    }

    fn build_node<'g>(
        &mut self,
        graph: &'g TreeGraph,
        desc: &'g NodeDescriptor,
        prefix: &str,
        visited: &mut HashSet<&'g str>,
    ) -> Result<Box<dyn Node<T>>> {
        let key = scoped(prefix, &desc.id);
        if !visited.insert(desc.id.as_str()) {
            return Err(BuildError::SharedChild { id: key });
        }

        let kind: NodeKind = desc
            .kind
            .parse()
            .map_err(|_| BuildError::UnknownNodeKind {
                id: key.clone(),
                kind: desc.kind.clone(),
            })?;
        let arity = Arity::of(kind);
        if !arity.accepts(desc.children.len()) {
            return Err(BuildError::ChildCountMismatch {
                id: key,
                kind,
                expected: arity.describe(),
                found: desc.children.len(),
            });
        }

        let id = self.alloc();
        let core = NodeCore::new(id, kind, key.as_str());

        let mut children = Vec::with_capacity(desc.children.len());
        for child_id in &desc.children {
            let child = graph.find(child_id).ok_or_else(|| BuildError::MissingNode {
                parent: key.clone(),
                child: child_id.clone(),
            })?;
            children.push(self.build_node(graph, child, prefix, visited)?);
        }

        tracing::debug!(node = %key, %kind, id = id.0, "node built");
        let params = &desc.params;
        let node: Box<dyn Node<T>> = match kind {
            NodeKind::Root => Box::new(Root::new(core, single(children, kind, &key)?)),
            NodeKind::Selector => Box::new(Selector::new(core, children)),
            NodeKind::Sequencer => Box::new(Sequencer::new(core, children)),
            NodeKind::WeightedRandomSelector => Box::new(
                WeightedRandomSelector::new(core, children, &params.weights)
                    .map_err(|source| BuildError::InvalidWeights { id: key, source })?,
            ),
            NodeKind::SimpleParallel => {
                let [main, sub] = take::<_, 2>(children, kind, &key)?;
                Box::new(SimpleParallel::new(core, main, sub))
            }
            NodeKind::Repeater => Box::new(Repeater::new(core, single(children, kind, &key)?)),
            NodeKind::Loop => {
                let period = period(params, self.config.loop_period());
                Box::new(Loop::new(core, single(children, kind, &key)?, period))
            }
            NodeKind::InverseDecorator => Box::new(InverseDecorator::new(core, single(children, kind, &key)?)),
            NodeKind::LoopConditionNode => {
                let mode = mode(params, &key)?;
                let (name, unit) = self.condition_unit(params, &key)?;
                let period = period(params, self.config.poll_period());
                Box::new(LoopConditionNode::new(
                    core,
                    single(children, kind, &key)?,
                    name,
                    unit,
                    mode,
                    period,
                ))
            }
            NodeKind::ConditionNode => {
                let (name, unit) = self.condition_unit(params, &key)?;
                Box::new(ConditionNode::new(core, name, unit))
            }
            NodeKind::ActionNode => {
                let name = required(params.unit.as_deref(), &key, "unit")?;
                let factory = self.registry.action(name).ok_or_else(|| {
                    BuildError::UnknownBehaviorType {
                        id: key.clone(),
                        role: UnitRole::Action,
                        name: name.to_owned(),
                    }
                })?;
                let unit = self.bind(&key, name, factory, params)?;
                Box::new(ActionNode::new(core, name, unit))
            }
            NodeKind::FunctionNode => {
                let body = self.build_function(params, &key)?;
                Box::new(Root::new(core, body))
            }
        };
        Ok(node)
    }

    fn build_function(&mut self, params: &NodeParams, key: &str) -> Result<Box<dyn Node<T>>> {
        let subtree = params
            .subtree
            .as_ref()
            .ok_or_else(|| BuildError::MissingParameter {
                id: key.to_owned(),
                name: "subtree",
            })?;

        match subtree {
            SubtreeRef::Inline(graph) => self.build_body(graph, key),
            SubtreeRef::Named(name) => {
                if self.subtrees.iter().any(|open| open == name) {
                    return Err(BuildError::RecursiveSubtree { name: name.clone() });
                }
                let graph = self
                    .library
                    .and_then(|library| library.get(name))
                    .ok_or_else(|| BuildError::UnknownSubtree {
                        id: key.to_owned(),
                        name: name.clone(),
                    })?;

                self.subtrees.push(name.clone());
                let body = self.build_body(graph, key);
                self.subtrees.pop();
                body
            }
        }
    }

    fn condition_unit(
        &self,
        params: &NodeParams,
        key: &str,
    ) -> Result<(String, Box<dyn Condition<T>>)> {
        let name = required(params.unit.as_deref(), key, "unit")?;
        let factory =
            self.registry
                .condition(name)
                .ok_or_else(|| BuildError::UnknownBehaviorType {
                    id: key.to_owned(),
                    role: UnitRole::Condition,
                    name: name.to_owned(),
                })?;
        let unit = self.bind(key, name, factory, params)?;
        Ok((name.to_owned(), unit))
    }

    /// Checks argument counts and binds them to the unit's slots.
    fn bind<U: ?Sized>(
        &self,
        key: &str,
        unit: &str,
        factory: &UnitFactory<U>,
        params: &NodeParams,
    ) -> Result<Box<U>> {
        for (direction, found) in [
            (SlotDirection::Input, params.inputs.len()),
            (SlotDirection::Output, params.outputs.len()),
        ] {
            let expected = factory.arity(direction);
            if expected != found {
                return Err(BuildError::ArgumentArityMismatch {
                    id: key.to_owned(),
                    unit: unit.to_owned(),
                    direction,
                    expected,
                    found,
                });
            }
        }

        let variables = params
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                Argument::Variable(name) => Some(name.as_str()),
                Argument::Literal(_) => None,
            })
            .chain(params.outputs.iter().map(String::as_str));
        for variable in variables {
            if !self.declared.contains(variable) {
                tracing::warn!(node = %key, %unit, %variable, "argument uses an undeclared variable");
            }
        }

        let bindings = Bindings::new(factory.slots(), &params.inputs, &params.outputs);
        factory
            .create(&bindings)
            .map_err(|source| BuildError::Bind {
                id: key.to_owned(),
                unit: unit.to_owned(),
                source,
            })
    }
}

/// Descriptor key of `id` inside a function subtree `prefix`.
fn scoped(prefix: &str, id: &str) -> String {
    if prefix.is_empty() {
        id.to_owned()
    } else {
        format!("{prefix}/{id}")
    }
}

/// Moves exactly `N` children out of `children`.
fn take<T, const N: usize>(
    children: Vec<Box<dyn Node<T>>>,
    kind: NodeKind,
    key: &str,
) -> Result<[Box<dyn Node<T>>; N]> {
    let found = children.len();
    children
        .try_into()
        .map_err(|_| BuildError::ChildCountMismatch {
            id: key.to_owned(),
            kind,
            expected: Arity::of(kind).describe(),
            found,
        })
}

fn single<T>(children: Vec<Box<dyn Node<T>>>, kind: NodeKind, key: &str) -> Result<Box<dyn Node<T>>> {
    let [child] = take::<_, 1>(children, kind, key)?;
    Ok(child)
}

fn required<'p>(value: Option<&'p str>, key: &str, name: &'static str) -> Result<&'p str> {
    value.ok_or_else(|| BuildError::MissingParameter {
        id: key.to_owned(),
        name,
    })
}

fn mode(params: &NodeParams, key: &str) -> Result<ConditionMode> {
    let text = required(params.mode.as_deref(), key, "mode")?;
    text.parse().map_err(|_| BuildError::InvalidParameter {
        id: key.to_owned(),
        name: "mode",
        reason: format!("`{text}` is not one of Once, True, True -> False, Both"),
    })
}

fn period(params: &NodeParams, default: Duration) -> Duration {
    params.period_ms.map(Duration::from_millis).unwrap_or(default)
}
