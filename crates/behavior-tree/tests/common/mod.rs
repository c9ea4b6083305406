//! Shared fixtures: a recording world, scripted units and graph helpers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use behavior_tree::{
    Action, Argument, BindError, Bindings, Condition, Input, NodeDescriptor, NodeKind, NodeState,
    SlotDecl, StateChange, UnitContext, UnitError, UnitRegistry, UnitResult, UnitSpec, ValueKind,
};

/// Per-label call counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub started: u32,
    pub updated: u32,
    pub stopped: u32,
    pub polled: u32,
}

/// Target entity recording every unit call.
#[derive(Debug, Default)]
pub struct World {
    counts: HashMap<String, Counts>,
}

impl World {
    pub fn counts(&self, label: &str) -> Counts {
        self.counts.get(label).copied().unwrap_or_default()
    }

    fn entry(&mut self, label: &str) -> &mut Counts {
        self.counts.entry(label.to_owned()).or_default()
    }
}

/// Condition answering its `value` input.
pub struct Check {
    label: Input<String>,
    value: Input<bool>,
}

impl Check {
    /// Unbound instance answering a constant.
    pub fn constant(label: &str, value: bool) -> Box<dyn Condition<World>> {
        Box::new(Self {
            label: Input::Static(label.to_owned()),
            value: Input::Static(value),
        })
    }
}

impl UnitSpec for Check {
    const NAME: &'static str = "Check";
    const SLOTS: &'static [SlotDecl] = &[
        SlotDecl::input("label", ValueKind::Text),
        SlotDecl::input("value", ValueKind::Bool),
    ];

    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self {
            label: bindings.input("label")?,
            value: bindings.input("value")?,
        })
    }
}

impl Condition<World> for Check {
    fn execute(&mut self, cx: &mut UnitContext<'_, World>) -> UnitResult<bool> {
        let label = cx.input(&self.label)?;
        cx.target_mut().entry(&label).polled += 1;
        cx.input(&self.value)
    }
}

/// Action finishing with `success` after `frames` updates.
pub struct Work {
    label: Input<String>,
    frames: Input<i32>,
    success: Input<bool>,
    done: i32,
}

impl UnitSpec for Work {
    const NAME: &'static str = "Work";
    const SLOTS: &'static [SlotDecl] = &[
        SlotDecl::input("label", ValueKind::Text),
        SlotDecl::input("frames", ValueKind::Int),
        SlotDecl::input("success", ValueKind::Bool),
    ];

    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self {
            label: bindings.input("label")?,
            frames: bindings.input("frames")?,
            success: bindings.input("success")?,
            done: 0,
        })
    }
}

impl Action<World> for Work {
    fn start(&mut self, cx: &mut UnitContext<'_, World>) -> UnitResult {
        self.done = 0;
        let label = cx.input(&self.label)?;
        cx.target_mut().entry(&label).started += 1;
        Ok(())
    }

    fn update(&mut self, cx: &mut UnitContext<'_, World>) -> UnitResult {
        let label = cx.input(&self.label)?;
        cx.target_mut().entry(&label).updated += 1;
        self.done += 1;
        if self.done >= cx.input(&self.frames)? {
            let success = cx.input(&self.success)?;
            cx.finish(success);
        }
        Ok(())
    }

    fn stop(&mut self, cx: &mut UnitContext<'_, World>) -> UnitResult {
        let label = cx.input(&self.label)?;
        cx.target_mut().entry(&label).stopped += 1;
        Ok(())
    }
}

/// Condition that always faults.
pub struct Broken;

impl UnitSpec for Broken {
    const NAME: &'static str = "Broken";
    const SLOTS: &'static [SlotDecl] = &[];

    fn bind(_: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Broken)
    }
}

impl Condition<World> for Broken {
    fn execute(&mut self, _cx: &mut UnitContext<'_, World>) -> UnitResult<bool> {
        Err(UnitError::Fault("sensor offline".into()))
    }
}

pub fn registry() -> UnitRegistry<World> {
    UnitRegistry::builder()
        .condition::<Check>()
        .condition::<Broken>()
        .action::<Work>()
        .build()
}

pub fn node(kind: NodeKind, id: &str, children: &[&str]) -> NodeDescriptor {
    NodeDescriptor::new(kind, id).with_children(children.iter().copied())
}

pub fn root(child: &str) -> NodeDescriptor {
    node(NodeKind::Root, "root", &[child])
}

/// Condition node labelled `id` answering `value` (a literal or a variable).
pub fn check(id: &str, value: Argument) -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::ConditionNode, id)
        .with_unit("Check")
        .with_input(Argument::literal(id))
        .with_input(value)
}

/// Action node labelled `id`.
pub fn work(id: &str, frames: i32, success: bool) -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::ActionNode, id)
        .with_unit("Work")
        .with_input(Argument::literal(id))
        .with_input(Argument::literal(frames))
        .with_input(Argument::literal(success))
}

/// Records every state change as `(key, state)`.
#[derive(Clone, Default)]
pub struct Recorder {
    changes: Rc<RefCell<Vec<(String, NodeState)>>>,
}

impl Recorder {
    pub fn observer(&self) -> impl FnMut(&StateChange<'_>) + 'static {
        let changes = Rc::clone(&self.changes);
        move |change: &StateChange<'_>| {
            changes
                .borrow_mut()
                .push((change.key.to_owned(), change.state))
        }
    }

    pub fn states_of(&self, key: &str) -> Vec<NodeState> {
        self.changes
            .borrow()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, state)| *state)
            .collect()
    }
}
