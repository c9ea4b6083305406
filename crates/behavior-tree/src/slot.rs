//! Typed input/output handles of behavior units.
//!
//! A unit declares its slots up front as a list of [`SlotDecl`]s. The tree
//! builder binds each slot to an argument of the node descriptor and hands
//! the unit resolved [`Input`] and [`Output`] handles.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::blackboard::{Blackboard, BlackboardError};

/// Two-component vector value.
pub type Vec2 = [f32; 2];

/// Three-component vector value.
pub type Vec3 = [f32; 3];

/// Name of a host-defined value type.
pub type CustomKindName = &'static str;

/// Value type carried by a slot or blackboard declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Text,
    Vector2,
    Vector3,
    /// Host-defined type. Only dynamic (blackboard) bindings are possible.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(CustomKindName),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int => f.write_str("int"),
            ValueKind::Float => f.write_str("float"),
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Text => f.write_str("text"),
            ValueKind::Vector2 => f.write_str("vector2"),
            ValueKind::Vector3 => f.write_str("vector3"),
            ValueKind::Custom(name) => write!(f, "custom `{name}`"),
        }
    }
}

impl ValueKind {
    /// Parses `literal` as this kind and writes it to `blackboard` under `name`.
    ///
    /// Returns `false` if the literal does not parse or the kind has no
    /// literal form.
    pub fn seed(self, blackboard: &mut Blackboard, name: &str, literal: &str) -> bool {
        fn put<V: SlotValue>(bb: &mut Blackboard, name: &str, literal: &str) -> bool {
            V::parse_literal(literal)
                .map(|value| bb.write(name, value).is_ok())
                .unwrap_or(false)
        }

        match self {
            ValueKind::Int => put::<i32>(blackboard, name, literal),
            ValueKind::Float => put::<f32>(blackboard, name, literal),
            ValueKind::Bool => put::<bool>(blackboard, name, literal),
            ValueKind::Text => put::<String>(blackboard, name, literal),
            ValueKind::Vector2 => put::<Vec2>(blackboard, name, literal),
            ValueKind::Vector3 => put::<Vec3>(blackboard, name, literal),
            ValueKind::Custom(_) => false,
        }
    }
}

/// A Rust type that can flow through a slot.
pub trait SlotValue: Any + Clone {
    const KIND: ValueKind;

    /// Parses the literal form used in node descriptors.
    fn parse_literal(text: &str) -> Option<Self>;
}

impl SlotValue for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn parse_literal(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl SlotValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn parse_literal(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl SlotValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    // "1" is what the graph editor writes for a checked box.
    fn parse_literal(text: &str) -> Option<Self> {
        match text.trim() {
            "1" | "true" | "True" => Some(true),
            "0" | "false" | "False" | "" => Some(false),
            _ => None,
        }
    }
}

impl SlotValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn parse_literal(text: &str) -> Option<Self> {
        Some(text.to_owned())
    }
}

impl SlotValue for Vec2 {
    const KIND: ValueKind = ValueKind::Vector2;

    fn parse_literal(text: &str) -> Option<Self> {
        let [x, y] = parse_components::<2>(text)?;
        Some([x, y])
    }
}

impl SlotValue for Vec3 {
    const KIND: ValueKind = ValueKind::Vector3;

    fn parse_literal(text: &str) -> Option<Self> {
        parse_components::<3>(text)
    }
}

/// Parses `"x, y[, z]"`, optionally wrapped in parentheses.
fn parse_components<const N: usize>(text: &str) -> Option<[f32; N]> {
    let inner = text.trim().trim_start_matches('(').trim_end_matches(')');
    let mut out = [0.0; N];
    let mut parts = inner.split(',');
    for slot in out.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Whether a slot is read or written by the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SlotDirection {
    Input,
    Output,
}

/// One declared slot of a behavior unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDecl {
    pub name: &'static str,
    pub kind: ValueKind,
    pub direction: SlotDirection,
}

impl SlotDecl {
    pub const fn input(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            direction: SlotDirection::Input,
        }
    }

    pub const fn output(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            direction: SlotDirection::Output,
        }
    }
}

/// A resolved input: a constant, or a blackboard variable read on every use.
#[derive(Debug, Clone, PartialEq)]
pub enum Input<V> {
    Static(V),
    Dynamic(String),
}

impl<V: SlotValue> Input<V> {
    /// Reads the current value.
    pub fn get(&self, blackboard: &Blackboard) -> Result<V, BlackboardError> {
        match self {
            Input::Static(value) => Ok(value.clone()),
            Input::Dynamic(name) => blackboard.read::<V>(name),
        }
    }

    /// Name of the bound variable, for dynamic inputs.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Input::Static(_) => None,
            Input::Dynamic(name) => Some(name),
        }
    }
}

/// A resolved output: writes a blackboard variable, creating it if absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Output<V> {
    variable: String,
    _value: PhantomData<fn(V)>,
}

impl<V: SlotValue> Output<V> {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            _value: PhantomData,
        }
    }

    pub fn set(&self, blackboard: &mut Blackboard, value: V) -> Result<(), BlackboardError> {
        blackboard.write(&self.variable, value)
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }
}
