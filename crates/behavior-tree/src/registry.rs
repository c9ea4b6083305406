//! Behavior unit registry.
//!
//! The registry maps unit type names to a declared slot list and a factory.
//! It is assembled once through [`UnitRegistryBuilder`] and is read-only
//! afterwards; the tree builder only looks entries up.

use std::collections::HashMap;

use crate::error::BindError;
use crate::graph::Argument;
use crate::slot::{Input, Output, SlotDecl, SlotDirection, SlotValue};
use crate::unit::{Action, Condition};

/// A behavior unit type that can be registered by type.
///
/// ```ignore
/// impl UnitSpec for WaitSecond {
///     const NAME: &'static str = "WaitSecond";
///     const SLOTS: &'static [SlotDecl] = &[
///         SlotDecl::input("min", ValueKind::Float),
///         SlotDecl::input("max", ValueKind::Float),
///     ];
///
///     fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
///         Ok(Self::new(bindings.input("min")?, bindings.input("max")?))
///     }
/// }
/// ```
pub trait UnitSpec: Sized {
    const NAME: &'static str;
    const SLOTS: &'static [SlotDecl];

    /// Creates an instance from the node's resolved arguments.
    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError>;
}

/// Descriptor arguments matched to declared slots.
///
/// Inputs pair with input slots and outputs with output slots, positionally
/// in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Bindings<'a> {
    inputs: Vec<(&'a SlotDecl, &'a Argument)>,
    outputs: Vec<(&'a SlotDecl, &'a str)>,
}

impl<'a> Bindings<'a> {
    pub fn new(slots: &'a [SlotDecl], inputs: &'a [Argument], outputs: &'a [String]) -> Self {
        let input_slots = slots.iter().filter(|s| s.direction == SlotDirection::Input);
        let output_slots = slots.iter().filter(|s| s.direction == SlotDirection::Output);
        Self {
            inputs: input_slots.zip(inputs.iter()).collect(),
            outputs: output_slots
                .zip(outputs.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Resolves input slot `name` as a `V`.
    pub fn input<V: SlotValue>(&self, name: &str) -> Result<Input<V>, BindError> {
        let (decl, argument) = self
            .inputs
            .iter()
            .find(|(decl, _)| decl.name == name)
            .ok_or_else(|| BindError::UnknownSlot {
                slot: name.to_owned(),
                direction: SlotDirection::Input,
            })?;
        check_kind::<V>(decl)?;

        match argument {
            Argument::Variable(variable) => Ok(Input::Dynamic(variable.clone())),
            Argument::Literal(text) => V::parse_literal(text).map(Input::Static).ok_or_else(|| {
                BindError::InvalidLiteral {
                    slot: name.to_owned(),
                    literal: text.clone(),
                    kind: decl.kind,
                }
            }),
        }
    }

    /// Resolves output slot `name` as a `V`.
    pub fn output<V: SlotValue>(&self, name: &str) -> Result<Output<V>, BindError> {
        let (decl, variable) = self
            .outputs
            .iter()
            .find(|(decl, _)| decl.name == name)
            .ok_or_else(|| BindError::UnknownSlot {
                slot: name.to_owned(),
                direction: SlotDirection::Output,
            })?;
        check_kind::<V>(decl)?;
        Ok(Output::new(*variable))
    }
}

fn check_kind<V: SlotValue>(decl: &SlotDecl) -> Result<(), BindError> {
    if decl.kind == V::KIND {
        Ok(())
    } else {
        Err(BindError::KindMismatch {
            slot: decl.name.to_owned(),
            declared: decl.kind,
            requested: V::KIND,
        })
    }
}

type Factory<U> = Box<dyn Fn(&Bindings<'_>) -> Result<Box<U>, BindError>>;

/// Slot list and constructor of one registered unit type.
pub struct UnitFactory<U: ?Sized> {
    slots: Vec<SlotDecl>,
    create: Factory<U>,
}

impl<U: ?Sized> UnitFactory<U> {
    pub fn slots(&self) -> &[SlotDecl] {
        &self.slots
    }

    /// Number of declared slots in `direction`.
    pub fn arity(&self, direction: SlotDirection) -> usize {
        self.slots
            .iter()
            .filter(|s| s.direction == direction)
            .count()
    }

    pub fn create(&self, bindings: &Bindings<'_>) -> Result<Box<U>, BindError> {
        (self.create)(bindings)
    }
}

/// Immutable name → unit factory table.
pub struct UnitRegistry<T> {
    actions: HashMap<String, UnitFactory<dyn Action<T>>>,
    conditions: HashMap<String, UnitFactory<dyn Condition<T>>>,
}

impl<T> UnitRegistry<T> {
    pub fn builder() -> UnitRegistryBuilder<T> {
        UnitRegistryBuilder::new()
    }

    pub fn action(&self, name: &str) -> Option<&UnitFactory<dyn Action<T>>> {
        self.actions.get(name)
    }

    pub fn condition(&self, name: &str) -> Option<&UnitFactory<dyn Condition<T>>> {
        self.conditions.get(name)
    }

    /// Registered action names, sorted.
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered condition names, sorted.
    pub fn condition_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.conditions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<T> std::fmt::Debug for UnitRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitRegistry")
            .field("actions", &self.action_names())
            .field("conditions", &self.condition_names())
            .finish()
    }
}

/// Assembles a [`UnitRegistry`].
pub struct UnitRegistryBuilder<T> {
    actions: HashMap<String, UnitFactory<dyn Action<T>>>,
    conditions: HashMap<String, UnitFactory<dyn Condition<T>>>,
}

impl<T> Default for UnitRegistryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> UnitRegistryBuilder<T> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            conditions: HashMap::new(),
        }
    }

    /// Registers action type `A` under [`UnitSpec::NAME`].
    pub fn action<A>(self) -> Self
    where
        A: UnitSpec + Action<T> + 'static,
    {
        self.register_action(A::NAME, A::SLOTS, |bindings| {
            Ok(Box::new(A::bind(bindings)?) as Box<dyn Action<T>>)
        })
    }

    /// Registers condition type `C` under [`UnitSpec::NAME`].
    pub fn condition<C>(self) -> Self
    where
        C: UnitSpec + Condition<T> + 'static,
    {
        self.register_condition(C::NAME, C::SLOTS, |bindings| {
            Ok(Box::new(C::bind(bindings)?) as Box<dyn Condition<T>>)
        })
    }

    /// Registers an action from an explicit slot list and factory.
    pub fn register_action<F>(
        mut self,
        name: impl Into<String>,
        slots: impl Into<Vec<SlotDecl>>,
        factory: F,
    ) -> Self
    where
        F: Fn(&Bindings<'_>) -> Result<Box<dyn Action<T>>, BindError> + 'static,
    {
        let name = name.into();
        let entry = UnitFactory {
            slots: slots.into(),
            create: Box::new(factory),
        };
        if self.actions.insert(name.clone(), entry).is_some() {
            tracing::warn!(unit = %name, "action registered twice; keeping the last");
        }
        self
    }

    /// Registers a condition from an explicit slot list and factory.
    pub fn register_condition<F>(
        mut self,
        name: impl Into<String>,
        slots: impl Into<Vec<SlotDecl>>,
        factory: F,
    ) -> Self
    where
        F: Fn(&Bindings<'_>) -> Result<Box<dyn Condition<T>>, BindError> + 'static,
    {
        let name = name.into();
        let entry = UnitFactory {
            slots: slots.into(),
            create: Box::new(factory),
        };
        if self.conditions.insert(name.clone(), entry).is_some() {
            tracing::warn!(unit = %name, "condition registered twice; keeping the last");
        }
        self
    }

    pub fn build(self) -> UnitRegistry<T> {
        UnitRegistry {
            actions: self.actions,
            conditions: self.conditions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::ValueKind;
    use crate::unit::{UnitContext, UnitResult};

    struct Above {
        threshold: Input<f32>,
    }

    impl UnitSpec for Above {
        const NAME: &'static str = "Above";
        const SLOTS: &'static [SlotDecl] = &[SlotDecl::input("threshold", ValueKind::Float)];

        fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
            Ok(Self {
                threshold: bindings.input("threshold")?,
            })
        }
    }

    impl Condition<f32> for Above {
        fn execute(&mut self, cx: &mut UnitContext<'_, f32>) -> UnitResult<bool> {
            let threshold = cx.input(&self.threshold)?;
            Ok(*cx.target() > threshold)
        }
    }

    const SLOTS: &[SlotDecl] = &[
        SlotDecl::input("speed", ValueKind::Float),
        SlotDecl::output("home", ValueKind::Vector3),
        SlotDecl::input("label", ValueKind::Text),
    ];

    #[test]
    fn bindings_pair_positionally_per_direction() {
        let inputs = [Argument::literal("2.5"), Argument::variable("name")];
        let outputs = ["spawn".to_owned()];
        let bindings = Bindings::new(SLOTS, &inputs, &outputs);

        assert_eq!(bindings.input::<f32>("speed"), Ok(Input::Static(2.5)));
        assert_eq!(
            bindings.input::<String>("label"),
            Ok(Input::Dynamic("name".into()))
        );
        assert_eq!(
            bindings.output::<[f32; 3]>("home").map(|o| o.variable().to_owned()),
            Ok("spawn".to_owned())
        );
    }

    #[test]
    fn bindings_report_errors() {
        let inputs = [Argument::literal("fast"), Argument::literal("x")];
        let bindings = Bindings::new(SLOTS, &inputs, &[]);

        assert!(matches!(
            bindings.input::<f32>("speed"),
            Err(BindError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            bindings.input::<i32>("label"),
            Err(BindError::KindMismatch {
                declared: ValueKind::Text,
                requested: ValueKind::Int,
                ..
            })
        ));
        assert!(matches!(
            bindings.output::<[f32; 3]>("home"),
            Err(BindError::UnknownSlot { .. })
        ));
    }

    #[test]
    fn registry_creates_bound_units() {
        let registry = UnitRegistry::<f32>::builder().condition::<Above>().build();
        let factory = registry.condition("Above").unwrap();
        assert_eq!(factory.arity(SlotDirection::Input), 1);
        assert!(registry.action("Above").is_none());

        let inputs = [Argument::literal("1.0")];
        let mut unit = factory.create(&Bindings::new(factory.slots(), &inputs, &[])).unwrap();

        let mut target = 3.0_f32;
        let mut bb = crate::Blackboard::new();
        let mut cx = UnitContext::new(&mut target, &mut bb);
        assert!(unit.execute(&mut cx).unwrap());
    }
}
