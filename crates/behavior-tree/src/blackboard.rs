//! Typed variable store shared by the nodes of one tree.
//!
//! The [`Blackboard`] maps names to values of an arbitrary `'static` type.
//! The type of an entry is fixed by its first write; reads and later writes
//! with another type fail with [`BlackboardError::TypeMismatch`].
//!
//! There is no locking: a tree is evaluated on one thread and writes made by
//! one node are visible to every node evaluated after it in the same tick.

use std::any::{Any, type_name};
use std::collections::HashMap;

use thiserror::Error;

/// Errors raised by blackboard reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard variable `{name}` not found")]
    NotFound { name: String },

    #[error("blackboard variable `{name}` holds {found}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

struct Entry {
    type_name: &'static str,
    value: Box<dyn Any>,
}

/// Named, typed values exchanged between behavior units.
#[derive(Default)]
pub struct Blackboard {
    entries: HashMap<String, Entry>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or updates the entry `name`.
    ///
    /// Fails with `TypeMismatch` if the entry already exists with another type.
    pub fn write<V: Any>(&mut self, name: &str, value: V) -> Result<(), BlackboardError> {
        match self.entries.get_mut(name) {
            Some(entry) => match entry.value.downcast_mut::<V>() {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(BlackboardError::TypeMismatch {
                    name: name.to_owned(),
                    expected: type_name::<V>(),
                    found: entry.type_name,
                }),
            },
            None => {
                self.entries.insert(
                    name.to_owned(),
                    Entry {
                        type_name: type_name::<V>(),
                        value: Box::new(value),
                    },
                );
                Ok(())
            }
        }
    }

    /// Borrows the current value of `name`.
    pub fn get<V: Any>(&self, name: &str) -> Result<&V, BlackboardError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| BlackboardError::NotFound {
                name: name.to_owned(),
            })?;

        entry
            .value
            .downcast_ref::<V>()
            .ok_or_else(|| BlackboardError::TypeMismatch {
                name: name.to_owned(),
                expected: type_name::<V>(),
                found: entry.type_name,
            })
    }

    /// Returns a copy of the current value of `name`.
    pub fn read<V: Any + Clone>(&self, name: &str) -> Result<V, BlackboardError> {
        self.get::<V>(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the Rust type name stored under `name`, if any.
    pub fn type_name_of(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).map(|entry| entry.type_name)
    }

    /// Removes `name`, returning `true` if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(name, entry)| (name, entry.type_name)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let mut bb = Blackboard::new();
        bb.write("speed", 2.5_f32).unwrap();
        assert_eq!(bb.read::<f32>("speed"), Ok(2.5));

        bb.write("speed", 4.0_f32).unwrap();
        assert_eq!(bb.read::<f32>("speed"), Ok(4.0));
        assert_eq!(bb.len(), 1);
    }

    #[test]
    fn missing_entry_is_not_found() {
        let bb = Blackboard::new();
        assert_eq!(
            bb.read::<i32>("hp"),
            Err(BlackboardError::NotFound {
                name: "hp".to_owned()
            })
        );
    }

    #[test]
    fn type_is_fixed_by_first_write() {
        let mut bb = Blackboard::new();
        bb.write("hp", 10_i32).unwrap();

        assert!(matches!(
            bb.write("hp", 1.0_f32),
            Err(BlackboardError::TypeMismatch { .. })
        ));
        assert!(matches!(
            bb.read::<f32>("hp"),
            Err(BlackboardError::TypeMismatch { .. })
        ));
        assert_eq!(bb.read::<i32>("hp"), Ok(10));
    }

    #[test]
    fn remove_and_clear() {
        let mut bb = Blackboard::new();
        bb.write("a", true).unwrap();
        bb.write("b", String::from("x")).unwrap();

        assert!(bb.remove("a"));
        assert!(!bb.contains("a"));
        assert_eq!(bb.type_name_of("b"), Some(type_name::<String>()));

        bb.clear();
        assert!(bb.is_empty());
    }
}
