//! Behavior unit contract.
//!
//! Behavior units are the externally supplied leaves of a tree:
//! - [`Condition`]: polled synchronously, answers yes or no.
//! - [`Action`]: started once, updated once per host tick, and finished by
//!   calling [`UnitContext::finish`].
//!
//! Units never see the tree. They get a [`UnitContext`] exposing the target
//! entity (opaque to the engine), the blackboard, and the finish signal.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::blackboard::{Blackboard, BlackboardError};
use crate::slot::{Input, Output, SlotValue};

/// Fault raised by a behavior unit.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Blackboard(#[from] BlackboardError),

    #[error("{0}")]
    Fault(String),
}

pub type UnitResult<T = ()> = Result<T, UnitError>;

/// View of the world handed to a behavior unit.
pub struct UnitContext<'a, T> {
    target: &'a mut T,
    blackboard: &'a mut Blackboard,
    finished: Option<bool>,
}

impl<'a, T> UnitContext<'a, T> {
    pub fn new(target: &'a mut T, blackboard: &'a mut Blackboard) -> Self {
        Self {
            target,
            blackboard,
            finished: None,
        }
    }

    pub fn target(&self) -> &T {
        &*self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut *self.target
    }

    pub fn blackboard(&self) -> &Blackboard {
        &*self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut *self.blackboard
    }

    /// Reads an input handle.
    pub fn input<V: SlotValue>(&self, input: &Input<V>) -> UnitResult<V> {
        Ok(input.get(&*self.blackboard)?)
    }

    /// Writes an output handle.
    pub fn output<V: SlotValue>(&mut self, output: &Output<V>, value: V) -> UnitResult {
        Ok(output.set(&mut *self.blackboard, value)?)
    }

    /// Ends the current activation with the given verdict.
    pub fn finish(&mut self, success: bool) {
        self.finished = Some(success);
    }

    pub fn succeed(&mut self) {
        self.finish(true);
    }

    pub fn fail(&mut self) {
        self.finish(false);
    }

    /// Verdict passed to [`finish`](Self::finish), if it was called.
    pub fn finished(&self) -> Option<bool> {
        self.finished
    }
}

/// A synchronous yes/no check.
pub trait Condition<T> {
    fn execute(&mut self, cx: &mut UnitContext<'_, T>) -> UnitResult<bool>;
}

/// A behavior that spans host ticks.
pub trait Action<T> {
    /// Called once per activation.
    fn start(&mut self, _cx: &mut UnitContext<'_, T>) -> UnitResult {
        Ok(())
    }

    /// Called once per host tick while active, the first time right after
    /// [`start`](Self::start).
    fn update(&mut self, cx: &mut UnitContext<'_, T>) -> UnitResult;

    /// Called exactly once when the action is cancelled before finishing.
    fn stop(&mut self, _cx: &mut UnitContext<'_, T>) -> UnitResult {
        Ok(())
    }
}

/// Runs a unit callback, turning a panic into [`UnitError::Fault`].
pub(crate) fn guarded<R>(call: impl FnOnce() -> UnitResult<R>) -> UnitResult<R> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "behavior unit panicked".to_owned());
            Err(UnitError::Fault(message))
        }
    }
}
