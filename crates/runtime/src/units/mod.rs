//! Behavior units shipped with the reference host.
//!
//! - [`common`]: waits and comparisons that only need the frame clock
//! - [`motion`]: units that move, turn, or locate the [`Pawn`](crate::Pawn)

pub mod common;
pub mod motion;

pub use common::{IsSmaller, IsTrue, WaitOneFrame, WaitSecond};
pub use motion::{MoveAction, RotateAction, StorePosition};

use behavior_tree::{UnitRegistry, UnitRegistryBuilder};

use crate::Pawn;

/// Adds every shipped unit to `builder`.
pub fn register_standard(builder: UnitRegistryBuilder<Pawn>) -> UnitRegistryBuilder<Pawn> {
    builder
        .action::<WaitOneFrame>()
        .action::<WaitSecond>()
        .action::<MoveAction>()
        .action::<RotateAction>()
        .action::<StorePosition>()
        .condition::<IsSmaller>()
        .condition::<IsTrue>()
}

/// Registry holding every shipped unit.
pub fn standard_units() -> UnitRegistry<Pawn> {
    register_standard(UnitRegistry::builder()).build()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use behavior_tree::{Action, Argument, Bindings, Blackboard, UnitContext, UnitSpec};

    use crate::Pawn;

    /// Binds `U` from literal inputs and output variable names.
    pub fn bind<U: UnitSpec>(inputs: &[&str], outputs: &[&str]) -> U {
        let inputs: Vec<Argument> = inputs.iter().map(Argument::literal).collect();
        let outputs: Vec<String> = outputs.iter().map(|s| (*s).to_owned()).collect();
        U::bind(&Bindings::new(U::SLOTS, &inputs, &outputs)).expect("unit binds")
    }

    /// Drives an action the way `ActionNode` does: start, then one update
    /// per frame. Returns the verdict and the number of updates it took.
    pub fn run_action(
        action: &mut dyn Action<Pawn>,
        pawn: &mut Pawn,
        blackboard: &mut Blackboard,
        dt: Duration,
        max_updates: usize,
    ) -> (Option<bool>, usize) {
        pawn.begin_frame(dt);
        let mut cx = UnitContext::new(pawn, blackboard);
        action.start(&mut cx).expect("start");
        for updates in 1..=max_updates {
            action.update(&mut cx).expect("update");
            if let Some(verdict) = cx.finished() {
                return (Some(verdict), updates);
            }
        }
        (None, max_updates)
    }

    pub const FRAME: Duration = Duration::from_millis(100);
}
