//! Frame-clock waits and comparisons.

use behavior_tree::{
    Action, BindError, Bindings, Condition, Input, SlotDecl, UnitContext, UnitResult, UnitSpec,
    ValueKind,
};

use crate::Pawn;

/// Succeeds on the update after the one it started on.
#[derive(Debug, Default)]
pub struct WaitOneFrame {
    updates: u32,
}

impl UnitSpec for WaitOneFrame {
    const NAME: &'static str = "WaitOneFrame";
    const SLOTS: &'static [SlotDecl] = &[];

    fn bind(_bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self::default())
    }
}

impl Action<Pawn> for WaitOneFrame {
    fn start(&mut self, _cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        self.updates = 0;
        Ok(())
    }

    fn update(&mut self, cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        if self.updates > 0 {
            cx.succeed();
        }
        self.updates += 1;
        Ok(())
    }
}

/// Waits a random duration in `[min, max)` seconds, drawn on start.
#[derive(Debug)]
pub struct WaitSecond {
    min: Input<f32>,
    max: Input<f32>,
    wait: f32,
    elapsed: f32,
}

impl UnitSpec for WaitSecond {
    const NAME: &'static str = "WaitSecond";
    const SLOTS: &'static [SlotDecl] = &[
        SlotDecl::input("min", ValueKind::Float),
        SlotDecl::input("max", ValueKind::Float),
    ];

    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self {
            min: bindings.input("min")?,
            max: bindings.input("max")?,
            wait: 0.0,
            elapsed: 0.0,
        })
    }
}

impl Action<Pawn> for WaitSecond {
    fn start(&mut self, cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        let min = cx.input(&self.min)?;
        let max = cx.input(&self.max)?;
        self.wait = cx.target_mut().random_range(min, max);
        self.elapsed = 0.0;
        tracing::trace!(wait = self.wait, "WaitSecond started");
        Ok(())
    }

    fn update(&mut self, cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        self.elapsed += cx.target().delta_secs();
        if self.elapsed >= self.wait {
            cx.succeed();
        }
        Ok(())
    }
}

/// `a < b`.
#[derive(Debug)]
pub struct IsSmaller {
    a: Input<f32>,
    b: Input<f32>,
}

impl UnitSpec for IsSmaller {
    const NAME: &'static str = "IsSmaller";
    const SLOTS: &'static [SlotDecl] = &[
        SlotDecl::input("a", ValueKind::Float),
        SlotDecl::input("b", ValueKind::Float),
    ];

    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self {
            a: bindings.input("a")?,
            b: bindings.input("b")?,
        })
    }
}

impl Condition<Pawn> for IsSmaller {
    fn execute(&mut self, cx: &mut UnitContext<'_, Pawn>) -> UnitResult<bool> {
        Ok(cx.input(&self.a)? < cx.input(&self.b)?)
    }
}

/// Reads a boolean flag.
#[derive(Debug)]
pub struct IsTrue {
    flag: Input<bool>,
}

impl UnitSpec for IsTrue {
    const NAME: &'static str = "IsTrue";
    const SLOTS: &'static [SlotDecl] = &[SlotDecl::input("flag", ValueKind::Bool)];

    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self {
            flag: bindings.input("flag")?,
        })
    }
}

impl Condition<Pawn> for IsTrue {
    fn execute(&mut self, cx: &mut UnitContext<'_, Pawn>) -> UnitResult<bool> {
        cx.input(&self.flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::testing::{FRAME, bind, run_action};
    use behavior_tree::{Argument, Blackboard, UnitError};

    #[test]
    fn wait_one_frame_finishes_on_second_update() {
        let mut pawn = Pawn::seeded("p", 0);
        let mut bb = Blackboard::new();
        let mut wait: WaitOneFrame = bind(&[], &[]);

        assert_eq!(run_action(&mut wait, &mut pawn, &mut bb, FRAME, 5), (Some(true), 2));
        // Restart resets the counter.
        assert_eq!(run_action(&mut wait, &mut pawn, &mut bb, FRAME, 5), (Some(true), 2));
    }

    #[test]
    fn wait_second_waits_fixed_range() {
        let mut pawn = Pawn::seeded("p", 0);
        let mut bb = Blackboard::new();
        let mut wait: WaitSecond = bind(&["0.5", "0.5"], &[]);

        // 0.5s at 100ms per frame.
        let (verdict, updates) = run_action(&mut wait, &mut pawn, &mut bb, FRAME, 20);
        assert_eq!(verdict, Some(true));
        assert!((5..=6).contains(&updates), "took {updates} updates");
    }

    #[test]
    fn wait_second_draw_stays_in_range() {
        let mut pawn = Pawn::seeded("p", 9);
        let mut bb = Blackboard::new();
        let mut wait: WaitSecond = bind(&["0.2", "0.4"], &[]);

        let (verdict, updates) = run_action(&mut wait, &mut pawn, &mut bb, FRAME, 20);
        assert_eq!(verdict, Some(true));
        assert!((2..=5).contains(&updates), "took {updates} updates");
    }

    #[test]
    fn is_smaller_compares() {
        let mut pawn = Pawn::seeded("p", 0);
        let mut bb = Blackboard::new();
        let mut cx = UnitContext::new(&mut pawn, &mut bb);

        let mut lt: IsSmaller = bind(&["1", "2"], &[]);
        let mut eq: IsSmaller = bind(&["2", "2"], &[]);
        assert!(lt.execute(&mut cx).unwrap());
        assert!(!eq.execute(&mut cx).unwrap());
    }

    #[test]
    fn is_true_reads_blackboard() {
        let inputs = [Argument::variable("alert")];
        let mut unit = IsTrue::bind(&Bindings::new(IsTrue::SLOTS, &inputs, &[])).unwrap();

        let mut pawn = Pawn::seeded("p", 0);
        let mut bb = Blackboard::new();
        {
            let mut cx = UnitContext::new(&mut pawn, &mut bb);
            assert!(matches!(unit.execute(&mut cx), Err(UnitError::Blackboard(_))));
        }

        bb.write("alert", true).unwrap();
        let mut cx = UnitContext::new(&mut pawn, &mut bb);
        assert!(unit.execute(&mut cx).unwrap());
    }

    #[test]
    fn is_true_accepts_editor_literal() {
        let mut pawn = Pawn::seeded("p", 0);
        let mut bb = Blackboard::new();
        let mut cx = UnitContext::new(&mut pawn, &mut bb);

        let mut unit: IsTrue = bind(&["1"], &[]);
        assert!(unit.execute(&mut cx).unwrap());
    }
}
