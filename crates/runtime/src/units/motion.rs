//! Units that move or locate the pawn.

use behavior_tree::{
    Action, BindError, Bindings, Input, Output, SlotDecl, UnitContext, UnitResult, UnitSpec,
    ValueKind, Vec3,
};

use crate::Pawn;

/// Moves at a constant planar velocity for `time` seconds.
#[derive(Debug)]
pub struct MoveAction {
    velocity_x: Input<f32>,
    velocity_y: Input<f32>,
    time: Input<f32>,
    elapsed: f32,
}

impl UnitSpec for MoveAction {
    const NAME: &'static str = "MoveAction";
    const SLOTS: &'static [SlotDecl] = &[
        SlotDecl::input("velocity_x", ValueKind::Float),
        SlotDecl::input("velocity_y", ValueKind::Float),
        SlotDecl::input("time", ValueKind::Float),
    ];

    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self {
            velocity_x: bindings.input("velocity_x")?,
            velocity_y: bindings.input("velocity_y")?,
            time: bindings.input("time")?,
            elapsed: 0.0,
        })
    }
}

impl Action<Pawn> for MoveAction {
    fn start(&mut self, _cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        self.elapsed = 0.0;
        Ok(())
    }

    fn update(&mut self, cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        if self.elapsed >= cx.input(&self.time)? {
            cx.succeed();
            return Ok(());
        }

        let vx = cx.input(&self.velocity_x)?;
        let vy = cx.input(&self.velocity_y)?;
        let pawn = cx.target_mut();
        let dt = pawn.delta_secs();
        pawn.translate([vx * dt, vy * dt, 0.0]);
        self.elapsed += dt;
        Ok(())
    }
}

/// Turns at a constant rate (degrees per second) for `time` seconds.
#[derive(Debug)]
pub struct RotateAction {
    angular_velocity: Input<f32>,
    time: Input<f32>,
    elapsed: f32,
}

impl UnitSpec for RotateAction {
    const NAME: &'static str = "RotateAction";
    const SLOTS: &'static [SlotDecl] = &[
        SlotDecl::input("angular_velocity", ValueKind::Float),
        SlotDecl::input("time", ValueKind::Float),
    ];

    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self {
            angular_velocity: bindings.input("angular_velocity")?,
            time: bindings.input("time")?,
            elapsed: 0.0,
        })
    }
}

impl Action<Pawn> for RotateAction {
    fn start(&mut self, _cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        self.elapsed = 0.0;
        Ok(())
    }

    fn update(&mut self, cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        if self.elapsed >= cx.input(&self.time)? {
            cx.succeed();
            return Ok(());
        }

        let rate = cx.input(&self.angular_velocity)?;
        let pawn = cx.target_mut();
        let dt = pawn.delta_secs();
        pawn.rotate(rate * dt);
        self.elapsed += dt;
        Ok(())
    }
}

/// Writes the pawn's position to a blackboard variable and succeeds.
#[derive(Debug)]
pub struct StorePosition {
    position: Output<Vec3>,
}

impl UnitSpec for StorePosition {
    const NAME: &'static str = "StorePosition";
    const SLOTS: &'static [SlotDecl] = &[SlotDecl::output("position", ValueKind::Vector3)];

    fn bind(bindings: &Bindings<'_>) -> Result<Self, BindError> {
        Ok(Self {
            position: bindings.output("position")?,
        })
    }
}

impl Action<Pawn> for StorePosition {
    fn update(&mut self, cx: &mut UnitContext<'_, Pawn>) -> UnitResult {
        let position = cx.target().position();
        cx.output(&self.position, position)?;
        cx.succeed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::testing::{FRAME, bind, run_action};
    use behavior_tree::Blackboard;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn move_action_travels_for_duration() {
        let mut pawn = Pawn::seeded("p", 0);
        let mut bb = Blackboard::new();
        let mut unit: MoveAction = bind(&["1.0", "-2.0", "0.3"], &[]);

        let (verdict, _) = run_action(&mut unit, &mut pawn, &mut bb, FRAME, 10);

        assert_eq!(verdict, Some(true));
        // Three or four 100ms steps depending on float accumulation.
        let [x, y, z] = pawn.position();
        assert!((0.29..=0.41).contains(&x), "x = {x}");
        assert!((-0.81..=-0.59).contains(&y), "y = {y}");
        assert_eq!(z, 0.0);
        assert!((y + 2.0 * x).abs() < 1e-3);
    }

    #[test]
    fn move_action_restarts_timer() {
        let mut pawn = Pawn::seeded("p", 0);
        let mut bb = Blackboard::new();
        let mut unit: MoveAction = bind(&["1.0", "0.0", "0.2"], &[]);

        let (_, first) = run_action(&mut unit, &mut pawn, &mut bb, FRAME, 10);
        let (_, second) = run_action(&mut unit, &mut pawn, &mut bb, FRAME, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn rotate_action_turns() {
        let mut pawn = Pawn::seeded("p", 0);
        let mut bb = Blackboard::new();
        let mut unit: RotateAction = bind(&["90", "0.5"], &[]);

        let (verdict, _) = run_action(&mut unit, &mut pawn, &mut bb, FRAME, 10);

        assert_eq!(verdict, Some(true));
        let heading = pawn.heading_deg();
        assert!((44.0..=55.0).contains(&heading), "heading = {heading}");
    }

    #[test]
    fn store_position_writes_output() {
        let mut pawn = Pawn::seeded("p", 0).at([3.0, 4.0, 0.0]);
        let mut bb = Blackboard::new();
        let mut unit: StorePosition = bind(&[], &["home"]);

        let (verdict, updates) = run_action(&mut unit, &mut pawn, &mut bb, FRAME, 3);

        assert_eq!((verdict, updates), (Some(true), 1));
        assert!(close(bb.read::<Vec3>("home").unwrap(), [3.0, 4.0, 0.0]));
    }
}
