//! Turns device and navigation state into one [`InputCmd`] per simulation frame.

use mover_shared::{
    InputAction, InputCmd, ModeName, MoveInputType, Vec3, constants::MOVE_INPUT_EPS,
};

/// Cached input state between frames.
///
/// Device handlers write into it whenever events arrive; the fixed-step loop calls
/// [`InputProducer::produce`] once per frame. Edge-triggered state is cleared by `produce`.
#[derive(Clone, Debug, Default)]
pub struct InputProducer {
    move_intent: Vec3,
    move_velocity: Option<Vec3>,
    nav_velocity: Option<Vec3>,
    look: Option<Vec3>,
    jump_held: bool,
    jump_edge: bool,
    wants_path_follow: bool,
    suggested_mode: Option<ModeName>,
    orient_to_last_move: bool,
    last_move: Vec3,
}

impl InputProducer {
    pub fn new(orient_to_last_move: bool) -> Self {
        Self {
            orient_to_last_move,
            ..Self::default()
        }
    }

    /// Directional intent, e.g. from a stick or WASD. Clamped to unit length when produced.
    pub fn set_move_intent(&mut self, intent: Vec3) {
        self.move_intent = intent;
    }

    /// Explicit velocity input. Takes priority over intent while set.
    pub fn set_move_velocity(&mut self, velocity: Option<Vec3>) {
        self.move_velocity = velocity;
    }

    /// Velocity requested by navigation or AI for the next frame only.
    pub fn request_nav_move(&mut self, velocity: Vec3) {
        self.nav_velocity = Some(velocity);
    }

    pub fn set_look(&mut self, direction: Option<Vec3>) {
        self.look = direction;
    }

    pub fn set_jump(&mut self, pressed: bool) {
        if pressed && !self.jump_held {
            self.jump_edge = true;
        }
        self.jump_held = pressed;
    }

    pub fn set_wants_path_follow(&mut self, wants: bool) {
        self.wants_path_follow = wants;
    }

    /// Ask the next frame to switch into `mode`, e.g. a fly toggle.
    pub fn suggest_mode(&mut self, mode: ModeName) {
        self.suggested_mode = Some(mode);
    }

    pub fn produce(&mut self) -> InputCmd {
        let mut cmd = match self.nav_velocity.take().or(self.move_velocity) {
            Some(velocity) => InputCmd::with_velocity(velocity),
            None => {
                let intent = if self.move_intent.norm_squared() > 1.0 {
                    self.move_intent.normalize()
                } else {
                    self.move_intent
                };
                InputCmd::with_intent(intent)
            }
        };

        if cmd.move_input.norm() > MOVE_INPUT_EPS {
            self.last_move = cmd.move_input;
        }
        cmd.orientation_intent = match self.look {
            Some(look) => look,
            None if cmd.move_input.norm() > MOVE_INPUT_EPS => cmd.move_input,
            None if self.orient_to_last_move => self.last_move,
            None => Vec3::zeros(),
        };

        cmd.actions.set(InputAction::JumpPressed, self.jump_held);
        cmd.actions.set(InputAction::JumpJustPressed, std::mem::take(&mut self.jump_edge));
        cmd.actions.set(InputAction::WantsPathFollow, self.wants_path_follow);
        cmd.suggested_mode = self.suggested_mode.take();

        debug_assert!(
            cmd.move_input_type == MoveInputType::Velocity
                || cmd.move_input.norm() <= 1.0 + MOVE_INPUT_EPS
        );
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_edge_lasts_one_frame() {
        let mut producer = InputProducer::new(false);
        producer.set_jump(true);

        let first = producer.produce();
        assert!(first.has(InputAction::JumpJustPressed));
        assert!(first.has(InputAction::JumpPressed));

        let second = producer.produce();
        assert!(!second.has(InputAction::JumpJustPressed));
        assert!(second.has(InputAction::JumpPressed));

        // Holding does not re-trigger; releasing and pressing again does.
        producer.set_jump(true);
        assert!(!producer.produce().jump_just_pressed());
        producer.set_jump(false);
        producer.set_jump(true);
        assert!(producer.produce().jump_just_pressed());
    }

    #[test]
    fn velocity_wins_and_nav_is_consumed_once() {
        let mut producer = InputProducer::new(false);
        producer.set_move_intent(Vec3::new(0.0, 0.0, -1.0));
        producer.set_move_velocity(Some(Vec3::new(100.0, 0.0, 0.0)));
        producer.request_nav_move(Vec3::new(0.0, 0.0, 250.0));

        let nav = producer.produce();
        assert_eq!(nav.move_input_type, MoveInputType::Velocity);
        assert_eq!(nav.move_input, Vec3::new(0.0, 0.0, 250.0));

        let manual = producer.produce();
        assert_eq!(manual.move_input, Vec3::new(100.0, 0.0, 0.0));

        producer.set_move_velocity(None);
        let intent = producer.produce();
        assert_eq!(intent.move_input_type, MoveInputType::DirectionalIntent);
        assert_eq!(intent.move_input, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn intent_is_clamped_to_unit_length() {
        let mut producer = InputProducer::new(false);
        producer.set_move_intent(Vec3::new(1.0, 0.0, 1.0));
        assert!((producer.produce().move_input.norm() - 1.0).abs() < 1.0e-6);

        producer.set_move_intent(Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(producer.produce().move_input, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn orientation_follows_movement_then_lingers() {
        let mut lingering = InputProducer::new(true);
        let mut plain = InputProducer::new(false);
        for producer in [&mut lingering, &mut plain] {
            producer.set_move_intent(Vec3::new(1.0, 0.0, 0.0));
            assert_eq!(producer.produce().orientation_intent, Vec3::new(1.0, 0.0, 0.0));
            producer.set_move_intent(Vec3::zeros());
        }

        assert_eq!(lingering.produce().orientation_intent, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(plain.produce().orientation_intent, Vec3::zeros());

        lingering.set_look(Some(Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(lingering.produce().orientation_intent, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn suggested_mode_is_one_shot_and_grab_is_held() {
        let mut producer = InputProducer::new(false);
        producer.suggest_mode(ModeName::FALLING);
        producer.set_wants_path_follow(true);

        let first = producer.produce();
        assert_eq!(first.suggested_mode, Some(ModeName::FALLING));
        assert!(first.wants_path_follow());

        let second = producer.produce();
        assert_eq!(second.suggested_mode, None);
        assert!(second.wants_path_follow());
    }
}
