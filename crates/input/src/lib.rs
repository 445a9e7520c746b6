//! Action-level input state and the per-tick intent snapshot.
//!
//! Device capture (keyboard, gamepad) lives with the host; it reports
//! abstract [`Action`] presses and releases here, and the simulation reads
//! one [`Intents`] snapshot per tick.

use engine_core::Intents;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Abstract game actions a device can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    /// Toward -Z.
    MoveForward,
    /// Toward +Z.
    MoveBack,
    /// Jump on the ground, flap while airborne.
    Jump,
    /// Inhale, or use the held power.
    Inhale,
    /// Throw the held power.
    Drop,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveForward,
        Action::MoveBack,
        Action::Jump,
        Action::Inhale,
        Action::Drop,
    ];
}

/// Whether a button went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Manages input state for the current tick.
#[derive(Debug, Default)]
pub struct InputState {
    /// Actions currently held down.
    held: HashSet<Action>,
    /// Actions pressed this tick.
    pressed: HashSet<Action>,
    /// Actions released this tick.
    released: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-tick state. Call at the start of each tick.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    /// Process a button event for an action.
    pub fn process_action(&mut self, action: Action, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                if !self.held.contains(&action) {
                    self.pressed.insert(action);
                }
                self.held.insert(action);
            }
            ButtonState::Released => {
                if self.held.remove(&action) {
                    self.released.insert(action);
                }
            }
        }
    }

    /// Release everything (focus loss, episode reset).
    pub fn release_all(&mut self) {
        let held: Vec<Action> = self.held.iter().copied().collect();
        if !held.is_empty() {
            log::debug!("Releasing {} held actions", held.len());
        }
        for action in held {
            self.process_action(action, ButtonState::Released);
        }
    }

    // Query methods

    /// Check if an action is currently held.
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was pressed this tick.
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action was released this tick.
    pub fn is_released(&self, action: Action) -> bool {
        self.released.contains(&action)
    }

    /// Movement input as a normalized ground-plane vector.
    pub fn get_movement_input(&self) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if self.is_held(Action::MoveLeft) {
            movement.x -= 1.0;
        }
        if self.is_held(Action::MoveRight) {
            movement.x += 1.0;
        }
        if self.is_held(Action::MoveForward) {
            movement.y -= 1.0;
        }
        if self.is_held(Action::MoveBack) {
            movement.y += 1.0;
        }

        movement.normalize_or_zero()
    }

    /// Snapshot for the simulation. Buttons are edge-triggered.
    pub fn intents(&self) -> Intents {
        Intents {
            move_dir: self.get_movement_input(),
            jump: self.is_pressed(Action::Jump),
            inhale: self.is_pressed(Action::Inhale),
            drop: self.is_pressed(Action::Drop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_edge_triggered() {
        let mut input = InputState::new();
        input.begin_frame();
        input.process_action(Action::Jump, ButtonState::Pressed);
        assert!(input.intents().jump);

        // Still held next tick: no new edge.
        input.begin_frame();
        input.process_action(Action::Jump, ButtonState::Pressed);
        assert!(input.is_held(Action::Jump));
        assert!(!input.intents().jump);

        input.begin_frame();
        input.process_action(Action::Jump, ButtonState::Released);
        assert!(input.is_released(Action::Jump));
        input.begin_frame();
        input.process_action(Action::Jump, ButtonState::Pressed);
        assert!(input.intents().jump);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut input = InputState::new();
        input.process_action(Action::MoveRight, ButtonState::Pressed);
        input.process_action(Action::MoveForward, ButtonState::Pressed);
        let m = input.intents().move_dir;
        assert!((m.length() - 1.0).abs() < 1e-5);
        assert!(m.x > 0.0 && m.y < 0.0);
    }

    #[test]
    fn opposing_directions_cancel() {
        let mut input = InputState::new();
        input.process_action(Action::MoveLeft, ButtonState::Pressed);
        input.process_action(Action::MoveRight, ButtonState::Pressed);
        assert_eq!(input.get_movement_input(), Vec2::ZERO);
    }

    #[test]
    fn release_all_clears_held() {
        let mut input = InputState::new();
        input.process_action(Action::MoveBack, ButtonState::Pressed);
        input.process_action(Action::Inhale, ButtonState::Pressed);
        input.release_all();
        assert!(!input.is_held(Action::MoveBack));
        assert!(input.is_released(Action::Inhale));
        assert_eq!(input.get_movement_input(), Vec2::ZERO);
    }
}
