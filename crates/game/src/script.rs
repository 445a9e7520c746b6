//! Input sources for headless runs: RON replay scripts and a seeded
//! autopilot. Both drive an [`InputState`] the same way a device would.

use std::path::Path;

use input::{Action, ButtonState, InputState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// One button edge at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub tick: u64,
    pub action: Action,
    pub state: ButtonState,
}

/// A recorded sequence of button edges.
///
/// ```ron
/// (events: [
///     (tick: 0, action: MoveBack, state: Pressed),
///     (tick: 30, action: Jump, state: Pressed),
///     (tick: 31, action: Jump, state: Released),
/// ])
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl InputScript {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut script: Self = ron::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        script.events.sort_by_key(|e| e.tick);
        log::info!("Loaded input script {:?} ({} events)", path, script.events.len());
        Ok(script)
    }

    /// Last tick with an event, if any.
    pub fn last_tick(&self) -> Option<u64> {
        self.events.iter().map(|e| e.tick).max()
    }

    /// Feed every edge scheduled for `tick` into `input`.
    pub fn apply(&self, tick: u64, input: &mut InputState) {
        for e in self.events.iter().filter(|e| e.tick == tick) {
            input.process_action(e.action, e.state);
        }
    }
}

/// Random but reproducible play: wanders, jumps, flaps, inhales and throws.
pub struct Autopilot {
    rng: StdRng,
    /// Ticks left before the next movement change.
    hold: u32,
}

const MOVES: [Action; 4] = [Action::MoveLeft, Action::MoveRight, Action::MoveForward, Action::MoveBack];

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            hold: 0,
        }
    }

    /// Decide this tick's button edges.
    pub fn apply(&mut self, input: &mut InputState) {
        // Buttons are taps: release whatever was pressed last tick.
        for action in [Action::Jump, Action::Inhale, Action::Drop] {
            if input.is_held(action) {
                input.process_action(action, ButtonState::Released);
            }
        }

        if self.hold == 0 {
            for action in MOVES {
                input.process_action(action, ButtonState::Released);
            }
            // One or two directions, or standing still.
            let picks = self.rng.gen_range(0..=2);
            for _ in 0..picks {
                let action = MOVES[self.rng.gen_range(0..MOVES.len())];
                input.process_action(action, ButtonState::Pressed);
            }
            self.hold = self.rng.gen_range(20..120);
        }
        self.hold -= 1;

        let roll = self.rng.gen::<f32>();
        let tap = if roll < 0.03 {
            Some(Action::Jump)
        } else if roll < 0.05 {
            Some(Action::Inhale)
        } else if roll < 0.055 {
            Some(Action::Drop)
        } else {
            None
        };
        if let Some(action) = tap {
            input.process_action(action, ButtonState::Pressed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_replays_edges() {
        let script: InputScript = ron::from_str(
            "(events: [(tick: 2, action: Jump, state: Pressed), (tick: 0, action: MoveBack, state: Pressed)])",
        )
        .unwrap();
        assert_eq!(script.last_tick(), Some(2));

        let mut input = InputState::new();
        for tick in 0..3 {
            input.begin_frame();
            script.apply(tick, &mut input);
            let intents = input.intents();
            assert_eq!(intents.move_dir.y, 1.0);
            assert_eq!(intents.jump, tick == 2);
        }
    }

    #[test]
    fn empty_script_is_valid() {
        let script: InputScript = ron::from_str("(events: [])").unwrap();
        assert!(script.events.is_empty());
        assert_eq!(script.last_tick(), None);
    }

    #[test]
    fn autopilot_is_reproducible() {
        let mut a = Autopilot::new(5);
        let mut b = Autopilot::new(5);
        let mut ia = InputState::new();
        let mut ib = InputState::new();
        for _ in 0..500 {
            ia.begin_frame();
            ib.begin_frame();
            a.apply(&mut ia);
            b.apply(&mut ib);
            assert_eq!(ia.intents(), ib.intents());
        }
    }

    #[test]
    fn autopilot_taps_buttons() {
        let mut pilot = Autopilot::new(11);
        let mut input = InputState::new();
        let mut jumps = 0;
        for _ in 0..2000 {
            input.begin_frame();
            pilot.apply(&mut input);
            if input.intents().jump {
                jumps += 1;
            }
        }
        assert!(jumps > 0);
    }
}
