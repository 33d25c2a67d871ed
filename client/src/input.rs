//! Keyboard sampling for the tick loop
//!
//! Frames run much faster than simulation ticks, so steering presses are
//! sampled every frame and the latest one is held until a tick consumes it.

use macroquad::prelude::{is_key_pressed, KeyCode};
use shared::Direction;

pub struct InputManager {
    pending: Option<Direction>,
}

impl InputManager {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Samples the keyboard once. Returns true when a quit was requested.
    pub fn sample(&mut self) -> bool {
        // support both WASD and arrow keys
        if is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W) {
            self.pending = Some(Direction::Up);
        }
        if is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::A) {
            self.pending = Some(Direction::Left);
        }
        if is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S) {
            self.pending = Some(Direction::Down);
        }
        if is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::D) {
            self.pending = Some(Direction::Right);
        }

        is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q)
    }

    /// Hands the latest steering request to the tick that applies it.
    pub fn take_steer(&mut self) -> Option<Direction> {
        self.pending.take()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
