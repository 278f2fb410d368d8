//! Beep Arcade - procedural sound effects and arcade physics
//!
//! Core modules:
//! - `audio`: Tone synthesis, caching, WAV export and one-shot playback
//! - `sim`: Deterministic simulation (Breakout, Pong, Snake)
//! - `platform`: Input event queue and fixed-timestep frame clock
//! - `settings`: JSON configuration

pub mod audio;
pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{ArcadeError, Result};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default simulation rate for Breakout and Pong
    pub const DEFAULT_FPS: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Breakout play field
    pub const BREAKOUT_WIDTH: f32 = 800.0;
    pub const BREAKOUT_HEIGHT: f32 = 600.0;

    /// Breakout paddle, centered 40px above the bottom edge
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    pub const PADDLE_BOTTOM_GAP: f32 = 40.0;
    /// Paddle speed (pixels/s)
    pub const PADDLE_SPEED: f32 = 480.0;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 12.0;
    /// Ball speed (pixels/s)
    pub const BALL_SPEED: f32 = 300.0;

    /// Brick wall layout
    pub const BRICK_WIDTH: f32 = 60.0;
    pub const BRICK_HEIGHT: f32 = 25.0;
    pub const BRICK_GAP: f32 = 5.0;
    pub const BRICK_ROWS: u32 = 4;
    pub const BRICK_COLS: u32 = 10;
    pub const BRICK_ORIGIN: (f32, f32) = (50.0, 50.0);
    pub const BRICK_POINTS: u64 = 10;

    pub const STARTING_LIVES: u8 = 3;

    /// Maximum paddle deflection from vertical (degrees)
    pub const MAX_DEFLECTION_DEG: f32 = 60.0;
}

/// Map a normalized paddle offset in [-1, 1] to a velocity of the given
/// speed, deflected up to `MAX_DEFLECTION_DEG` from the `-y` axis.
#[inline]
pub fn english_velocity(offset: f32, speed: f32) -> Vec2 {
    let angle = offset.clamp(-1.0, 1.0) * consts::MAX_DEFLECTION_DEG.to_radians();
    Vec2::new(angle.sin(), -angle.cos()) * speed
}

/// Unit vector for an angle measured from +x, y pointing down the screen
#[inline]
pub fn direction_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_centered_is_straight_up() {
        let v = english_velocity(0.0, 5.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y + 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_english_edge_is_sixty_degrees() {
        let v = english_velocity(1.0, 2.0);
        let angle = v.x.atan2(-v.y).to_degrees();
        assert!((angle - 60.0).abs() < 1e-3);
        assert!((v.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_english_clamps_offset() {
        let a = english_velocity(3.0, 1.0);
        let b = english_velocity(1.0, 1.0);
        assert!((a - b).length() < 1e-6);
    }
}
