//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No audio device or platform dependencies

pub mod collision;
pub mod pong;
pub mod rect;
pub mod snake;
pub mod state;
pub mod tick;

pub use collision::{Ball, Bounds, Brick, Paddle, StepResult, reflect_velocity, step};
pub use pong::{PongEvent, PongInput, PongState, Side};
pub use rect::Rect;
pub use snake::{DeathCause, Direction, SnakeEvent, SnakeGame, SnakePhase};
pub use state::{GameEvent, GamePhase, GameState, brick_wall};
pub use tick::{TickInput, tick};
