//! Breakout game state
//!
//! Everything a frame needs lives in one explicit struct that is passed into
//! `tick()`; there is no global game state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Ball, Bounds, Brick, Paddle};
use super::rect::Rect;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::direction_from_angle;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball rests on the paddle, waiting for launch input
    Serve,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Every brick destroyed
    Won,
    /// Out of lives
    GameOver,
}

/// Something the caller may want to react to (sound, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Launched,
    WallBounce,
    PaddleHit,
    BrickDestroyed { id: u32, points: u64 },
    BallLost { lives_left: u8 },
    Won,
    GameOver,
}

impl GameEvent {
    pub fn sound(&self) -> SoundEffect {
        match self {
            GameEvent::Launched => SoundEffect::Launch,
            GameEvent::WallBounce => SoundEffect::WallBounce,
            GameEvent::PaddleHit => SoundEffect::PaddleHit,
            GameEvent::BrickDestroyed { .. } => SoundEffect::BrickBreak,
            GameEvent::BallLost { .. } => SoundEffect::BallLost,
            GameEvent::Won => SoundEffect::Win,
            GameEvent::GameOver => SoundEffect::GameOver,
        }
    }
}

/// Rectangle from layout constants (known to be valid)
fn layout_rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect {
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
    }
}

/// Build the standard brick wall
pub fn brick_wall() -> Vec<Brick> {
    let (origin_x, origin_y) = BRICK_ORIGIN;
    let mut bricks = Vec::with_capacity((BRICK_ROWS * BRICK_COLS) as usize);
    for row in 0..BRICK_ROWS {
        for col in 0..BRICK_COLS {
            let x = origin_x + col as f32 * (BRICK_WIDTH + BRICK_GAP);
            let y = origin_y + row as f32 * (BRICK_HEIGHT + BRICK_GAP);
            let mut brick = Brick::new(row * BRICK_COLS + col, layout_rect(x, y, BRICK_WIDTH, BRICK_HEIGHT));
            brick.row = row;
            bricks.push(brick);
        }
    }
    bricks
}

/// Complete Breakout state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub bounds: Bounds,
    pub phase: GamePhase,
    pub paddle: Paddle,
    pub ball: Ball,
    pub bricks: Vec<Brick>,
    pub score: u64,
    pub lives: u8,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events produced since the caller last drained them
    pub events: Vec<GameEvent>,
    /// Phase to return to when unpausing
    paused_from: GamePhase,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        let bounds = Bounds {
            width: BREAKOUT_WIDTH,
            height: BREAKOUT_HEIGHT,
        };
        let paddle = Paddle {
            rect: layout_rect(
                (BREAKOUT_WIDTH - PADDLE_WIDTH) / 2.0,
                BREAKOUT_HEIGHT - PADDLE_BOTTOM_GAP - PADDLE_HEIGHT / 2.0,
                PADDLE_WIDTH,
                PADDLE_HEIGHT,
            ),
        };
        let ball = Ball::new(layout_rect(0.0, 0.0, BALL_SIZE, BALL_SIZE), Vec2::ZERO);

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bounds,
            phase: GamePhase::Serve,
            paddle,
            ball,
            bricks: brick_wall(),
            score: 0,
            lives: STARTING_LIVES,
            time_ticks: 0,
            events: Vec::new(),
            paused_from: GamePhase::Serve,
        };
        state.attach_ball();
        state
    }

    /// Start over with a fresh wall, keeping the RNG stream going
    pub fn restart(&mut self) {
        let rng = self.rng.clone();
        *self = Self::new(self.seed);
        self.rng = rng;
        log::info!("Breakout restarted");
    }

    /// Park the ball on top of the paddle, centered
    pub fn attach_ball(&mut self) {
        let paddle = self.paddle.rect;
        let size = self.ball.rect.size;
        self.ball.rect.pos = Vec2::new(paddle.center().x - size.x / 2.0, paddle.top() - size.y);
        self.ball.vel = Vec2::ZERO;
    }

    /// Launch the ball upward at a random angle within ±45° of vertical
    pub fn launch(&mut self) {
        use std::f32::consts::FRAC_PI_4;
        let theta = self.rng.random_range(-3.0 * FRAC_PI_4..=-FRAC_PI_4);
        self.ball.vel = direction_from_angle(theta) * BALL_SPEED;
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Launched);
        log::info!("Ball launched at {:.1}°", theta.to_degrees());
    }

    pub fn pause(&mut self) {
        if matches!(self.phase, GamePhase::Serve | GamePhase::Playing) {
            self.paused_from = self.phase;
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = self.paused_from;
        }
    }

    pub fn bricks_remaining(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    /// Take all events produced so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
