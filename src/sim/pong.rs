//! Two-paddle Pong against a CPU opponent
//!
//! Top and bottom edges bounce, left and right edges score. Paddle hits use
//! the same offset-to-angle "english" as Breakout, turned on its side.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Ball, Bounds, Paddle, bounce};
use super::rect::Rect;
use crate::audio::SoundEffect;
use crate::english_velocity;

pub const PONG_WIDTH: f32 = 640.0;
pub const PONG_HEIGHT: f32 = 480.0;
pub const PONG_PADDLE_WIDTH: f32 = 12.0;
pub const PONG_PADDLE_HEIGHT: f32 = 80.0;
/// Gap between each paddle's outer face and its edge of the field
pub const PONG_PADDLE_INSET: f32 = 30.0;
pub const PONG_BALL_SIZE: f32 = 12.0;
/// Horizontal serve speed (pixels/s)
pub const SERVE_SPEED_X: f32 = 240.0;
/// Possible vertical serve speeds (pixels/s), sign chosen at random
pub const SERVE_SPEEDS_Y: [f32; 2] = [120.0, 180.0];
pub const PLAYER_SPEED: f32 = 360.0;
pub const CPU_SPEED: f32 = 240.0;
pub const POINTS_TO_WIN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Left paddle
    Player,
    /// Right paddle
    Cpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PongEvent {
    WallBounce,
    PaddleHit(Side),
    Scored(Side),
    MatchOver(Side),
}

impl PongEvent {
    pub fn sound(&self) -> SoundEffect {
        match self {
            PongEvent::WallBounce => SoundEffect::WallBounce,
            PongEvent::PaddleHit(_) => SoundEffect::PaddleHit,
            PongEvent::Scored(_) => SoundEffect::Score,
            PongEvent::MatchOver(Side::Player) => SoundEffect::Win,
            PongEvent::MatchOver(Side::Cpu) => SoundEffect::GameOver,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PongInput {
    /// Keyboard steering in [-1, 1] (up negative)
    pub player_axis: f32,
    /// Absolute paddle center y (mouse); overrides `player_axis`
    pub player_target_y: Option<f32>,
    /// Start a new match once one is over
    pub restart: bool,
}

fn layout_rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect {
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
    }
}

#[derive(Debug, Clone)]
pub struct PongState {
    pub bounds: Bounds,
    pub player: Paddle,
    pub cpu: Paddle,
    pub ball: Ball,
    pub player_score: u32,
    pub cpu_score: u32,
    pub winner: Option<Side>,
    pub events: Vec<PongEvent>,
    rng: Pcg32,
}

impl PongState {
    pub fn new(seed: u64) -> Self {
        let mut state = Self::unserved(Pcg32::seed_from_u64(seed));
        state.serve_opening();
        state
    }

    /// Fresh match layout with the ball at rest, drawing from `rng`
    fn unserved(rng: Pcg32) -> Self {
        let paddle_y = (PONG_HEIGHT - PONG_PADDLE_HEIGHT) / 2.0;
        Self {
            bounds: Bounds {
                width: PONG_WIDTH,
                height: PONG_HEIGHT,
            },
            player: Paddle {
                rect: layout_rect(PONG_PADDLE_INSET, paddle_y, PONG_PADDLE_WIDTH, PONG_PADDLE_HEIGHT),
            },
            cpu: Paddle {
                rect: layout_rect(
                    PONG_WIDTH - PONG_PADDLE_INSET - PONG_PADDLE_WIDTH,
                    paddle_y,
                    PONG_PADDLE_WIDTH,
                    PONG_PADDLE_HEIGHT,
                ),
            },
            ball: Ball::new(
                layout_rect(0.0, 0.0, PONG_BALL_SIZE, PONG_BALL_SIZE),
                Vec2::ZERO,
            ),
            player_score: 0,
            cpu_score: 0,
            winner: None,
            events: Vec::new(),
            rng,
        }
    }

    /// First serve of a match goes to a random side
    fn serve_opening(&mut self) {
        let first = if self.rng.random_bool(0.5) {
            Side::Player
        } else {
            Side::Cpu
        };
        self.serve(first);
    }

    /// Center the ball and send it toward `toward`
    pub fn serve(&mut self, toward: Side) {
        self.ball
            .rect
            .set_center(Vec2::new(self.bounds.width / 2.0, self.bounds.height / 2.0));
        let vx = match toward {
            Side::Player => -SERVE_SPEED_X,
            Side::Cpu => SERVE_SPEED_X,
        };
        let mut vy = SERVE_SPEEDS_Y[self.rng.random_range(0..SERVE_SPEEDS_Y.len())];
        if self.rng.random_bool(0.5) {
            vy = -vy;
        }
        self.ball.vel = Vec2::new(vx, vy);
    }

    pub fn drain_events(&mut self) -> Vec<PongEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &PongInput, dt: f32) {
        if self.winner.is_some() {
            if input.restart {
                let rng = self.rng.clone();
                *self = Self::unserved(rng);
                self.serve_opening();
                log::info!("Pong match restarted");
            }
            return;
        }

        let (width, height) = (self.bounds.width, self.bounds.height);

        // Player paddle
        let player = &mut self.player.rect;
        match input.player_target_y {
            Some(y) => player.pos.y = y - player.height() / 2.0,
            None => player.pos.y += input.player_axis.clamp(-1.0, 1.0) * PLAYER_SPEED * dt,
        }
        player.clamp_inside(width, height);

        // CPU tracks the ball's center without overshooting it
        let cpu = &mut self.cpu.rect;
        let gap = self.ball.rect.center().y - cpu.center().y;
        cpu.pos.y += gap.clamp(-CPU_SPEED * dt, CPU_SPEED * dt);
        cpu.clamp_inside(width, height);

        // Ball
        self.ball.rect.pos += self.ball.vel * dt;

        if self.ball.rect.top() <= 0.0 {
            self.ball.rect.pos.y = 0.0;
            if bounce(&mut self.ball.vel, Vec2::Y) {
                self.events.push(PongEvent::WallBounce);
            }
        } else if self.ball.rect.bottom() >= height {
            self.ball.rect.pos.y = height - self.ball.rect.height();
            if bounce(&mut self.ball.vel, Vec2::NEG_Y) {
                self.events.push(PongEvent::WallBounce);
            }
        }

        if self.ball.vel.x < 0.0 && self.ball.rect.overlaps(&self.player.rect) {
            let paddle = self.player.rect;
            self.deflect(&paddle, Side::Player);
        } else if self.ball.vel.x > 0.0 && self.ball.rect.overlaps(&self.cpu.rect) {
            let paddle = self.cpu.rect;
            self.deflect(&paddle, Side::Cpu);
        }

        if self.ball.rect.left() <= 0.0 {
            self.score(Side::Cpu);
        } else if self.ball.rect.right() >= width {
            self.score(Side::Player);
        }
    }

    /// Send the ball back across the table, angled by where it struck
    fn deflect(&mut self, paddle: &Rect, side: Side) {
        let offset = (self.ball.rect.center().y - paddle.center().y) / (paddle.height() / 2.0);
        let v = english_velocity(offset, self.ball.speed());
        // Rotate the upward deflection onto the horizontal axis
        self.ball.vel = match side {
            Side::Player => Vec2::new(-v.y, v.x),
            Side::Cpu => Vec2::new(v.y, v.x),
        };
        self.ball.rect.pos.x = match side {
            Side::Player => paddle.right(),
            Side::Cpu => paddle.left() - self.ball.rect.width(),
        };
        self.events.push(PongEvent::PaddleHit(side));
    }

    fn score(&mut self, side: Side) {
        let points = match side {
            Side::Player => &mut self.player_score,
            Side::Cpu => &mut self.cpu_score,
        };
        *points += 1;
        let points = *points;
        self.events.push(PongEvent::Scored(side));

        if points >= POINTS_TO_WIN {
            self.winner = Some(side);
            self.ball.vel = Vec2::ZERO;
            self.events.push(PongEvent::MatchOver(side));
            log::info!(
                "Match over: {:?} wins {}-{}",
                side,
                self.player_score,
                self.cpu_score
            );
        } else {
            self.serve(side);
        }
    }
}
