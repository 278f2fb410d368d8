//! Ball/paddle/brick collision step
//!
//! One call advances the ball by one frame and resolves, in this order:
//! walls, paddle, bricks. At most one brick is destroyed per call.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::english_velocity;
use crate::error::{ArcadeError, Result};

/// The moving ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub rect: Rect,
    /// Pixels per unit of `dt`
    pub vel: Vec2,
}

impl Ball {
    pub fn new(rect: Rect, vel: Vec2) -> Self {
        Self { rect, vel }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Player paddle (read-only during a step)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
}

/// A destructible brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub rect: Rect,
    pub alive: bool,
    /// Row index from the top, used for color and scoring
    #[serde(default)]
    pub row: u32,
}

impl Brick {
    pub fn new(id: u32, rect: Rect) -> Self {
        Self {
            id,
            rect,
            alive: true,
            row: 0,
        }
    }
}

/// Play-field size; the field spans `(0, 0)..(width, height)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(ArcadeError::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }
}

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepResult {
    pub bounced_wall: bool,
    pub bounced_paddle: bool,
    /// Index (into the brick slice) of the brick destroyed this step
    pub brick_destroyed: Option<usize>,
    /// Ball reached the bottom edge
    pub missed: bool,
}

impl StepResult {
    pub fn any(&self) -> bool {
        self.bounced_wall || self.bounced_paddle || self.brick_destroyed.is_some() || self.missed
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Reflect only if the ball is moving into the surface. Returns whether a
/// reflection happened.
pub fn bounce(vel: &mut Vec2, normal: Vec2) -> bool {
    if vel.dot(normal) < 0.0 {
        *vel = reflect_velocity(*vel, normal);
        true
    } else {
        false
    }
}

/// Advance the ball one frame and resolve collisions.
///
/// Collision response itself has no audio or scoring side effects; the
/// returned flags tell the caller what to play and what to count.
pub fn step(
    ball: &mut Ball,
    paddle: &Paddle,
    bricks: &mut [Brick],
    bounds: Bounds,
    dt: f32,
) -> StepResult {
    let mut result = StepResult::default();

    ball.rect.pos += ball.vel * dt;

    let (bounced, missed) = resolve_walls(ball, bounds);
    result.bounced_wall = bounced;
    if missed {
        result.missed = true;
        return result;
    }

    result.bounced_paddle = resolve_paddle(ball, paddle);
    result.brick_destroyed = resolve_bricks(ball, bricks);
    result
}

/// Side and top walls bounce; the bottom edge is a miss.
pub fn resolve_walls(ball: &mut Ball, bounds: Bounds) -> (bool, bool) {
    let mut bounced = false;
    let r = &mut ball.rect;

    if r.left() <= 0.0 {
        r.pos.x = 0.0;
        bounced |= bounce(&mut ball.vel, Vec2::X);
    } else if r.right() >= bounds.width {
        r.pos.x = bounds.width - r.width();
        bounced |= bounce(&mut ball.vel, Vec2::NEG_X);
    }

    if r.top() <= 0.0 {
        r.pos.y = 0.0;
        bounced |= bounce(&mut ball.vel, Vec2::Y);
    }

    let missed = ball.rect.bottom() >= bounds.height;
    (bounced, missed)
}

/// Angle-based "english" off the paddle, only while the ball is descending.
pub fn resolve_paddle(ball: &mut Ball, paddle: &Paddle) -> bool {
    if ball.vel.y <= 0.0 || !ball.rect.overlaps(&paddle.rect) {
        return false;
    }

    let half_width = paddle.rect.width() / 2.0;
    let offset = (ball.rect.center().x - paddle.rect.center().x) / half_width;
    ball.vel = english_velocity(offset, ball.speed());

    // Sit on top of the paddle so the next frame starts clear of it
    ball.rect.pos.y = paddle.rect.top() - ball.rect.height();
    true
}

/// Destroy at most one overlapping brick and reflect off the face struck.
///
/// The axis with the smaller penetration is the one reflected. When the
/// overlap has no clean separating axis (equal depth on both axes, or one
/// rectangle enclosing the other) the vertical axis is reflected.
pub fn resolve_bricks(ball: &mut Ball, bricks: &mut [Brick]) -> Option<usize> {
    let hit = bricks
        .iter()
        .position(|b| b.alive && ball.rect.overlaps(&b.rect))?;

    let brick = &mut bricks[hit];
    brick.alive = false;

    let pen = ball.rect.penetration(&brick.rect);
    let delta = ball.rect.center() - brick.rect.center();
    let enclosed = brick.rect.contains(&ball.rect) || ball.rect.contains(&brick.rect);

    if enclosed || pen.x == pen.y {
        log::warn!(
            "Ambiguous brick penetration (brick {}, depth {:?}), reflecting vertically",
            brick.id,
            pen
        );
        ball.vel.y = -ball.vel.y;
    } else if pen.x < pen.y {
        let normal = horizontal_normal(delta.x, ball.vel.x);
        bounce(&mut ball.vel, normal);
    } else {
        let normal = vertical_normal(delta.y, ball.vel.y);
        bounce(&mut ball.vel, normal);
    }

    Some(hit)
}

/// Face normal pointing from the brick toward the ball on the x axis. When
/// the centers line up, the face opposing the ball's motion is used.
fn horizontal_normal(dx: f32, vx: f32) -> Vec2 {
    if dx > 0.0 || (dx == 0.0 && vx < 0.0) {
        Vec2::X
    } else {
        Vec2::NEG_X
    }
}

fn vertical_normal(dy: f32, vy: f32) -> Vec2 {
    if dy > 0.0 || (dy == 0.0 && vy < 0.0) {
        Vec2::Y
    } else {
        Vec2::NEG_Y
    }
}
