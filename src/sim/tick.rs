//! Fixed timestep Breakout tick
//!
//! Advances the game state by one frame: paddle input, serve/launch,
//! collision step, then score and life bookkeeping.

use super::collision::step;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keyboard steering in [-1, 1] (left negative)
    pub paddle_axis: f32,
    /// Absolute paddle center x (mouse); overrides `paddle_axis`
    pub paddle_target_x: Option<f32>,
    /// Launch ball (click/space)
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start a new game after winning or losing
    pub restart: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::Serve => {
                state.pause();
                return;
            }
            GamePhase::Paused => state.resume(),
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::Won | GamePhase::GameOver => {
            if input.restart {
                state.restart();
            }
            return;
        }
        _ => {}
    }

    state.time_ticks += 1;

    // Update paddle position
    let paddle = &mut state.paddle.rect;
    match input.paddle_target_x {
        Some(x) => paddle.pos.x = x - paddle.width() / 2.0,
        None => paddle.pos.x += input.paddle_axis.clamp(-1.0, 1.0) * PADDLE_SPEED * dt,
    }
    paddle.clamp_inside(state.bounds.width, state.bounds.height);

    match state.phase {
        GamePhase::Serve => {
            state.attach_ball();
            if input.launch {
                state.launch();
            }
        }

        GamePhase::Playing => {
            let result = step(
                &mut state.ball,
                &state.paddle,
                &mut state.bricks,
                state.bounds,
                dt,
            );

            if result.bounced_wall {
                state.events.push(GameEvent::WallBounce);
            }
            if result.bounced_paddle {
                state.events.push(GameEvent::PaddleHit);
            }
            if let Some(idx) = result.brick_destroyed {
                let id = state.bricks[idx].id;
                state.score = state.score.saturating_add(BRICK_POINTS);
                state.events.push(GameEvent::BrickDestroyed {
                    id,
                    points: BRICK_POINTS,
                });
            }

            if result.missed {
                state.lives = state.lives.saturating_sub(1);
                if state.lives == 0 {
                    state.phase = GamePhase::GameOver;
                    state.events.push(GameEvent::GameOver);
                    log::info!("Game over with score {}", state.score);
                } else {
                    state.events.push(GameEvent::BallLost {
                        lives_left: state.lives,
                    });
                    state.phase = GamePhase::Serve;
                    state.attach_ball();
                    log::info!("Ball lost, {} lives left", state.lives);
                }
            } else if state.bricks_remaining() == 0 {
                state.phase = GamePhase::Won;
                state.events.push(GameEvent::Won);
                log::info!("Wall cleared with score {}", state.score);
            }
        }

        _ => {}
    }
}
