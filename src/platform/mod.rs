//! Platform abstraction layer
//!
//! Keeps window-system details out of the simulation:
//! - Input events and held-key tracking
//! - Mapping keys onto per-game tick inputs
//! - Fixed timestep frame clock

use std::collections::{HashSet, VecDeque};

use crate::consts::MAX_SUBSTEPS;
use crate::sim::{Direction, PongInput, TickInput};

/// Keys the games respond to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    P,
    R,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Window closed
    Quit,
}

/// Whether the frame loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Anything that produces input once per frame (window, replay, script)
pub trait EventSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Plays back a fixed list of events keyed by frame number
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    frame: u64,
    queue: VecDeque<(u64, InputEvent)>,
}

impl ScriptedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` for delivery on `frame` (0 is the first poll)
    pub fn at(mut self, frame: u64, event: InputEvent) -> Self {
        let idx = self.queue.partition_point(|(f, _)| *f <= frame);
        self.queue.insert(idx, (frame, event));
        self
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        while let Some(&(frame, event)) = self.queue.front() {
            if frame > self.frame {
                break;
            }
            out.push(event);
            self.queue.pop_front();
        }
        self.frame += 1;
        out
    }
}

/// Held keys plus the keys that went down during the current frame
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<Key>,
    pressed: Vec<Key>,
}

impl KeyState {
    /// Fold a frame's events in. Escape counts as quitting.
    pub fn apply(&mut self, events: &[InputEvent]) -> LoopControl {
        let mut control = LoopControl::Continue;
        for event in events {
            match *event {
                InputEvent::KeyDown(key) => {
                    if self.held.insert(key) {
                        self.pressed.push(key);
                    }
                    if key == Key::Escape {
                        control = LoopControl::Quit;
                    }
                }
                InputEvent::KeyUp(key) => {
                    self.held.remove(&key);
                }
                InputEvent::Quit => control = LoopControl::Quit,
            }
        }
        control
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Key went down this frame (auto-repeat ignored)
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// -1, 0 or 1 from a pair of opposing keys
    pub fn axis(&self, negative: Key, positive: Key) -> f32 {
        let mut axis = 0.0;
        if self.is_down(negative) {
            axis -= 1.0;
        }
        if self.is_down(positive) {
            axis += 1.0;
        }
        axis
    }

    /// Forget this frame's presses; held keys stay held
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    pub fn breakout_input(&self) -> TickInput {
        TickInput {
            paddle_axis: self.axis(Key::Left, Key::Right),
            paddle_target_x: None,
            launch: self.was_pressed(Key::Space),
            pause: self.was_pressed(Key::P),
            restart: self.was_pressed(Key::R),
        }
    }

    pub fn pong_input(&self) -> PongInput {
        PongInput {
            player_axis: self.axis(Key::Up, Key::Down),
            player_target_y: None,
            restart: self.was_pressed(Key::R),
        }
    }

    /// Most recent arrow pressed this frame
    pub fn snake_direction(&self) -> Option<Direction> {
        self.pressed.iter().rev().find_map(|key| match key {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            _ => None,
        })
    }
}

/// Fixed timestep accumulator
///
/// Real frame time goes in, a whole number of simulation steps comes out.
/// Long frames are clamped and capped at `MAX_SUBSTEPS` so a stall can't
/// snowball into ever longer catch-up frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: f32,
    accumulator: f32,
    /// Total simulation steps handed out
    pub steps: u64,
}

impl FrameClock {
    /// Longest frame time accepted (seconds)
    pub const MAX_FRAME: f32 = 0.1;

    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            steps: 0,
        }
    }

    pub fn step_dt(&self) -> f32 {
        self.step
    }

    /// Add `frame_dt` seconds and return how many steps to run now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, Self::MAX_FRAME);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < MAX_SUBSTEPS {
            self.accumulator -= self.step;
            substeps += 1;
        }
        self.steps += u64::from(substeps);
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_events_by_frame() {
        let mut script = ScriptedEvents::new()
            .at(2, InputEvent::Quit)
            .at(0, InputEvent::KeyDown(Key::Space))
            .at(0, InputEvent::KeyUp(Key::Space));

        assert_eq!(
            script.poll(),
            vec![InputEvent::KeyDown(Key::Space), InputEvent::KeyUp(Key::Space)]
        );
        assert!(script.poll().is_empty());
        assert_eq!(script.poll(), vec![InputEvent::Quit]);
        assert!(script.is_exhausted());
        assert_eq!(script.frame(), 3);
    }

    #[test]
    fn test_key_state_press_and_hold() {
        let mut keys = KeyState::default();
        assert_eq!(
            keys.apply(&[InputEvent::KeyDown(Key::Left)]),
            LoopControl::Continue
        );
        assert!(keys.is_down(Key::Left));
        assert!(keys.was_pressed(Key::Left));
        assert_eq!(keys.axis(Key::Left, Key::Right), -1.0);

        keys.end_frame();
        // Auto-repeat keydown is not a fresh press
        keys.apply(&[InputEvent::KeyDown(Key::Left)]);
        assert!(!keys.was_pressed(Key::Left));
        assert!(keys.is_down(Key::Left));

        keys.apply(&[InputEvent::KeyUp(Key::Left)]);
        assert_eq!(keys.axis(Key::Left, Key::Right), 0.0);
    }

    #[test]
    fn test_tap_within_one_frame_still_counts() {
        let mut keys = KeyState::default();
        keys.apply(&[InputEvent::KeyDown(Key::Space), InputEvent::KeyUp(Key::Space)]);
        assert!(!keys.is_down(Key::Space));
        assert!(keys.breakout_input().launch);
    }

    #[test]
    fn test_quit_and_escape() {
        let mut keys = KeyState::default();
        assert_eq!(keys.apply(&[InputEvent::Quit]), LoopControl::Quit);
        let mut keys = KeyState::default();
        assert_eq!(
            keys.apply(&[InputEvent::KeyDown(Key::Escape)]),
            LoopControl::Quit
        );
    }

    #[test]
    fn test_snake_direction_takes_last_arrow() {
        let mut keys = KeyState::default();
        keys.apply(&[
            InputEvent::KeyDown(Key::Up),
            InputEvent::KeyDown(Key::Space),
            InputEvent::KeyDown(Key::Left),
        ]);
        assert_eq!(keys.snake_direction(), Some(Direction::Left));
        keys.end_frame();
        assert_eq!(keys.snake_direction(), None);
    }

    #[test]
    fn test_pong_axis_up_is_negative() {
        let mut keys = KeyState::default();
        keys.apply(&[InputEvent::KeyDown(Key::Up)]);
        assert_eq!(keys.pong_input().player_axis, -1.0);
    }

    #[test]
    fn test_frame_clock_accumulates() {
        let mut clock = FrameClock::new(0.25);
        assert_eq!(clock.advance(0.1), 0);
        assert_eq!(clock.advance(0.1), 0);
        assert_eq!(clock.advance(0.1), 1);
        assert_eq!(clock.steps, 1);
    }

    #[test]
    fn test_frame_clock_caps_substeps() {
        let mut clock = FrameClock::new(0.001);
        // 0.1s clamp would be 100 steps; capped
        assert_eq!(clock.advance(5.0), MAX_SUBSTEPS);
        clock.reset();
        assert_eq!(clock.advance(0.0), 0);
    }
}
