//! Grid Snake
//!
//! The head moves one cell per tick. Turns requested between ticks are
//! buffered and applied at the start of the next tick, so the snake can
//! never reverse into its own neck mid-cell.

use std::collections::{HashSet, VecDeque};

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::audio::SoundEffect;
use crate::error::{ArcadeError, Result};

/// Default grid: 800x600 at 10px cells
pub const DEFAULT_GRID: (u32, u32) = (80, 60);
pub const INITIAL_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Cell offset (y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn from_delta(delta: IVec2) -> Option<Direction> {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
        .into_iter()
        .find(|d| d.delta() == delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Wall,
    SelfCollision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakePhase {
    Alive,
    Dead(DeathCause),
    /// Snake fills the whole grid
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakeEvent {
    Moved,
    Ate { score: u32 },
    Died(DeathCause),
    Won,
}

impl SnakeEvent {
    pub fn sound(&self) -> Option<SoundEffect> {
        match self {
            SnakeEvent::Moved => None,
            SnakeEvent::Ate { .. } => Some(SoundEffect::Eat),
            SnakeEvent::Died(_) => Some(SoundEffect::GameOver),
            SnakeEvent::Won => Some(SoundEffect::Win),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnakeGame {
    width: u32,
    height: u32,
    /// Head first
    body: VecDeque<IVec2>,
    occupied: HashSet<IVec2>,
    direction: Direction,
    pending: Option<Direction>,
    /// Layout restored by `restart`
    start_body: Vec<IVec2>,
    start_direction: Direction,
    pub food: Option<IVec2>,
    pub score: u32,
    pub phase: SnakePhase,
    rng: Pcg32,
}

impl SnakeGame {
    /// New game with a short snake at the grid center heading right
    pub fn new(width: u32, height: u32, seed: u64) -> Result<Self> {
        if width <= INITIAL_LENGTH as u32 || height == 0 {
            return Err(ArcadeError::InvalidGrid { width, height });
        }
        let head = IVec2::new(width as i32 / 2, height as i32 / 2);
        let body = (0..INITIAL_LENGTH as i32)
            .map(|i| head - IVec2::new(i, 0))
            .collect();
        Self::with_body(width, height, body, Direction::Right, seed)
    }

    /// Game with an explicit body (head first) and heading
    pub fn with_body(
        width: u32,
        height: u32,
        body: Vec<IVec2>,
        direction: Direction,
        seed: u64,
    ) -> Result<Self> {
        if width == 0 || height == 0 || body.is_empty() {
            return Err(ArcadeError::InvalidGrid { width, height });
        }
        let mut game = Self {
            width,
            height,
            body: VecDeque::with_capacity(body.len()),
            occupied: HashSet::with_capacity(body.len()),
            direction,
            pending: None,
            start_body: Vec::new(),
            start_direction: direction,
            food: None,
            score: 0,
            phase: SnakePhase::Alive,
            rng: Pcg32::seed_from_u64(seed),
        };
        for &cell in &body {
            if !game.in_bounds(cell) || !game.occupied.insert(cell) {
                return Err(ArcadeError::InvalidGrid { width, height });
            }
            game.body.push_back(cell);
        }
        game.start_body = body;
        game.place_food();
        Ok(game)
    }

    /// Start over from the starting layout, continuing the RNG stream
    pub fn restart(&mut self) {
        self.body = self.start_body.iter().copied().collect();
        self.occupied = self.start_body.iter().copied().collect();
        self.direction = self.start_direction;
        self.pending = None;
        self.score = 0;
        self.phase = SnakePhase::Alive;
        self.place_food();
        log::info!("Snake restarted");
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    pub fn body(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Direction of travel
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Direction that will be used on the next tick
    pub fn next_direction(&self) -> Direction {
        self.pending.unwrap_or(self.direction)
    }

    /// Buffer a turn for the next tick. A request to reverse straight back
    /// along the current heading is rejected and leaves the buffer as is.
    pub fn request_direction(&mut self, dir: Direction) -> bool {
        if dir == self.direction.opposite() {
            return false;
        }
        self.pending = Some(dir);
        true
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// Move one cell. Returns `None` once the game has ended.
    pub fn tick(&mut self) -> Option<SnakeEvent> {
        if self.phase != SnakePhase::Alive {
            return None;
        }

        if let Some(dir) = self.pending.take() {
            self.direction = dir;
        }
        let next = self.head() + self.direction.delta();

        if !self.in_bounds(next) {
            return Some(self.die(DeathCause::Wall));
        }

        let eating = self.food == Some(next);
        // Tail vacates its cell this tick unless growing, so the head may move into it
        let vacating = if eating { None } else { self.body.back().copied() };
        if self.occupied.contains(&next) && Some(next) != vacating {
            return Some(self.die(DeathCause::SelfCollision));
        }

        if let Some(tail) = vacating {
            self.body.pop_back();
            self.occupied.remove(&tail);
        }
        self.occupied.insert(next);
        self.body.push_front(next);

        if !eating {
            return Some(SnakeEvent::Moved);
        }

        self.score += 1;
        self.food = None;
        if self.body.len() as u64 == self.width as u64 * self.height as u64 {
            self.phase = SnakePhase::Won;
            log::info!("Snake filled the grid with score {}", self.score);
            return Some(SnakeEvent::Won);
        }
        self.place_food();
        Some(SnakeEvent::Ate { score: self.score })
    }

    fn die(&mut self, cause: DeathCause) -> SnakeEvent {
        self.phase = SnakePhase::Dead(cause);
        log::info!("Snake died ({:?}) with score {}", cause, self.score);
        SnakeEvent::Died(cause)
    }

    /// Put food on a uniformly random free cell (none if the grid is full)
    fn place_food(&mut self) {
        let total = self.width as usize * self.height as usize;
        let free = total - self.occupied.len();
        if free == 0 {
            self.food = None;
            return;
        }
        let pick = self.rng.random_range(0..free);
        self.food = (0..self.height as i32)
            .flat_map(|y| (0..self.width as i32).map(move |x| IVec2::new(x, y)))
            .filter(|c| !self.occupied.contains(c))
            .nth(pick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_snake() -> SnakeGame {
        let body = vec![IVec2::new(5, 5), IVec2::new(4, 5), IVec2::new(3, 5)];
        SnakeGame::with_body(20, 20, body, Direction::Right, 1).unwrap()
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        assert!(SnakeGame::new(0, 10, 1).is_err());
        assert!(SnakeGame::new(3, 10, 1).is_err());
        assert!(SnakeGame::new(10, 0, 1).is_err());
        assert!(SnakeGame::with_body(5, 5, vec![IVec2::new(9, 9)], Direction::Up, 1).is_err());
    }

    #[test]
    fn test_new_game_layout() {
        let game = SnakeGame::new(80, 60, 42).unwrap();
        assert_eq!(game.len(), INITIAL_LENGTH);
        assert_eq!(game.head(), IVec2::new(40, 30));
        assert_eq!(game.direction(), Direction::Right);
        let food = game.food.unwrap();
        assert!(game.in_bounds(food));
        assert!(!game.body().any(|c| c == food));
    }

    #[test]
    fn test_moves_one_cell_per_tick() {
        let mut game = straight_snake();
        game.food = None;
        assert_eq!(game.tick(), Some(SnakeEvent::Moved));
        assert_eq!(game.head(), IVec2::new(6, 5));
        assert_eq!(game.len(), 3);
    }

    #[test]
    fn test_reverse_request_rejected() {
        let mut game = straight_snake();
        game.food = None;
        assert!(game.request_direction(Direction::Down));
        assert!(!game.request_direction(Direction::Left));
        assert_eq!(game.next_direction(), Direction::Down);

        game.tick();
        assert_eq!(game.direction(), Direction::Down);
        assert_eq!(game.head(), IVec2::new(5, 6));
    }

    #[test]
    fn test_turn_applied_only_at_tick() {
        let mut game = straight_snake();
        game.food = None;
        game.request_direction(Direction::Up);
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(game.head(), IVec2::new(5, 5));
        game.tick();
        assert_eq!(game.head(), IVec2::new(5, 4));
    }

    #[test]
    fn test_eating_grows() {
        let mut game = straight_snake();
        game.food = Some(IVec2::new(6, 5));
        assert_eq!(game.tick(), Some(SnakeEvent::Ate { score: 1 }));
        assert_eq!(game.len(), 4);
        // Tail stays put on the eating tick
        assert_eq!(game.body().last(), Some(IVec2::new(3, 5)));
        let food = game.food.unwrap();
        assert!(!game.body().any(|c| c == food));
    }

    #[test]
    fn test_wall_death() {
        let body = vec![IVec2::new(19, 0), IVec2::new(18, 0)];
        let mut game = SnakeGame::with_body(20, 20, body, Direction::Right, 1).unwrap();
        game.food = None;
        assert_eq!(game.tick(), Some(SnakeEvent::Died(DeathCause::Wall)));
        assert_eq!(game.phase, SnakePhase::Dead(DeathCause::Wall));
        assert_eq!(game.tick(), None);
    }

    #[test]
    fn test_self_collision() {
        // Hook shape: turning down runs into the body
        let body = vec![
            IVec2::new(5, 5),
            IVec2::new(4, 5),
            IVec2::new(4, 6),
            IVec2::new(5, 6),
            IVec2::new(6, 6),
        ];
        let mut game = SnakeGame::with_body(20, 20, body, Direction::Right, 1).unwrap();
        game.food = None;
        game.request_direction(Direction::Down);
        let before: Vec<IVec2> = game.body().collect();
        assert_eq!(game.tick(), Some(SnakeEvent::Died(DeathCause::SelfCollision)));

        // Dying leaves the body exactly where it was
        assert_eq!(game.len(), 5);
        assert_eq!(game.body().collect::<Vec<_>>(), before);
        assert_eq!(game.occupied.len(), 5);
    }

    #[test]
    fn test_chasing_tail_is_legal() {
        // 2x2 loop: head follows the cell the tail is leaving
        let body = vec![
            IVec2::new(0, 0),
            IVec2::new(0, 1),
            IVec2::new(1, 1),
            IVec2::new(1, 0),
        ];
        let mut game = SnakeGame::with_body(3, 3, body, Direction::Up, 1).unwrap();
        game.food = None;
        game.request_direction(Direction::Right);
        assert_eq!(game.tick(), Some(SnakeEvent::Moved));
        assert_eq!(game.head(), IVec2::new(1, 0));
    }

    #[test]
    fn test_filling_grid_wins() {
        let body = vec![IVec2::new(0, 0)];
        let mut game = SnakeGame::with_body(2, 1, body, Direction::Right, 1).unwrap();
        assert_eq!(game.food, Some(IVec2::new(1, 0)));
        assert_eq!(game.tick(), Some(SnakeEvent::Won));
        assert_eq!(game.phase, SnakePhase::Won);
        assert_eq!(game.food, None);
    }

    #[test]
    fn test_restart() {
        let mut game = SnakeGame::new(10, 10, 1).unwrap();
        let start: Vec<IVec2> = game.body().collect();
        game.food = None;
        while game.phase == SnakePhase::Alive {
            game.tick();
        }
        game.restart();
        assert_eq!(game.phase, SnakePhase::Alive);
        assert_eq!(game.len(), INITIAL_LENGTH);
        assert_eq!(game.body().collect::<Vec<_>>(), start);
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(game.score, 0);
        assert!(game.food.is_some());
    }

    #[test]
    fn test_restart_on_narrow_grid() {
        let body = vec![IVec2::new(0, 0)];
        let mut game = SnakeGame::with_body(2, 1, body, Direction::Right, 1).unwrap();
        assert_eq!(game.tick(), Some(SnakeEvent::Won));
        game.restart();
        assert_eq!(game.phase, SnakePhase::Alive);
        assert_eq!(game.head(), IVec2::new(0, 0));
        assert_eq!(game.food, Some(IVec2::new(1, 0)));
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(IVec2::new(1, 0)), Some(Direction::Right));
        assert_eq!(Direction::from_delta(IVec2::new(0, 1)), Some(Direction::Down));
        assert_eq!(Direction::from_delta(IVec2::new(1, 1)), None);
    }
}
