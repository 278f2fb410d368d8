//! Beep Arcade entry point
//!
//! Runs one of the games headless for a fixed number of frames with a simple
//! autopilot at the controls, routing every game event through the sound
//! effect path into an in-memory sink, then prints a summary.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};

use beep_arcade::audio::{AudioManager, MemorySink, SoundEffect, synthesize, wav};
use beep_arcade::platform::{
    EventSource, FrameClock, InputEvent, Key, KeyState, LoopControl, ScriptedEvents,
};
use beep_arcade::sim::snake::DEFAULT_GRID;
use beep_arcade::sim::{
    Direction, GamePhase, GameState, PongState, SnakeGame, SnakePhase, tick,
};
use beep_arcade::{Result, Settings};

/// Channel count of the stand-in mixer
const SINK_CHANNELS: u16 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Game {
    Breakout,
    Snake,
    Pong,
}

#[derive(Parser, Debug)]
#[command(name = "beep-arcade")]
#[command(about = "Headless arcade runner with procedural sound effects")]
struct Cli {
    /// Game to run
    #[arg(value_enum, default_value_t = Game::Breakout)]
    game: Game,
    /// Frames to simulate before quitting
    #[arg(long, default_value_t = 3600)]
    frames: u64,
    /// RNG seed (defaults to the settings file, then the clock)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Write every sound effect as a WAV file into this directory
    #[arg(long)]
    export_sfx: Option<PathBuf>,
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let seed = args.seed.or(settings.seed).unwrap_or_else(clock_seed);
    log::info!("Beep Arcade starting ({:?}, seed {seed})", args.game);

    if let Some(dir) = &args.export_sfx {
        export_sfx(dir, settings.sample_rate)?;
    }

    let mut session = Session {
        audio: AudioManager::from_settings(&settings),
        sink: MemorySink::new(SINK_CHANNELS, settings.sample_rate),
        keys: KeyState::default(),
        script: ScriptedEvents::new().at(args.frames, InputEvent::Quit),
    };

    let summary = match args.game {
        Game::Breakout => session.breakout(seed, &settings),
        Game::Snake => session.snake(seed, &settings)?,
        Game::Pong => session.pong(seed, &settings),
    };

    println!("{summary}");
    println!(
        "frames: {}  sounds: {} ({:.2}s)  tones cached: {} (hits {}, misses {})",
        session.script.frame().saturating_sub(1),
        session.sink.played().len(),
        session.sink.total_duration(),
        session.audio.cache().len(),
        session.audio.cache().hits(),
        session.audio.cache().misses(),
    );
    Ok(())
}

/// Write every sound effect as `<name>.wav` under `dir`
fn export_sfx(dir: &Path, sample_rate: u32) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for effect in SoundEffect::ALL {
        let buffer = synthesize(&effect.tone(sample_rate))?;
        wav::write(&dir.join(format!("{}.wav", effect.name())), &buffer)?;
    }
    log::info!(
        "Exported {} effects to {}",
        SoundEffect::ALL.len(),
        dir.display()
    );
    Ok(())
}

/// Everything a headless run shares across games
struct Session {
    audio: AudioManager,
    sink: MemorySink,
    keys: KeyState,
    script: ScriptedEvents,
}

impl Session {
    /// Merge scripted and autopilot input into the key state
    fn frame_input(&mut self, autopilot: Vec<InputEvent>) -> LoopControl {
        let mut events = self.script.poll();
        events.extend(autopilot);
        self.keys.apply(&events)
    }

    fn play(&mut self, effect: SoundEffect) {
        self.audio.play(effect, &mut self.sink);
    }

    fn breakout(&mut self, seed: u64, settings: &Settings) -> String {
        let mut state = GameState::new(seed);
        let mut clock = FrameClock::new(settings.frame_dt());
        let (mut games, mut best) = (0u32, 0u64);

        loop {
            let autopilot = breakout_autopilot(&state, &self.keys);
            if self.frame_input(autopilot) == LoopControl::Quit {
                break;
            }

            let mut input = self.keys.breakout_input();
            for _ in 0..clock.advance(settings.frame_dt()) {
                let before = state.phase;
                tick(&mut state, &input, clock.step_dt());
                if before != state.phase && matches!(state.phase, GamePhase::Won | GamePhase::GameOver) {
                    games += 1;
                    best = best.max(state.score);
                }

                // One-shot inputs apply to the first substep only
                input.launch = false;
                input.pause = false;
                input.restart = false;
            }

            for event in state.drain_events() {
                self.play(event.sound());
            }
            self.keys.end_frame();
        }

        format!(
            "breakout: phase {:?}  score {}  lives {}  bricks left {}  finished games {}  best {}",
            state.phase,
            state.score,
            state.lives,
            state.bricks_remaining(),
            games,
            best.max(state.score),
        )
    }

    fn snake(&mut self, seed: u64, settings: &Settings) -> Result<String> {
        let mut game = SnakeGame::new(DEFAULT_GRID.0, DEFAULT_GRID.1, seed)?;
        let mut clock = FrameClock::new(settings.snake_dt());
        let (mut deaths, mut best) = (0u32, 0u32);
        let mut paused = false;

        loop {
            let autopilot = snake_autopilot(&game);
            if self.frame_input(autopilot) == LoopControl::Quit {
                break;
            }

            if self.keys.was_pressed(Key::P) {
                paused = !paused;
            }
            if self.keys.was_pressed(Key::R) && game.phase != SnakePhase::Alive {
                game.restart();
                clock.reset();
            }
            if let Some(dir) = self.keys.snake_direction() {
                game.request_direction(dir);
            }

            let steps = clock.advance(settings.frame_dt());
            if !paused {
                for _ in 0..steps {
                    let Some(event) = game.tick() else { break };
                    if let Some(effect) = event.sound() {
                        self.play(effect);
                    }
                    if game.phase != SnakePhase::Alive {
                        deaths += 1;
                        best = best.max(game.score);
                    }
                }
            }
            self.keys.end_frame();
        }

        Ok(format!(
            "snake: phase {:?}  length {}  score {}  finished games {}  best {}",
            game.phase,
            game.len(),
            game.score,
            deaths,
            best.max(game.score),
        ))
    }

    fn pong(&mut self, seed: u64, settings: &Settings) -> String {
        let mut state = PongState::new(seed);
        let mut clock = FrameClock::new(settings.frame_dt());
        let mut matches = 0u32;
        let mut paused = false;

        loop {
            let autopilot = pong_autopilot(&state, &self.keys);
            if self.frame_input(autopilot) == LoopControl::Quit {
                break;
            }
            if self.keys.was_pressed(Key::P) {
                paused = !paused;
            }

            let mut input = self.keys.pong_input();
            let steps = clock.advance(settings.frame_dt());
            if !paused {
                for _ in 0..steps {
                    let was_over = state.winner.is_some();
                    state.tick(&input, clock.step_dt());
                    if !was_over && state.winner.is_some() {
                        matches += 1;
                    }
                    input.restart = false;
                }
            }

            for event in state.drain_events() {
                self.play(event.sound());
            }
            self.keys.end_frame();
        }

        format!(
            "pong: player {} - cpu {}  winner {:?}  finished matches {}",
            state.player_score, state.cpu_score, state.winner, matches,
        )
    }
}

/// Press and release events that move the held keys to `want`
fn hold_only(keys: &KeyState, candidates: &[Key], want: Option<Key>) -> Vec<InputEvent> {
    let mut events = Vec::new();
    for &key in candidates {
        let wanted = want == Some(key);
        if wanted && !keys.is_down(key) {
            events.push(InputEvent::KeyDown(key));
        } else if !wanted && keys.is_down(key) {
            events.push(InputEvent::KeyUp(key));
        }
    }
    events
}

fn tap(key: Key) -> [InputEvent; 2] {
    [InputEvent::KeyDown(key), InputEvent::KeyUp(key)]
}

/// Keep the paddle under the ball; serve and restart immediately
fn breakout_autopilot(state: &GameState, keys: &KeyState) -> Vec<InputEvent> {
    const DEADZONE: f32 = 6.0;

    let gap = state.ball.rect.center().x - state.paddle.rect.center().x;
    let want = if state.phase != GamePhase::Playing || gap.abs() <= DEADZONE {
        None
    } else if gap > 0.0 {
        Some(Key::Right)
    } else {
        Some(Key::Left)
    };
    let mut events = hold_only(keys, &[Key::Left, Key::Right], want);

    match state.phase {
        GamePhase::Serve => events.extend(tap(Key::Space)),
        GamePhase::Won | GamePhase::GameOver => events.extend(tap(Key::R)),
        _ => {}
    }
    events
}

/// Greedy step toward the food that avoids walls and the body
fn snake_autopilot(game: &SnakeGame) -> Vec<InputEvent> {
    if game.phase != SnakePhase::Alive {
        return tap(Key::R).to_vec();
    }

    let head = game.head();
    let current = game.next_direction();
    let free = |dir: Direction| {
        let cell = head + dir.delta();
        game.in_bounds(cell) && !game.body().any(|b| b == cell)
    };

    let mut options = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        .into_iter()
        .filter(|&d| d != game.direction().opposite() && free(d))
        .collect::<Vec<_>>();
    if let Some(food) = game.food {
        let dist = |d: Direction| {
            let c = head + d.delta();
            (food - c).abs().element_sum()
        };
        options.sort_by_key(|&d| (dist(d), d != current));
    }

    match options.first() {
        Some(&dir) if dir != current => {
            let key = match dir {
                Direction::Up => Key::Up,
                Direction::Down => Key::Down,
                Direction::Left => Key::Left,
                Direction::Right => Key::Right,
            };
            tap(key).to_vec()
        }
        _ => Vec::new(),
    }
}

/// Follow the ball with the left paddle
fn pong_autopilot(state: &PongState, keys: &KeyState) -> Vec<InputEvent> {
    const DEADZONE: f32 = 10.0;

    let gap = state.ball.rect.center().y - state.player.rect.center().y;
    let want = if gap.abs() <= DEADZONE {
        None
    } else if gap > 0.0 {
        Some(Key::Down)
    } else {
        Some(Key::Up)
    };
    let mut events = hold_only(keys, &[Key::Up, Key::Down], want);
    if state.winner.is_some() {
        events.extend(tap(Key::R));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("beep-arcade").chain(list.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.game, Game::Breakout);
        assert_eq!(parsed.seed, None);
    }

    #[test]
    fn test_parse_flags() {
        let parsed = args(&["pong", "--frames", "10", "--seed", "7", "--export-sfx", "out"]).unwrap();
        assert_eq!(parsed.game, Game::Pong);
        assert_eq!(parsed.frames, 10);
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.export_sfx, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(args(&["tetris"]).is_err());
        assert!(args(&["--frames", "many"]).is_err());
        assert!(args(&["--seed"]).is_err());
    }

    #[test]
    fn test_breakout_session_plays_sounds() {
        let settings = Settings::default();
        let mut session = Session {
            audio: AudioManager::from_settings(&settings),
            sink: MemorySink::new(SINK_CHANNELS, settings.sample_rate),
            keys: KeyState::default(),
            script: ScriptedEvents::new().at(600, InputEvent::Quit),
        };
        let summary = session.breakout(42, &settings);
        assert!(summary.starts_with("breakout"));
        // At least the launch sound
        assert!(!session.sink.played().is_empty());
        assert!(session.sink.played().iter().all(|b| b.channels() == SINK_CHANNELS));
    }

    #[test]
    fn test_snake_autopilot_turns_toward_food() {
        let mut game = SnakeGame::new(20, 20, 1).unwrap();
        game.food = Some(game.head() + glam::IVec2::new(0, -3));
        let events = snake_autopilot(&game);
        assert_eq!(events, tap(Key::Up).to_vec());
    }
}
