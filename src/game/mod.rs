//! This module contains the main game logic and state.
//!
//! [`Game`] is a synchronous state machine. Each [`GameEvent`] mutates the session in place and
//! yields the [`Effect`]s the caller has to carry out: timers to arm, sounds to play and records
//! to persist. Nothing in here sleeps, spawns or touches the terminal.

use rand::rngs::StdRng;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::audio::Sound;
use crate::config::{Badges, GameConfig, Level};
use crate::constants::{BLINK_INTERVAL, STARTING_LIVES};
use crate::entity::ghost::{Ghost, Pursuer};
use crate::entity::item::Items;
use crate::entity::pacman::Pacman;
use crate::input::commands::GameCommand;
use crate::map::builder::Maze;
use crate::map::direction::Direction;
use crate::persistence::SessionRecord;
use crate::systems::collision::{self, Encounter, Pickup};
use crate::systems::ghost::move_pursuers;

use self::events::{Effect, GameEvent, SessionId, Timer, TimerEvent};
use self::state::{GameOverKind, GameStage, GameState};

pub mod events;
pub mod state;

/// The `Game` struct owns a whole play session.
///
/// It holds the immutable configuration, the persisted record, the cumulative score and lives,
/// and the [`GameState`] of the level being played.
pub struct Game {
    config: GameConfig,
    record: SessionRecord,
    stage: GameStage,
    level_index: usize,
    state: GameState,
    session: SessionId,
    /// Bumped on every energizer so that expiry timers of an earlier cycle can be told apart.
    power_cycle: u32,
    /// Points from completed levels.
    score: u32,
    lives: u8,
    started_at: Instant,
    /// Completion time of the level that just ended, in seconds.
    last_elapsed: Option<u64>,
    rng: StdRng,
}

impl Game {
    /// Creates a session resuming at the record's saved level, or the first one.
    ///
    /// No timer runs until [`Game::start`] is called.
    pub fn new(config: GameConfig, record: SessionRecord, mut rng: StdRng) -> Self {
        let level_index = config.level_index(&record.level_name).unwrap_or(0);
        let state = GameState::build(&config.levels()[level_index].map, &mut rng);

        Self {
            config,
            record,
            stage: GameStage::Playing,
            level_index,
            state,
            session: 0,
            power_cycle: 0,
            score: 0,
            lives: STARTING_LIVES,
            started_at: Instant::now(),
            last_elapsed: None,
            rng,
        }
    }

    /// Starts the first session.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.start_level(&mut effects);
        effects
    }

    /// Applies one event, returning the effects it requests.
    pub fn handle(&mut self, event: GameEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            GameEvent::Command(command) => self.handle_command(command, &mut effects),
            GameEvent::Timer(event) => self.handle_timer(event, &mut effects),
        }
        effects
    }

    fn handle_command(&mut self, command: GameCommand, effects: &mut Vec<Effect>) {
        match command {
            GameCommand::Exit => self.quit(effects),
            GameCommand::ToggleMute => {
                self.record.mute = !self.record.mute;
                debug!(muted = self.record.mute, "Mute toggled");
            }
            GameCommand::Confirm => self.confirm(effects),
            GameCommand::MovePlayer(direction) => {
                if self.stage.is_playing() {
                    effects.push(Effect::StopSound);
                    self.move_player(direction, effects);
                }
            }
        }
    }

    fn handle_timer(&mut self, event: TimerEvent, effects: &mut Vec<Effect>) {
        if event.session != self.session {
            trace!(timer = ?event.timer, session = event.session, current = self.session, "Dropping stale timer");
            return;
        }
        if !self.stage.is_playing() {
            trace!(timer = ?event.timer, stage = ?self.stage, "Dropping timer outside of play");
            return;
        }

        match event.timer {
            Timer::GhostMove => {
                move_pursuers(&self.state.maze, &mut self.state.pursuers, &self.state.pacman, &mut self.rng);
                self.resolve_pursuers(effects);
                if self.stage.is_playing() {
                    self.schedule(Timer::GhostMove, self.level().difficulty.move_interval, effects);
                }
            }
            Timer::Blink => {
                self.state.pacman.chewing = !self.state.pacman.chewing;
                self.schedule(Timer::Blink, BLINK_INTERVAL, effects);
            }
            Timer::PowerExpired { cycle } if cycle == self.power_cycle => {
                debug!(cycle, "Power expired, cooling down");
                self.state.pacman.begin_cooldown();
                self.schedule(
                    Timer::CooldownExpired { cycle },
                    self.level().difficulty.cooldown_duration,
                    effects,
                );
            }
            Timer::CooldownExpired { cycle } if cycle == self.power_cycle => {
                debug!(cycle, "Cooldown expired");
                self.state.pacman.power_down();
            }
            Timer::PowerExpired { cycle } | Timer::CooldownExpired { cycle } => {
                trace!(cycle, current = self.power_cycle, "Dropping expiry of an earlier power cycle");
            }
            Timer::Revive(ghost) => {
                if let Some(pursuer) = self.state.pursuer_mut(ghost).filter(|pursuer| !pursuer.is_alive()) {
                    pursuer.revive();
                    debug!(ghost = %ghost, home = ?pursuer.home(), "Pursuer revived");
                }
            }
        }
    }

    /// Moves the player one cell, then resolves pickups and collisions in order:
    /// pip (level completion ends the turn), energizer (collection ends the turn), pursuers.
    fn move_player(&mut self, direction: Direction, effects: &mut Vec<Effect>) {
        let pacman = &mut self.state.pacman;
        let to = self.state.maze.step(pacman.position, direction);
        if self.state.maze.can_enter(to) {
            pacman.position = to;
            pacman.last_move = Some(direction);
        }

        if let Some(Pickup::Pip { level_complete }) = collision::collect_pip(&mut self.state) {
            effects.push(Effect::Play(Sound::Chomp));
            if level_complete {
                self.complete_level(effects);
                return;
            }
        }

        if collision::collect_energizer(&mut self.state).is_some() {
            self.power_cycle += 1;
            effects.push(Effect::Play(Sound::EatFruit));
            self.schedule(
                Timer::PowerExpired { cycle: self.power_cycle },
                self.level().difficulty.power_duration,
                effects,
            );
            return;
        }

        self.resolve_pursuers(effects);
    }

    fn resolve_pursuers(&mut self, effects: &mut Vec<Effect>) {
        let difficulty = &self.config.levels()[self.level_index].difficulty;
        let (bonus, revival_delay) = (difficulty.ghost_bonus, difficulty.revival_delay);

        for encounter in collision::resolve_pursuers(&mut self.state, bonus) {
            match encounter {
                Encounter::Captured { ghost, .. } => {
                    effects.push(Effect::Play(Sound::EatGhost));
                    self.schedule(Timer::Revive(ghost), revival_delay, effects);
                }
                Encounter::Fatal(ghost) => self.lose_life(ghost, effects),
            }
        }
    }

    fn lose_life(&mut self, ghost: Ghost, effects: &mut Vec<Effect>) {
        self.lives = self.lives.saturating_sub(1);
        self.record.record_score(self.total_score());
        self.stage = GameStage::GameOver(if self.lives > 0 {
            GameOverKind::Retry
        } else {
            GameOverKind::Final
        });
        info!(ghost = %ghost, lives = self.lives, stage = ?self.stage, "Player caught");
        effects.push(Effect::Play(Sound::Death));
    }

    fn complete_level(&mut self, effects: &mut Vec<Effect>) {
        let elapsed = self.started_at.elapsed().as_secs();
        let name = self.level().name.clone();
        self.record.record_elapsed(&name, elapsed);
        self.last_elapsed = Some(elapsed);

        self.score += std::mem::take(&mut self.state.level_score);
        self.record.record_score(self.score);
        effects.push(Effect::Play(Sound::Intermission));

        if self.level_index + 1 < self.config.level_count() {
            self.stage = GameStage::LevelOver;
            info!(level = %name, elapsed, score = self.score, "Level complete");
        } else {
            self.stage = GameStage::GameWon;
            self.record.games_won += 1;
            self.record.level_name.clear();
            info!(level = %name, elapsed, score = self.score, games_won = self.record.games_won, "Game won");
            effects.push(Effect::Persist(self.record.clone()));
        }
    }

    fn confirm(&mut self, effects: &mut Vec<Effect>) {
        match self.stage {
            GameStage::Playing => return,
            GameStage::LevelOver => self.level_index += 1,
            GameStage::GameWon => {
                effects.push(Effect::Persist(self.record.clone()));
                self.restart_game();
            }
            GameStage::GameOver(GameOverKind::Retry) => {}
            GameStage::GameOver(GameOverKind::Final) => self.restart_game(),
        }
        self.start_level(effects);
    }

    fn restart_game(&mut self) {
        self.level_index = 0;
        self.score = 0;
        self.lives = STARTING_LIVES;
    }

    fn quit(&mut self, effects: &mut Vec<Effect>) {
        let resume_at = match self.stage {
            GameStage::LevelOver => self.config.level(self.level_index + 1).map(|level| level.name.clone()),
            GameStage::GameWon => Some(String::new()),
            GameStage::GameOver(GameOverKind::Final) => self.config.level(0).map(|level| level.name.clone()),
            GameStage::Playing | GameStage::GameOver(GameOverKind::Retry) => Some(self.level().name.clone()),
        };
        if let Some(name) = resume_at {
            self.record.level_name = name;
        }
        self.record.record_score(self.total_score());

        info!(level = %self.record.level_name, stage = ?self.stage, "Quitting");
        effects.push(Effect::Persist(self.record.clone()));
        effects.push(Effect::Quit);
    }

    /// Rebuilds the current level and opens a new session for it.
    fn start_level(&mut self, effects: &mut Vec<Effect>) {
        self.session += 1;
        self.power_cycle = 0;
        self.stage = GameStage::Playing;
        self.last_elapsed = None;
        self.started_at = Instant::now();

        let level = &self.config.levels()[self.level_index];
        self.state = GameState::build(&level.map, &mut self.rng);
        self.record.level_name = level.name.clone();
        info!(level = %level.name, session = self.session, lives = self.lives, "Level started");

        let move_interval = level.difficulty.move_interval;
        effects.push(Effect::SessionStarted(self.session));
        effects.push(Effect::Play(Sound::Beginning));
        self.schedule(Timer::GhostMove, move_interval, effects);
        self.schedule(Timer::Blink, BLINK_INTERVAL, effects);
    }

    fn schedule(&self, timer: Timer, after: std::time::Duration, effects: &mut Vec<Effect>) {
        effects.push(Effect::Schedule {
            event: TimerEvent {
                session: self.session,
                timer,
            },
            after,
        });
    }

    fn level(&self) -> &Level {
        &self.config.levels()[self.level_index]
    }

    pub fn stage(&self) -> GameStage {
        self.stage
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn is_muted(&self) -> bool {
        self.record.mute
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the level, for setting up scenarios.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    /// Cumulative score, the level in progress included.
    pub fn total_score(&self) -> u32 {
        self.score + self.state.level_score
    }

    /// A read-only view of everything the presentation layer draws.
    pub fn snapshot(&self) -> Snapshot<'_> {
        let level = self.level();
        Snapshot {
            maze: &self.state.maze,
            pacman: &self.state.pacman,
            pursuers: &self.state.pursuers,
            items: &self.state.items,
            badges: level.badges,
            stage: self.stage,
            level_name: &level.name,
            level_index: self.level_index,
            level_count: self.config.level_count(),
            level_score: self.state.level_score,
            total_score: self.total_score(),
            high_score: self.record.high_score,
            lives: self.lives,
            muted: self.record.mute,
            last_elapsed: self.last_elapsed,
            best_elapsed: self.record.best_elapsed(&level.name),
        }
    }
}

/// What one frame shows.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub maze: &'a Maze,
    pub pacman: &'a Pacman,
    pub pursuers: &'a [Pursuer],
    pub items: &'a Items,
    pub badges: Badges,
    pub stage: GameStage,
    pub level_name: &'a str,
    pub level_index: usize,
    pub level_count: usize,
    pub level_score: u32,
    pub total_score: u32,
    pub high_score: u32,
    pub lives: u8,
    pub muted: bool,
    pub last_elapsed: Option<u64>,
    pub best_elapsed: Option<u64>,
}
