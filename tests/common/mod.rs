#![allow(dead_code)]

use std::time::Duration;

use pacman_term::config::GameConfig;
use pacman_term::entity::ghost::Ghost;
use pacman_term::game::events::{Effect, GameEvent, Timer, TimerEvent};
use pacman_term::game::Game;
use pacman_term::input::commands::GameCommand;
use pacman_term::map::direction::Direction;
use pacman_term::persistence::SessionRecord;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const MOVE_INTERVAL: Duration = Duration::from_millis(250);
pub const POWER_DURATION: Duration = Duration::from_secs(6);
pub const COOLDOWN_DURATION: Duration = Duration::from_secs(2);
pub const REVIVAL_DELAY: Duration = Duration::from_secs(8);
pub const GHOST_BONUS: u32 = 40;

/// A small open room. The player starts top-left next to a single pip.
pub const TWO_PIPS: &[&str] = &["#######", "#C.   #", "#     #", "#     #", "#######"];

/// A 7×7 maze whose only pip besides the spawn cell sits right of the player.
pub const SINGLE_PIP: &[&str] = &["#######", "#C.   #", "#     #", "#     #", "#     #", "#     #", "#######"];

/// The cell right of the energizer is a dead end whose only exit is the energizer cell.
pub const DEAD_END: &[&str] = &["#######", "#C.o.##", "#.#####", "#.....#", "#######"];

/// Two energizers in a row.
pub const TWO_ENERGIZERS: &[&str] = &["#######", "#Coo..#", "#.....#", "#.....#", "#######"];

/// A YAML document with one `test` difficulty and the given levels.
pub fn config_yaml(levels: &[(&str, &[&str])]) -> String {
    let mut yaml = String::from(
        "difficulties:\n  test:\n    ghost_speed: 4\n    power_duration: 6\n    cooldown_duration: 2\n    revival_delay: 8\n    ghost_bonus: 40\nlevels:\n",
    );
    for (name, maze) in levels {
        yaml.push_str(&format!("  - name: {name}\n    difficulty: test\n    maze:\n"));
        for row in *maze {
            yaml.push_str(&format!("      - \"{row}\"\n"));
        }
    }
    yaml
}

pub fn config(levels: &[(&str, &[&str])]) -> GameConfig {
    GameConfig::from_yaml(&config_yaml(levels)).expect("test configuration is valid")
}

pub fn game_with_record(levels: &[(&str, &[&str])], record: SessionRecord) -> Game {
    Game::new(config(levels), record, StdRng::seed_from_u64(42))
}

/// A started game with every pursuer out of play.
pub fn started(levels: &[(&str, &[&str])]) -> Game {
    let mut game = game_with_record(levels, SessionRecord::default());
    game.start();
    bench_pursuers(&mut game);
    game
}

/// Captures every pursuer so that none moves or collides until revived.
pub fn bench_pursuers(game: &mut Game) {
    for pursuer in game.state_mut().pursuers.iter_mut() {
        pursuer.capture();
    }
}

/// Brings one pursuer back into play at `position`.
pub fn place(game: &mut Game, ghost: Ghost, x: i32, y: i32) {
    let pursuer = game.state_mut().pursuer_mut(ghost).expect("every identity is present");
    pursuer.revive();
    pursuer.position = glam::IVec2::new(x, y);
}

pub fn step(game: &mut Game, direction: Direction) -> Vec<Effect> {
    game.handle(GameCommand::MovePlayer(direction).into())
}

pub fn command(game: &mut Game, command: GameCommand) -> Vec<Effect> {
    game.handle(command.into())
}

/// Fires `timer` for the game's current session.
pub fn fire(game: &mut Game, timer: Timer) -> Vec<Effect> {
    let event = TimerEvent {
        session: game.session(),
        timer,
    };
    game.handle(GameEvent::Timer(event))
}

/// The timers requested by `effects`, with their delays.
pub fn scheduled(effects: &[Effect]) -> Vec<(Timer, Duration)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Schedule { event, after } => Some((event.timer, *after)),
            _ => None,
        })
        .collect()
}

pub fn persisted(effects: &[Effect]) -> Option<&SessionRecord> {
    effects.iter().find_map(|effect| match effect {
        Effect::Persist(record) => Some(record),
        _ => None,
    })
}
