use std::time::Duration;

use glam::IVec2;
use pacman_term::audio::Sound;
use pacman_term::entity::ghost::Ghost;
use pacman_term::entity::item::ItemType;
use pacman_term::game::events::{Effect, GameEvent, Timer, TimerEvent};
use pacman_term::game::state::{GameOverKind, GameStage};
use pacman_term::input::commands::GameCommand;
use pacman_term::map::direction::Direction;
use pacman_term::persistence::SessionRecord;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

use common::*;

#[test]
fn test_start_arms_the_first_session() {
    let mut game = game_with_record(&[("one", TWO_PIPS)], SessionRecord::default());
    let effects = game.start();

    assert_eq!(
        effects,
        vec![
            Effect::SessionStarted(1),
            Effect::Play(Sound::Beginning),
            Effect::Schedule {
                event: TimerEvent {
                    session: 1,
                    timer: Timer::GhostMove
                },
                after: MOVE_INTERVAL,
            },
            Effect::Schedule {
                event: TimerEvent {
                    session: 1,
                    timer: Timer::Blink
                },
                after: Duration::from_millis(500),
            },
        ]
    );
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(game.lives(), 5);
}

#[test]
fn test_eating_every_pip_completes_the_level() {
    let mut game = started(&[("one", TWO_PIPS), ("two", TWO_PIPS)]);

    let effects = step(&mut game, Direction::Right);
    assert_eq!(effects, vec![Effect::StopSound, Effect::Play(Sound::Chomp)]);
    assert_eq!(game.state().items.pips_left(), 1);

    // The spawn cell holds the last pip
    let effects = step(&mut game, Direction::Left);
    assert_that(&effects.contains(&Effect::Play(Sound::Intermission))).is_true();
    assert_eq!(game.stage(), GameStage::LevelOver);
    assert_eq!(game.total_score(), 2);
    assert_eq!(game.record().high_score, 2);
    assert_that(&game.record().best_elapsed("one").is_some()).is_true();

    // Timers are ignored between levels
    assert_that(&fire(&mut game, Timer::GhostMove).is_empty()).is_true();
    assert_that(&step(&mut game, Direction::Right).is_empty()).is_true();
    assert_eq!(game.state().pacman.position, IVec2::new(1, 1));

    let effects = command(&mut game, GameCommand::Confirm);
    assert_eq!(effects.first(), Some(&Effect::SessionStarted(2)));
    assert_eq!(game.level_index(), 1);
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(game.state().level_score, 0);
    assert_eq!(game.total_score(), 2);
    assert_eq!(game.record().level_name, "two");
}

/// Starts `levels` with the spawn pip already gone, so one pip is left.
fn one_pip_left(levels: &[(&str, &[&str])]) -> pacman_term::game::Game {
    let mut game = started(levels);
    let spawn = game.state().pacman.position;
    game.state_mut().items.collect(ItemType::Pip, spawn);
    game
}

#[test]
fn test_single_pip_right_of_the_player_ends_the_level() {
    let mut game = one_pip_left(&[("one", SINGLE_PIP), ("two", SINGLE_PIP)]);
    assert_eq!(game.state().items.pips_left(), 1);

    let effects = step(&mut game, Direction::Right);

    assert_eq!(game.state().items.pips_left(), 0);
    assert_eq!(game.stage(), GameStage::LevelOver);
    assert_that(&effects.contains(&Effect::Play(Sound::Intermission))).is_true();
}

#[test]
fn test_single_pip_on_the_last_level_wins_the_game() {
    let mut game = one_pip_left(&[("only", SINGLE_PIP)]);

    step(&mut game, Direction::Right);

    assert_eq!(game.state().items.pips_left(), 0);
    assert_eq!(game.stage(), GameStage::GameWon);
}

#[test]
fn test_completing_the_last_level_wins_the_game() {
    let mut game = started(&[("one", TWO_PIPS), ("two", TWO_PIPS)]);
    step(&mut game, Direction::Right);
    step(&mut game, Direction::Left);
    command(&mut game, GameCommand::Confirm);
    bench_pursuers(&mut game);

    step(&mut game, Direction::Right);
    let effects = step(&mut game, Direction::Left);
    assert_eq!(game.stage(), GameStage::GameWon);

    let record = persisted(&effects).expect("winning saves the record");
    assert_eq!(record.games_won, 1);
    assert_eq!(record.level_name, "");
    assert_eq!(record.high_score, 4);

    let effects = command(&mut game, GameCommand::Confirm);
    assert_that(&persisted(&effects).is_some()).is_true();
    assert_that(&effects.contains(&Effect::SessionStarted(3))).is_true();
    assert_eq!(game.level_index(), 0);
    assert_eq!(game.total_score(), 0);
    assert_eq!(game.lives(), 5);
}

#[test]
fn test_quit_while_playing_saves_the_current_level() {
    let mut game = started(&[("one", TWO_PIPS), ("two", TWO_PIPS)]);

    let effects = command(&mut game, GameCommand::Exit);
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[1], Effect::Quit);
    assert_eq!(persisted(&effects).map(|record| record.level_name.as_str()), Some("one"));
}

#[test]
fn test_quit_after_a_level_resumes_at_the_next() {
    let mut game = started(&[("one", TWO_PIPS), ("two", TWO_PIPS)]);
    step(&mut game, Direction::Right);
    step(&mut game, Direction::Left);

    let effects = command(&mut game, GameCommand::Exit);
    let record = persisted(&effects).expect("quitting saves the record");
    assert_eq!(record.level_name, "two");
    assert_eq!(record.high_score, 2);
}

#[test]
fn test_saved_level_is_resumed() {
    let levels: &[(&str, &[&str])] = &[("one", TWO_PIPS), ("two", TWO_PIPS)];
    let record = SessionRecord {
        level_name: "two".to_string(),
        ..SessionRecord::default()
    };
    assert_eq!(game_with_record(levels, record).level_index(), 1);

    let record = SessionRecord {
        level_name: "nowhere".to_string(),
        ..SessionRecord::default()
    };
    assert_eq!(game_with_record(levels, record).level_index(), 0);
}

#[test]
fn test_powered_pursuer_moving_onto_player_is_captured() {
    let mut game = started(&[("dead-end", DEAD_END)]);
    place(&mut game, Ghost::Blinky, 4, 1);

    step(&mut game, Direction::Right);
    let effects = step(&mut game, Direction::Right);
    assert_eq!(
        effects,
        vec![
            Effect::StopSound,
            Effect::Play(Sound::EatFruit),
            Effect::Schedule {
                event: TimerEvent {
                    session: 1,
                    timer: Timer::PowerExpired { cycle: 1 }
                },
                after: POWER_DURATION,
            },
        ]
    );
    assert_that(&game.state().pacman.is_powered()).is_true();

    // The dead end leaves the fleeing pursuer one way out: onto the player
    let effects = fire(&mut game, Timer::GhostMove);
    assert_that(&effects.contains(&Effect::Play(Sound::EatGhost))).is_true();
    assert_eq!(
        scheduled(&effects),
        vec![(Timer::Revive(Ghost::Blinky), REVIVAL_DELAY), (Timer::GhostMove, MOVE_INTERVAL)]
    );

    let blinky = game.state().pursuer(Ghost::Blinky).unwrap();
    assert_that(&blinky.is_alive()).is_false();
    assert_eq!(game.state().level_score, 1 + GHOST_BONUS);
    assert_eq!(game.state().maze.glyph(IVec2::new(3, 1)), Some(' '));
}

#[test]
fn test_revived_pursuer_returns_home() {
    let mut game = started(&[("dead-end", DEAD_END)]);
    place(&mut game, Ghost::Blinky, 4, 1);
    step(&mut game, Direction::Right);
    step(&mut game, Direction::Right);
    fire(&mut game, Timer::GhostMove);

    fire(&mut game, Timer::Revive(Ghost::Blinky));
    let blinky = game.state().pursuer(Ghost::Blinky).unwrap();
    assert_that(&blinky.is_alive()).is_true();
    assert_eq!(blinky.position, blinky.home());
}

#[test]
fn test_capture_bonus_grows_within_a_power_cycle() {
    let mut game = started(&[("dead-end", DEAD_END)]);
    step(&mut game, Direction::Right);
    step(&mut game, Direction::Right);
    for ghost in [Ghost::Blinky, Ghost::Inky, Ghost::Pinky] {
        place(&mut game, ghost, 4, 1);
    }

    let effects = step(&mut game, Direction::Right);
    let eaten = effects.iter().filter(|effect| **effect == Effect::Play(Sound::EatGhost)).count();
    assert_eq!(eaten, 3);
    // Two pips plus 1b + 2b + 3b
    assert_eq!(game.state().level_score, 2 + 6 * GHOST_BONUS);
    assert_eq!(game.state().captures, 3);
    assert_eq!(
        scheduled(&effects),
        vec![
            (Timer::Revive(Ghost::Blinky), REVIVAL_DELAY),
            (Timer::Revive(Ghost::Inky), REVIVAL_DELAY),
            (Timer::Revive(Ghost::Pinky), REVIVAL_DELAY),
        ]
    );
}

#[test]
fn test_unpowered_collision_costs_a_life() {
    let mut game = started(&[("one", TWO_PIPS)]);
    place(&mut game, Ghost::Blinky, 2, 1);

    let effects = step(&mut game, Direction::Right);
    assert_that(&effects.contains(&Effect::Play(Sound::Death))).is_true();
    assert_eq!(game.lives(), 4);
    assert_eq!(game.stage(), GameStage::GameOver(GameOverKind::Retry));
    assert_eq!(game.record().high_score, 1);

    let effects = command(&mut game, GameCommand::Confirm);
    assert_eq!(effects.first(), Some(&Effect::SessionStarted(2)));
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(game.lives(), 4);
    assert_eq!(game.total_score(), 0);
}

#[test]
fn test_pursuer_moving_onto_player_costs_a_life() {
    let mut game = started(&[("one", TWO_PIPS)]);
    for _ in 0..2 {
        place(&mut game, Ghost::Blinky, 2, 1);
        step(&mut game, Direction::Right);
        command(&mut game, GameCommand::Confirm);
        bench_pursuers(&mut game);
    }
    assert_eq!(game.lives(), 3);

    // Blinky heads straight for the player
    place(&mut game, Ghost::Blinky, 2, 1);
    let effects = fire(&mut game, Timer::GhostMove);

    assert_that(&effects.contains(&Effect::Play(Sound::Death))).is_true();
    assert_that(&scheduled(&effects).is_empty()).is_true();
    assert_eq!(game.lives(), 2);
    assert_eq!(game.stage(), GameStage::GameOver(GameOverKind::Retry));
}

#[test]
fn test_last_life_ends_the_game() {
    let mut game = started(&[("one", TWO_PIPS)]);
    for attempt in 1..=5 {
        if attempt > 1 {
            command(&mut game, GameCommand::Confirm);
            bench_pursuers(&mut game);
        }
        place(&mut game, Ghost::Clyde, 2, 1);
        step(&mut game, Direction::Right);
    }

    assert_eq!(game.lives(), 0);
    assert_eq!(game.stage(), GameStage::GameOver(GameOverKind::Final));

    command(&mut game, GameCommand::Confirm);
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(game.lives(), 5);
    assert_eq!(game.level_index(), 0);
}

#[test]
fn test_stale_session_timers_are_ignored() {
    let mut game = started(&[("one", TWO_PIPS)]);
    place(&mut game, Ghost::Blinky, 2, 1);
    step(&mut game, Direction::Right);
    command(&mut game, GameCommand::Confirm);
    assert_eq!(game.session(), 2);

    let chewing = game.state().pacman.chewing;
    let stale = GameEvent::Timer(TimerEvent {
        session: 1,
        timer: Timer::Blink,
    });
    assert_that(&game.handle(stale).is_empty()).is_true();
    assert_eq!(game.state().pacman.chewing, chewing);

    let effects = fire(&mut game, Timer::Blink);
    assert_eq!(scheduled(&effects), vec![(Timer::Blink, Duration::from_millis(500))]);
    assert_eq!(game.state().pacman.chewing, !chewing);
}

#[test]
fn test_expiry_of_an_earlier_power_cycle_is_ignored() {
    let mut game = started(&[("twice", TWO_ENERGIZERS)]);
    step(&mut game, Direction::Right);
    step(&mut game, Direction::Right);

    assert_that(&fire(&mut game, Timer::PowerExpired { cycle: 1 }).is_empty()).is_true();
    assert_that(&game.state().pacman.is_powered()).is_true();
    assert_that(&game.state().pacman.is_cooling_down()).is_false();

    let effects = fire(&mut game, Timer::PowerExpired { cycle: 2 });
    assert_eq!(scheduled(&effects), vec![(Timer::CooldownExpired { cycle: 2 }, COOLDOWN_DURATION)]);
    assert_that(&game.state().pacman.is_cooling_down()).is_true();

    fire(&mut game, Timer::CooldownExpired { cycle: 2 });
    assert_that(&game.state().pacman.is_powered()).is_false();
    assert_that(&game.state().pacman.is_cooling_down()).is_false();
}

#[test]
fn test_cooldown_still_captures() {
    let mut game = started(&[("twice", TWO_ENERGIZERS)]);
    step(&mut game, Direction::Right);
    fire(&mut game, Timer::PowerExpired { cycle: 1 });
    assert_that(&game.state().pacman.is_cooling_down()).is_true();

    place(&mut game, Ghost::Pinky, 2, 2);
    let effects = step(&mut game, Direction::Down);

    assert_that(&effects.contains(&Effect::Play(Sound::EatGhost))).is_true();
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(game.state().level_score, 1 + GHOST_BONUS);
}

#[test]
fn test_mute_toggles_in_every_stage() {
    let mut game = started(&[("one", TWO_PIPS)]);
    assert_that(&command(&mut game, GameCommand::ToggleMute).is_empty()).is_true();
    assert_that(&game.is_muted()).is_true();

    place(&mut game, Ghost::Blinky, 2, 1);
    step(&mut game, Direction::Right);
    assert_eq!(game.stage(), GameStage::GameOver(GameOverKind::Retry));

    command(&mut game, GameCommand::ToggleMute);
    assert_that(&game.is_muted()).is_false();

    let effects = command(&mut game, GameCommand::Exit);
    assert_eq!(persisted(&effects).map(|record| record.mute), Some(false));
}

#[test]
fn test_confirm_while_playing_does_nothing() {
    let mut game = started(&[("one", TWO_PIPS)]);
    assert_that(&command(&mut game, GameCommand::Confirm).is_empty()).is_true();
    assert_eq!(game.session(), 1);
}

#[test]
fn test_high_score_is_never_lowered() {
    let record = SessionRecord {
        high_score: 100,
        ..SessionRecord::default()
    };
    let mut game = game_with_record(&[("one", TWO_PIPS)], record);
    game.start();
    bench_pursuers(&mut game);

    step(&mut game, Direction::Right);
    step(&mut game, Direction::Left);
    assert_eq!(game.stage(), GameStage::GameWon);
    assert_eq!(game.record().high_score, 100);
}
