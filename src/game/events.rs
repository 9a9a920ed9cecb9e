use std::time::Duration;

use crate::audio::Sound;
use crate::entity::ghost::Ghost;
use crate::input::commands::GameCommand;
use crate::persistence::SessionRecord;

/// Identifies one game session: a single attempt at a single level.
///
/// A new id is issued whenever a level is (re)built, and timers armed for an older id are dropped.
pub type SessionId = u64;

/// The timed transitions driving a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Pursuer movement tick. Re-armed after every tick.
    GhostMove,
    /// Cosmetic chew toggle. Re-armed after every tick.
    Blink,
    /// End of the powered phase of power cycle `cycle`.
    PowerExpired { cycle: u32 },
    /// End of the cooldown phase of power cycle `cycle`.
    CooldownExpired { cycle: u32 },
    /// A captured pursuer comes back home.
    Revive(Ghost),
}

/// A timer firing for the session it was armed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub session: SessionId,
    pub timer: Timer,
}

/// Everything that can reach the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
    Timer(TimerEvent),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

impl From<TimerEvent> for GameEvent {
    fn from(event: TimerEvent) -> Self {
        GameEvent::Timer(event)
    }
}

/// Side effects requested by the state machine. It never performs them itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A new session began: every timer armed for an earlier one must be cancelled.
    SessionStarted(SessionId),
    /// Deliver `event` after `after` has elapsed, unless its session is cancelled first.
    Schedule { event: TimerEvent, after: Duration },
    Play(Sound),
    /// Stop whatever sound is still playing.
    StopSound,
    Persist(SessionRecord),
    /// Stop the game loop.
    Quit,
}
