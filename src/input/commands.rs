use crate::map::direction::Direction;

/// Abstract player commands, independent of the keys bound to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    MovePlayer(Direction),
    /// Continue past an end-of-level, game-over or victory screen.
    Confirm,
    ToggleMute,
    Exit,
}
