//! The player-controlled entity.

use bitflags::bitflags;
use glam::IVec2;

use crate::map::direction::Direction;

bitflags! {
    /// The player's power modes.
    ///
    /// `COOLDOWN` is only ever set together with `POWERED`; it marks the visual tail
    /// of a power cycle during which captures are still possible.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PowerMode: u8 {
        const POWERED = 1 << 0;
        const COOLDOWN = 1 << 1;
    }
}

/// The player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacman {
    pub position: IVec2,
    /// Direction of the last successful move, `None` until the player first moves.
    pub last_move: Option<Direction>,
    pub mode: PowerMode,
    /// Cosmetic chew state, toggled by the blink tick.
    pub chewing: bool,
}

impl Pacman {
    pub fn new(position: IVec2) -> Self {
        Self {
            position,
            last_move: None,
            mode: PowerMode::empty(),
            chewing: false,
        }
    }

    /// The last-move vector, zero before the first move.
    pub fn heading(&self) -> IVec2 {
        self.last_move.map(Direction::as_ivec2).unwrap_or(IVec2::ZERO)
    }

    /// True while pursuer collisions capture rather than kill, cooldown included.
    pub fn is_powered(&self) -> bool {
        self.mode.contains(PowerMode::POWERED)
    }

    pub fn is_cooling_down(&self) -> bool {
        self.mode.contains(PowerMode::COOLDOWN)
    }

    /// Starts a fresh power cycle.
    pub fn power_up(&mut self) {
        self.mode = PowerMode::POWERED;
    }

    /// Enters the visual tail of the power cycle.
    pub fn begin_cooldown(&mut self) {
        if self.is_powered() {
            self.mode.insert(PowerMode::COOLDOWN);
        }
    }

    /// Ends the power cycle entirely.
    pub fn power_down(&mut self) {
        self.mode = PowerMode::empty();
    }
}
