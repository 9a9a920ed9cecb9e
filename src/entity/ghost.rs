//! Pursuer identities and their per-level state.

use glam::IVec2;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::constants::markup;

/// The four pursuer identities, in the fixed order they are moved and checked for collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, EnumIter)]
pub enum Ghost {
    Blinky,
    Inky,
    Pinky,
    Clyde,
}

/// How a pursuer picks its target while the player is not powered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Heads straight for the player.
    Direct,
    /// Tries directions in a random order.
    Random,
    /// Aims one cell ahead of the player.
    Predictive,
    /// Aims two cells behind the player.
    Ambush,
}

impl Ghost {
    pub const ALL: [Ghost; 4] = [Ghost::Blinky, Ghost::Inky, Ghost::Pinky, Ghost::Clyde];

    /// The behavior bound to this identity.
    pub const fn behavior(self) -> Behavior {
        match self {
            Ghost::Blinky => Behavior::Direct,
            Ghost::Inky => Behavior::Random,
            Ghost::Pinky => Behavior::Predictive,
            Ghost::Clyde => Behavior::Ambush,
        }
    }

    /// The markup letter that marks this pursuer's spawn.
    pub const fn marker(self) -> char {
        match self {
            Ghost::Blinky => markup::BLINKY,
            Ghost::Inky => markup::INKY,
            Ghost::Pinky => markup::PINKY,
            Ghost::Clyde => markup::CLYDE,
        }
    }

    pub fn from_marker(c: char) -> Option<Ghost> {
        Ghost::ALL.into_iter().find(|ghost| ghost.marker() == c)
    }
}

/// A pursuer in the current level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pursuer {
    pub ghost: Ghost,
    pub position: IVec2,
    /// Where the pursuer spawned and where it revives. Never changes after spawn.
    home: IVec2,
    pub dead: bool,
}

impl Pursuer {
    pub fn new(ghost: Ghost, home: IVec2) -> Self {
        Self {
            ghost,
            position: home,
            home,
            dead: false,
        }
    }

    pub fn home(&self) -> IVec2 {
        self.home
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Marks the pursuer as captured. It stays frozen where it was caught until revived.
    pub fn capture(&mut self) {
        self.dead = true;
    }

    /// Brings the pursuer back at its home cell.
    pub fn revive(&mut self) {
        self.dead = false;
        self.position = self.home;
    }
}
