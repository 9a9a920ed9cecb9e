//! The things that live in a maze: the player, the pursuers and the pickups.

pub mod ghost;
pub mod item;
pub mod pacman;
