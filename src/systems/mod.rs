//! Rules that act on a [`GameState`](crate::game::state::GameState): collision resolution and pursuer movement.

pub mod collision;
pub mod ghost;
