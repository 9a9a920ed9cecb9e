//! Pickup and pursuer collision resolution on the player's cell.

use smallvec::SmallVec;
use tracing::debug;

use crate::entity::ghost::Ghost;
use crate::entity::item::ItemType;
use crate::game::state::GameState;

/// What the player picked up on its current cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pickup {
    /// A pip was collected. `level_complete` is set when it was the last one.
    Pip { level_complete: bool },
    /// An energizer was collected and a new power cycle has begun.
    Energizer,
}

/// The result of the player sharing a cell with a live pursuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encounter {
    /// The pursuer was captured and `bonus` points were awarded.
    Captured { ghost: Ghost, bonus: u32 },
    /// The pursuer caught the player.
    Fatal(Ghost),
}

/// Collects the pip under the player, if any.
pub fn collect_pip(state: &mut GameState) -> Option<Pickup> {
    let position = state.pacman.position;
    if !state.items.collect(ItemType::Pip, position) {
        return None;
    }

    state.level_score += ItemType::Pip.get_score();
    state.maze.clear(position);
    let level_complete = state.items.pips_left() == 0;
    debug!(position = ?position, pips_left = state.items.pips_left(), "Pip collected");
    Some(Pickup::Pip { level_complete })
}

/// Collects the energizer under the player, if any, starting a fresh power cycle.
pub fn collect_energizer(state: &mut GameState) -> Option<Pickup> {
    let position = state.pacman.position;
    if !state.items.collect(ItemType::Energizer, position) {
        return None;
    }

    state.maze.clear(position);
    state.pacman.power_up();
    state.captures = 0;
    debug!(position = ?position, "Energizer collected");
    Some(Pickup::Energizer)
}

/// Resolves every live pursuer on the player's cell, in fixed identity order.
///
/// While the player is powered (cooldown included) each pursuer is captured and the n-th capture
/// of the power cycle is worth `ghost_bonus * n`. Otherwise the first pursuer found is fatal and
/// resolution stops there.
pub fn resolve_pursuers(state: &mut GameState, ghost_bonus: u32) -> SmallVec<[Encounter; 4]> {
    let mut encounters = SmallVec::new();
    let position = state.pacman.position;
    let powered = state.pacman.is_powered();

    for index in 0..state.pursuers.len() {
        let pursuer = &state.pursuers[index];
        if !pursuer.is_alive() || pursuer.position != position {
            continue;
        }
        let ghost = pursuer.ghost;

        if !powered {
            debug!(ghost = %ghost, position = ?position, "Player caught");
            encounters.push(Encounter::Fatal(ghost));
            break;
        }

        state.pursuers[index].capture();
        state.captures += 1;
        let bonus = ghost_bonus * state.captures;
        state.level_score += bonus;
        state.maze.clear(position);
        debug!(ghost = %ghost, captures = state.captures, bonus, "Pursuer captured");
        encounters.push(Encounter::Captured { ghost, bonus });
    }

    encounters
}
