use glam::IVec2;
use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::constants::{GHOST_PLACEMENT_SPREAD, PLAYER_PLACEMENT_SPREAD};
use crate::entity::ghost::{Ghost, Pursuer};
use crate::entity::item::Items;
use crate::entity::pacman::Pacman;
use crate::map::builder::{Maze, Proximity};
use crate::map::parser::ParsedMap;

/// The overall stage of a session. Exactly one is active at any time.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum GameStage {
    /// The level is being played.
    #[default]
    Playing,
    /// The level was cleared and another one follows.
    LevelOver,
    /// The last level was cleared.
    GameWon,
    /// The player was caught.
    GameOver(GameOverKind),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameOverKind {
    /// Lives remain; confirming replays the same level.
    Retry,
    /// No lives remain; confirming restarts the whole game.
    Final,
}

impl GameStage {
    pub fn is_playing(self) -> bool {
        self == GameStage::Playing
    }
}

/// The maze and entities of the level currently being played.
///
/// Built fresh from the immutable level layout on every level start, retry or restart.
#[derive(Debug, Clone)]
pub struct GameState {
    pub maze: Maze,
    pub pacman: Pacman,
    /// Always in fixed identity order.
    pub pursuers: SmallVec<[Pursuer; 4]>,
    pub items: Items,
    /// Points earned in this level: pips plus capture bonuses.
    pub level_score: u32,
    /// Captures made during the current power cycle.
    pub captures: u32,
}

impl GameState {
    /// Builds the level's maze and places every entity.
    ///
    /// Entities with a spawn marker start there. The player without one is placed at random
    /// among the most peripheral free cells, each unmarked pursuer among the most central ones.
    /// Fallback placement never reuses a cell another entity already holds.
    pub fn build<R: Rng + ?Sized>(map: &ParsedMap, rng: &mut R) -> Self {
        let maze = Maze::from_parsed(map);

        let mut taken: SmallVec<[IVec2; 5]> = SmallVec::new();
        taken.extend(map.player_start);
        taken.extend(map.ghost_starts.iter().map(|(_, position)| *position));

        let player_start = match map.player_start {
            Some(position) => position,
            None => {
                let position = place_randomly(&maze, Proximity::Periphery, PLAYER_PLACEMENT_SPREAD, &taken, rng);
                debug!(position = ?position, "Player placed without a spawn marker");
                taken.push(position);
                position
            }
        };

        let pursuers = Ghost::ALL
            .into_iter()
            .map(|ghost| {
                let marked = map.ghost_starts.iter().find(|(g, _)| *g == ghost).map(|(_, position)| *position);
                let home = marked.unwrap_or_else(|| {
                    let position = place_randomly(&maze, Proximity::Center, GHOST_PLACEMENT_SPREAD, &taken, rng);
                    debug!(ghost = %ghost, position = ?position, "Pursuer placed without a spawn marker");
                    taken.push(position);
                    position
                });
                Pursuer::new(ghost, home)
            })
            .collect();

        Self {
            maze,
            pacman: Pacman::new(player_start),
            pursuers,
            items: Items::new(map.pips.clone(), map.energizers.clone()),
            level_score: 0,
            captures: 0,
        }
    }

    pub fn pursuer(&self, ghost: Ghost) -> Option<&Pursuer> {
        self.pursuers.iter().find(|pursuer| pursuer.ghost == ghost)
    }

    pub fn pursuer_mut(&mut self, ghost: Ghost) -> Option<&mut Pursuer> {
        self.pursuers.iter_mut().find(|pursuer| pursuer.ghost == ghost)
    }
}

/// Picks uniformly among the first `spread` free cells in proximity order that nobody holds.
fn place_randomly<R: Rng + ?Sized>(maze: &Maze, proximity: Proximity, spread: usize, taken: &[IVec2], rng: &mut R) -> IVec2 {
    let free = maze.free_cells_by_proximity(proximity);
    let mut candidates: Vec<IVec2> = free.iter().copied().filter(|cell| !taken.contains(cell)).collect();
    if candidates.is_empty() {
        warn!(proximity = ?proximity, "No unoccupied free cell left, allowing a shared cell");
        candidates = free;
    }
    if candidates.is_empty() {
        warn!(proximity = ?proximity, "Maze has no free cells, falling back to its center");
        return maze.center();
    }

    let spread = spread.min(candidates.len());
    candidates[rng.random_range(0..spread)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::parser::MapTileParser;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(board: &[&str], seed: u64) -> GameState {
        GameState::build(&MapTileParser::parse_board(board).unwrap(), &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_markers_are_used() {
        let state = build(&["#####", "#CB.#", "#IPY#", "#...#", "#####"], 0);
        assert_eq!(state.pacman.position, IVec2::new(1, 1));
        assert_eq!(state.pursuer(Ghost::Blinky).map(Pursuer::home), Some(IVec2::new(2, 1)));
        assert_eq!(state.pursuer(Ghost::Clyde).map(Pursuer::home), Some(IVec2::new(3, 2)));
        assert_eq!(state.items.pips_left(), 9);
    }

    #[test]
    fn test_fallback_placement_never_stacks() {
        for seed in 0..20 {
            let state = build(&["#######", "#.....#", "#.....#", "#..o..#", "#.....#", "#.....#", "#######"], seed);
            let mut cells: Vec<IVec2> = state.pursuers.iter().map(|p| p.position).collect();
            cells.push(state.pacman.position);
            let count = cells.len();
            cells.sort_by_key(|c| (c.y, c.x));
            cells.dedup();
            assert_eq!(cells.len(), count, "seed {seed}");
            assert!(state.pursuers.iter().all(|p| p.position != IVec2::new(3, 3)));
        }
    }

    #[test]
    fn test_pursuers_keep_identity_order() {
        let state = build(&["#####", "#...#", "#...#", "#...#", "#####"], 3);
        let order: Vec<Ghost> = state.pursuers.iter().map(|p| p.ghost).collect();
        assert_eq!(order, Ghost::ALL.to_vec());
    }
}
