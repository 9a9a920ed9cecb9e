//! Pursuer movement policies.
//!
//! Every policy reduces to an ordering of the four directions. The first direction in that
//! ordering whose destination is open and not held by another live pursuer wins.

use glam::IVec2;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::entity::ghost::{Behavior, Pursuer};
use crate::entity::pacman::Pacman;
use crate::map::builder::Maze;
use crate::map::direction::Direction;

/// The point a pursuer aims at. `None` means the policy has no target and shuffles instead.
pub fn target(behavior: Behavior, from: IVec2, pacman: &Pacman) -> Option<IVec2> {
    if pacman.is_powered() {
        return Some(flee_target(from, pacman.position));
    }

    let heading = pacman.heading();
    match behavior {
        Behavior::Direct => Some(pacman.position),
        Behavior::Random => None,
        Behavior::Predictive => Some(pacman.position + heading),
        Behavior::Ambush => Some(pacman.position - 2 * heading),
    }
}

/// Reflection of the player through the pursuer, so moving towards it moves away from the player.
pub fn flee_target(from: IVec2, player: IVec2) -> IVec2 {
    2 * from - player
}

/// Orders the four directions by squared distance from `from + direction` to `target`.
///
/// The sort is stable: ties keep the Up, Down, Left, Right order.
pub fn sort_directions_by_distance(from: IVec2, target: IVec2) -> [Direction; 4] {
    let mut directions = Direction::DIRECTIONS;
    directions.sort_by_key(|direction| (from + direction.as_ivec2()).distance_squared(target));
    directions
}

/// The four directions in a uniformly random order.
pub fn random_directions<R: Rng + ?Sized>(rng: &mut R) -> [Direction; 4] {
    let mut directions = Direction::DIRECTIONS;
    directions.shuffle(rng);
    directions
}

/// The candidate ordering for one pursuer on one movement tick.
pub fn candidates<R: Rng + ?Sized>(behavior: Behavior, from: IVec2, pacman: &Pacman, rng: &mut R) -> [Direction; 4] {
    match target(behavior, from, pacman) {
        Some(target) => sort_directions_by_distance(from, target),
        None => random_directions(rng),
    }
}

/// Returns the destination of the first candidate that can be entered and is not held by a live
/// pursuer. Stays put when every candidate is blocked.
pub fn best_move(maze: &Maze, pursuers: &[Pursuer], from: IVec2, candidates: &[Direction]) -> IVec2 {
    candidates
        .iter()
        .map(|direction| maze.step(from, *direction))
        .find(|to| maze.can_enter(*to) && !pursuers.iter().any(|other| other.is_alive() && other.position == *to))
        .unwrap_or(from)
}

/// Advances every live pursuer by one cell, in their fixed order.
///
/// Each pursuer sees the positions the earlier ones have already moved to.
pub fn move_pursuers<R: Rng + ?Sized>(maze: &Maze, pursuers: &mut [Pursuer], pacman: &Pacman, rng: &mut R) {
    for index in 0..pursuers.len() {
        if !pursuers[index].is_alive() {
            continue;
        }

        let (ghost, from) = (pursuers[index].ghost, pursuers[index].position);
        let order = candidates(ghost.behavior(), from, pacman, rng);
        // A step always leaves `from`, so the mover itself never blocks its destination
        let to = best_move(maze, pursuers, from, &order);

        if to != from {
            trace!(ghost = %ghost, from = ?from, to = ?to, "Pursuer moved");
        }
        pursuers[index].position = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ghost::Ghost;
    use crate::map::parser::MapTileParser;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn maze(board: &[&str]) -> Maze {
        Maze::from_parsed(&MapTileParser::parse_board(board).unwrap())
    }

    #[test]
    fn test_sort_directions_is_stable() {
        // Up and Left are equally close to a target up-left of the origin
        let order = sort_directions_by_distance(IVec2::new(5, 5), IVec2::new(4, 4));
        assert_eq!(order, [Direction::Up, Direction::Left, Direction::Down, Direction::Right]);
    }

    #[test]
    fn test_flee_target_reflects_player() {
        assert_eq!(flee_target(IVec2::new(3, 3), IVec2::new(1, 3)), IVec2::new(5, 3));
    }

    #[test]
    fn test_targets_follow_heading() {
        let mut pacman = Pacman::new(IVec2::new(4, 4));
        pacman.last_move = Some(Direction::Right);
        let from = IVec2::new(1, 1);

        assert_eq!(target(Behavior::Direct, from, &pacman), Some(IVec2::new(4, 4)));
        assert_eq!(target(Behavior::Predictive, from, &pacman), Some(IVec2::new(5, 4)));
        assert_eq!(target(Behavior::Ambush, from, &pacman), Some(IVec2::new(2, 4)));
        assert_eq!(target(Behavior::Random, from, &pacman), None);

        pacman.power_up();
        assert_eq!(target(Behavior::Random, from, &pacman), Some(IVec2::new(-2, -2)));
    }

    #[test]
    fn test_best_move_skips_walls_and_live_pursuers() {
        let maze = maze(&["#####", "#...#", "#...#", "#...#", "#####"]);
        let blocker = Pursuer::new(Ghost::Inky, IVec2::new(2, 1));

        let to = best_move(
            &maze,
            std::slice::from_ref(&blocker),
            IVec2::new(2, 2),
            &[Direction::Up, Direction::Right],
        );
        assert_eq!(to, IVec2::new(3, 2));

        let mut dead = blocker.clone();
        dead.capture();
        let to = best_move(&maze, &[dead], IVec2::new(2, 2), &[Direction::Up]);
        assert_eq!(to, IVec2::new(2, 1));
    }

    #[test]
    fn test_best_move_stays_when_boxed_in() {
        let maze = maze(&["#####", "##.##", "#...#", "#####", "#####"]);
        let to = best_move(&maze, &[], IVec2::new(2, 1), &[Direction::Up, Direction::Left, Direction::Right]);
        assert_eq!(to, IVec2::new(2, 1));
    }

    #[test]
    fn test_dead_pursuers_do_not_move() {
        let maze = maze(&["#######", "#.....#", "#.....#", "#.....#", "#######"]);
        let pacman = Pacman::new(IVec2::new(1, 1));
        let mut pursuers = vec![Pursuer::new(Ghost::Blinky, IVec2::new(5, 3))];
        pursuers[0].capture();

        move_pursuers(&maze, &mut pursuers, &pacman, &mut StdRng::seed_from_u64(7));
        assert_eq!(pursuers[0].position, IVec2::new(5, 3));
    }

    #[test]
    fn test_direct_pursuer_closes_in() {
        let maze = maze(&["#######", "#.....#", "#.....#", "#.....#", "#######"]);
        let pacman = Pacman::new(IVec2::new(1, 1));
        let mut pursuers = vec![Pursuer::new(Ghost::Blinky, IVec2::new(5, 1))];

        move_pursuers(&maze, &mut pursuers, &pacman, &mut StdRng::seed_from_u64(7));
        assert_eq!(pursuers[0].position, IVec2::new(4, 1));
    }
}
