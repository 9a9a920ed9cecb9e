//! This module contains all the constants used in the game.

use std::time::Duration;

/// Lives granted at the start of a game, and after a final game over is confirmed.
pub const STARTING_LIVES: u8 = 5;

/// The smallest maze accepted, in cells, for both width and height.
pub const MIN_MAZE_SIZE: usize = 5;

/// Cadence of the cosmetic chew animation.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Capture bonus base used when a difficulty does not set one.
pub const DEFAULT_GHOST_BONUS: u32 = 40;

/// Fallback placement picks the player among this many of the most peripheral free cells.
pub const PLAYER_PLACEMENT_SPREAD: usize = 4;
/// Fallback placement picks each pursuer among this many of the most central free cells.
pub const GHOST_PLACEMENT_SPREAD: usize = 6;

/// Raw markup understood by the maze parser.
pub mod markup {
    pub const WALL: char = '#';
    pub const PIP: char = '.';
    pub const ENERGIZER: char = 'o';
    pub const EMPTY: char = ' ';
    pub const PLAYER: char = 'C';
    pub const BLINKY: char = 'B';
    pub const INKY: char = 'I';
    pub const PINKY: char = 'P';
    pub const CLYDE: char = 'Y';
}

/// Glyph left behind in the maze once a cell's contents are cleared.
pub const CLEARED_GLYPH: char = ' ';

/// Single-line glyphs used for walls inside the maze.
pub const INNER_WALL_GLYPHS: [char; 11] = ['│', '─', '┌', '┐', '└', '┘', '├', '┤', '┬', '┴', '┼'];
/// Double-line glyphs used for the outer boundary and its joints with inner walls.
pub const OUTER_WALL_GLYPHS: [char; 10] = ['║', '═', '╔', '╗', '╚', '╝', '╟', '╢', '╤', '╧'];
/// Glyphs used where the boundary bends around a tunnel mouth.
pub const TUNNEL_WALL_GLYPHS: [char; 6] = ['╖', '╓', '╜', '╙', '╨', '╥'];

/// Returns true if the glyph belongs to any of the wall glyph sets.
pub fn is_wall_glyph(glyph: char) -> bool {
    INNER_WALL_GLYPHS.contains(&glyph) || OUTER_WALL_GLYPHS.contains(&glyph) || TUNNEL_WALL_GLYPHS.contains(&glyph)
}
