//! Map parsing functionality for converting raw maze markup into structured data.

use glam::IVec2;
use smallvec::SmallVec;

use crate::constants::{markup, MIN_MAZE_SIZE};
use crate::entity::ghost::Ghost;
use crate::error::ParseError;

/// A single cell of raw maze markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTile {
    /// A walkable cell without a pickup.
    Empty,
    /// A wall cell.
    Wall,
    /// A pip.
    Pip,
    /// An energizer.
    Energizer,
    /// The player's spawn. The cell also holds a pip.
    PlayerStart,
    /// A pursuer's spawn. The cell also holds a pip.
    GhostStart(Ghost),
}

/// Represents the parsed data from a raw maze layout.
#[derive(Debug, Clone)]
pub struct ParsedMap {
    /// Raw rows with every spawn marker replaced by a pip, ready for wall conversion.
    pub rows: Vec<Vec<char>>,
    /// Pip positions in row-major order, spawn cells included.
    pub pips: Vec<IVec2>,
    /// Energizer positions in row-major order.
    pub energizers: Vec<IVec2>,
    /// The player's spawn, if marked.
    pub player_start: Option<IVec2>,
    /// Marked pursuer spawns.
    pub ghost_starts: SmallVec<[(Ghost, IVec2); 4]>,
}

/// Parser for converting raw maze markup into structured map data.
pub struct MapTileParser;

impl MapTileParser {
    /// Parses a single character into a map tile.
    pub fn parse_character(c: char) -> Option<MapTile> {
        match c {
            markup::WALL => Some(MapTile::Wall),
            markup::PIP => Some(MapTile::Pip),
            markup::ENERGIZER => Some(MapTile::Energizer),
            markup::EMPTY => Some(MapTile::Empty),
            markup::PLAYER => Some(MapTile::PlayerStart),
            _ => Ghost::from_marker(c).map(MapTile::GhostStart),
        }
    }

    /// Parses raw rows into structured map data.
    ///
    /// # Errors
    ///
    /// Returns an error if the maze is smaller than 5x5, rows differ in width,
    /// a character is unknown, or a spawn marker appears twice.
    pub fn parse_board<S: AsRef<str>>(raw_board: &[S]) -> Result<ParsedMap, ParseError> {
        let height = raw_board.len();
        let width = raw_board.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if height < MIN_MAZE_SIZE || width < MIN_MAZE_SIZE {
            return Err(ParseError::TooSmall {
                width,
                height,
                min: MIN_MAZE_SIZE,
            });
        }

        let mut parsed = ParsedMap {
            rows: Vec::with_capacity(height),
            pips: Vec::new(),
            energizers: Vec::new(),
            player_start: None,
            ghost_starts: SmallVec::new(),
        };

        for (y, line) in raw_board.iter().enumerate() {
            let mut row: Vec<char> = line.as_ref().chars().collect();
            if row.len() != width {
                return Err(ParseError::RaggedRow {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }

            for (x, cell) in row.iter_mut().enumerate() {
                let position = IVec2::new(x as i32, y as i32);
                let tile = Self::parse_character(*cell).ok_or(ParseError::UnknownCharacter { character: *cell, x, y })?;

                match tile {
                    MapTile::Empty | MapTile::Wall => {}
                    MapTile::Pip => parsed.pips.push(position),
                    MapTile::Energizer => parsed.energizers.push(position),
                    MapTile::PlayerStart => {
                        if parsed.player_start.replace(position).is_some() {
                            return Err(ParseError::DuplicateSpawn(*cell));
                        }
                        parsed.pips.push(position);
                        *cell = markup::PIP;
                    }
                    MapTile::GhostStart(ghost) => {
                        if parsed.ghost_starts.iter().any(|(g, _)| *g == ghost) {
                            return Err(ParseError::DuplicateSpawn(*cell));
                        }
                        parsed.ghost_starts.push((ghost, position));
                        parsed.pips.push(position);
                        *cell = markup::PIP;
                    }
                }
            }

            parsed.rows.push(row);
        }

        Ok(parsed)
    }
}
