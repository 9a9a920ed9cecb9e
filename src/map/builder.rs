//! Maze construction and the topology queries used by movement and placement.

use glam::IVec2;
use tracing::debug;

use crate::constants::{is_wall_glyph, markup, CLEARED_GLYPH};
use crate::map::direction::Direction;
use crate::map::parser::ParsedMap;
use crate::map::render::WallRenderer;

/// Which end of the distance ordering free cells are listed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    /// Closest to the maze center first.
    Center,
    /// Farthest from the maze center first.
    Periphery,
}

/// The printable maze grid for one level instance.
///
/// Walls are stored as box-drawing glyphs; pickups keep their markup glyph until collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    cells: Vec<Vec<char>>,
    width: i32,
    height: i32,
}

impl Maze {
    /// Builds a maze from parsed markup, converting raw walls into box-drawing glyphs.
    pub fn from_parsed(parsed: &ParsedMap) -> Self {
        let cells = WallRenderer::render(&parsed.rows);
        let maze = Self::from_cells(cells);
        debug!(width = maze.width, height = maze.height, "Maze built");
        maze
    }

    /// Builds a maze from already rendered glyph rows.
    pub fn from_cells(cells: Vec<Vec<char>>) -> Self {
        let height = cells.len() as i32;
        let width = cells.first().map(|row| row.len()).unwrap_or(0) as i32;
        Self { cells, width, height }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the glyph at a cell, or `None` outside the grid.
    pub fn glyph(&self, position: IVec2) -> Option<char> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        self.cells
            .get(position.y as usize)
            .and_then(|row| row.get(position.x as usize))
            .copied()
    }

    /// True iff the glyph at the cell is a wall glyph. Cells outside the grid count as walls.
    pub fn is_wall(&self, position: IVec2) -> bool {
        self.glyph(position).is_none_or(is_wall_glyph)
    }

    /// True iff the cell can be entered.
    pub fn can_enter(&self, position: IVec2) -> bool {
        !self.is_wall(position)
    }

    /// Applies tunnel wraparound to an x coordinate. Only one cell past either edge wraps.
    pub fn wrap_x(&self, x: i32) -> i32 {
        if x < 0 {
            self.width - 1
        } else if x >= self.width {
            0
        } else {
            x
        }
    }

    /// The cell one step away in the given direction, wrapped horizontally.
    /// Vertical steps never wrap.
    pub fn step(&self, from: IVec2, direction: Direction) -> IVec2 {
        let to = from + direction.as_ivec2();
        IVec2::new(self.wrap_x(to.x), to.y)
    }

    /// Replaces a cell's glyph with a blank.
    pub fn clear(&mut self, position: IVec2) {
        if position.x < 0 || position.y < 0 {
            return;
        }
        if let Some(cell) = self
            .cells
            .get_mut(position.y as usize)
            .and_then(|row| row.get_mut(position.x as usize))
        {
            *cell = CLEARED_GLYPH;
        }
    }

    /// The grid's center cell, rounded towards the top-left.
    pub fn center(&self) -> IVec2 {
        IVec2::new((self.width - 1) / 2, (self.height - 1) / 2)
    }

    /// Lists every cell that is not a wall, an energizer or an entity marker,
    /// ordered by squared distance to the center.
    ///
    /// The sort is stable, so equally distant cells keep their row-major order.
    pub fn free_cells_by_proximity(&self, proximity: Proximity) -> Vec<IVec2> {
        let center = self.center();
        let mut cells: Vec<IVec2> = self
            .cells
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, glyph)| is_free_glyph(**glyph))
                    .map(move |(x, _)| IVec2::new(x as i32, y as i32))
            })
            .collect();

        match proximity {
            Proximity::Center => cells.sort_by_key(|cell| cell.distance_squared(center)),
            Proximity::Periphery => cells.sort_by_key(|cell| std::cmp::Reverse(cell.distance_squared(center))),
        }
        cells
    }

    /// Iterates over the glyph rows.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.iter().map(Vec::as_slice)
    }
}

fn is_free_glyph(glyph: char) -> bool {
    !is_wall_glyph(glyph)
        && !matches!(
            glyph,
            markup::WALL | markup::ENERGIZER | markup::PLAYER | markup::BLINKY | markup::INKY | markup::PINKY | markup::CLYDE
        )
}
