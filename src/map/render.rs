//! Conversion of raw `#` wall markup into box-drawing glyphs.

use crate::constants::markup;

/// Handles the conversion of raw wall markup into printable glyphs.
pub struct WallRenderer;

impl WallRenderer {
    /// Converts every `#` cell into a box-drawing glyph, leaving other cells untouched.
    ///
    /// The outer boundary uses double-line glyphs, inner walls single-line glyphs.
    /// Rows that are open on exactly one edge are opened on the other edge too, so that
    /// every tunnel mouth has a matching exit.
    pub fn render(rows: &[Vec<char>]) -> Vec<Vec<char>> {
        let mut source = rows.to_vec();
        Self::open_tunnels(&mut source);

        let height = source.len();
        let width = source.first().map(Vec::len).unwrap_or(0);
        let is_wall = |x: usize, y: usize| source[y][x] == markup::WALL;

        let mut rendered = source.clone();
        for y in 0..height {
            for x in 0..width {
                if !is_wall(x, y) {
                    continue;
                }

                let neighbours = Neighbours {
                    top: y > 0 && is_wall(x, y - 1),
                    bottom: y + 1 < height && is_wall(x, y + 1),
                    left: x > 0 && is_wall(x - 1, y),
                    right: x + 1 < width && is_wall(x + 1, y),
                };
                let boundary = Neighbours {
                    top: y == 0,
                    bottom: y == height - 1,
                    left: x == 0,
                    right: x == width - 1,
                };

                rendered[y][x] = Self::glyph_for(neighbours, boundary);
            }
        }

        rendered
    }

    /// Opens the far edge of every row whose near edge is open.
    fn open_tunnels(rows: &mut [Vec<char>]) {
        for row in rows.iter_mut() {
            let Some(last) = row.len().checked_sub(1) else {
                continue;
            };
            match (row[0] == markup::EMPTY, row[last] == markup::EMPTY) {
                (true, false) => row[last] = markup::EMPTY,
                (false, true) => row[0] = markup::EMPTY,
                _ => {}
            }
        }
    }

    fn glyph_for(n: Neighbours, b: Neighbours) -> char {
        let vertical_edge = !b.top && !b.bottom;

        // Corners of a tunnel mouth on the left or right boundary
        if vertical_edge && (b.left || b.right) && (n.left || n.right) && !n.bottom {
            return '╨';
        }
        if vertical_edge && (b.left || b.right) && (n.left || n.right) && !n.top {
            return '╥';
        }
        if vertical_edge && b.left && !b.right && !n.bottom {
            return '╜';
        }
        if vertical_edge && b.left && !b.right && !n.top {
            return '╖';
        }
        if vertical_edge && !b.left && b.right && !n.bottom {
            return '╙';
        }
        if vertical_edge && !b.left && b.right && !n.top {
            return '╓';
        }

        // Outer corners
        match (b.top, b.bottom, b.left, b.right) {
            (true, false, true, false) => return '╔',
            (true, false, false, true) => return '╗',
            (false, true, true, false) => return '╚',
            (false, true, false, true) => return '╝',
            _ => {}
        }

        // Outer straight runs
        if (b.top || b.bottom) && !b.left && !b.right && !n.top && !n.bottom {
            return '═';
        }
        if vertical_edge && (b.left || b.right) && !n.left && !n.right && (n.top || n.bottom) {
            return '║';
        }

        // Joints between the boundary and inner walls
        if vertical_edge && b.left && !b.right && n.right {
            return '╟';
        }
        if b.top && !b.bottom && !b.left && !b.right && n.bottom {
            return '╤';
        }
        if vertical_edge && !b.left && b.right && n.left {
            return '╢';
        }
        if !b.top && b.bottom && !b.left && !b.right && n.top {
            return '╧';
        }

        Self::inner_glyph(n)
    }

    fn inner_glyph(n: Neighbours) -> char {
        match (n.top, n.bottom, n.left, n.right) {
            (false, false, false, false) => '─',
            (_, _, false, false) => '│',
            (false, false, _, _) => '─',
            (false, true, false, true) => '┌',
            (false, true, true, false) => '┐',
            (true, false, true, false) => '┘',
            (true, false, false, true) => '└',
            (true, true, false, true) => '├',
            (false, true, true, true) => '┬',
            (true, true, true, false) => '┤',
            (true, false, true, true) => '┴',
            (true, true, true, true) => '┼',
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Neighbours {
    top: bool,
    bottom: bool,
    left: bool,
    right: bool,
}
