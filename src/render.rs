//! Terminal presentation of game snapshots.
//!
//! Frame composition is pure and works on a [`Snapshot`]; only [`Renderer`] touches the terminal.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use thousands::Separable;
use tracing::warn;

use crate::constants::{is_wall_glyph, markup};
use crate::entity::ghost::Ghost;
use crate::game::state::{GameOverKind, GameStage};
use crate::game::Snapshot;

const PIP_GLYPH: char = '·';
const HELP_LINE: &str = "Use arrow keys to move. Press 'q' to quit, 'm' to mute";

/// A styled terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
    pub bold: bool,
}

impl Cell {
    const fn plain(glyph: char) -> Self {
        Self {
            glyph,
            color: Color::Reset,
            bold: false,
        }
    }

    const fn styled(glyph: char, color: Color, bold: bool) -> Self {
        Self { glyph, color, bold }
    }
}

fn ghost_color(ghost: Ghost) -> Color {
    match ghost {
        Ghost::Blinky => Color::Red,
        Ghost::Inky => Color::Cyan,
        Ghost::Pinky => Color::AnsiValue(201),
        Ghost::Clyde => Color::AnsiValue(208),
    }
}

/// Composes the maze with its pickups, pursuers and player.
pub fn compose_maze(snapshot: &Snapshot<'_>) -> Vec<Vec<Cell>> {
    let mut rows: Vec<Vec<Cell>> = snapshot
        .maze
        .rows()
        .map(|row| {
            row.iter()
                .map(|glyph| match *glyph {
                    g if is_wall_glyph(g) => Cell::styled(g, Color::Green, false),
                    markup::PIP => Cell::styled(PIP_GLYPH, Color::White, false),
                    markup::ENERGIZER => Cell::styled(markup::ENERGIZER, Color::Blue, true),
                    g => Cell::plain(g),
                })
                .collect()
        })
        .collect();

    let mut put = |position: glam::IVec2, cell: Cell| {
        if position.x < 0 || position.y < 0 {
            return;
        }
        if let Some(slot) = rows
            .get_mut(position.y as usize)
            .and_then(|row| row.get_mut(position.x as usize))
        {
            *slot = cell;
        }
    };

    for pursuer in snapshot.pursuers.iter().filter(|pursuer| pursuer.is_alive()) {
        let glyph = snapshot.badges.ghosts.glyph(pursuer.ghost);
        put(pursuer.position, Cell::styled(glyph, ghost_color(pursuer.ghost), true));
    }

    let pacman = snapshot.pacman;
    let glyph = snapshot.badges.pacman.glyph(pacman.last_move, pacman.chewing);
    // Cooldown flickers between the powered and the normal color
    let energized = pacman.is_powered() && !(pacman.is_cooling_down() && pacman.chewing);
    let color = if energized { Color::Blue } else { Color::Yellow };
    put(pacman.position, Cell::styled(glyph, color, true));

    rows
}

/// The status line shown under the maze.
pub fn hud_line(snapshot: &Snapshot<'_>) -> String {
    format!(
        "Level {}/{}, Score {} (total {}), Pips left {}, Lives {}",
        snapshot.level_index + 1,
        snapshot.level_count,
        snapshot.level_score.separate_with_commas(),
        snapshot.total_score.separate_with_commas(),
        snapshot.items.pips_left(),
        snapshot.lives
    )
}

pub fn help_line(snapshot: &Snapshot<'_>) -> String {
    if snapshot.muted {
        format!("{HELP_LINE} (muted)")
    } else {
        HELP_LINE.to_string()
    }
}

/// The text of an end screen, or `None` while the level is being played.
pub fn screen_lines(snapshot: &Snapshot<'_>) -> Option<Vec<String>> {
    let lines = match snapshot.stage {
        GameStage::Playing => return None,
        GameStage::LevelOver => {
            let mut lines = vec![
                format!("Level {} completed!", snapshot.level_index + 1),
                "Press space to continue. Press 'q' to quit.".to_string(),
            ];
            if let Some(elapsed) = snapshot.last_elapsed {
                lines.push(format!("Level elapsed time: {elapsed} seconds"));
            }
            if let Some(best) = snapshot.best_elapsed {
                lines.push(format!("Best time for {}: {best} seconds", snapshot.level_name));
            }
            lines.push(format!("Score: {}", snapshot.total_score.separate_with_commas()));
            lines
        }
        GameStage::GameWon => vec![
            "You win!".to_string(),
            "Press space to restart. Press 'q' to quit.".to_string(),
            format!(
                "Final score: {} (high score {})",
                snapshot.total_score.separate_with_commas(),
                snapshot.high_score.separate_with_commas()
            ),
        ],
        GameStage::GameOver(GameOverKind::Retry) => vec![
            format!("You lost a life! Lives remaining: {}.", snapshot.lives),
            "Press space to restart the current level. Press 'q' to quit.".to_string(),
        ],
        GameStage::GameOver(GameOverKind::Final) => vec![
            "Game over!".to_string(),
            "Press space to restart from the beginning. Press 'q' to quit.".to_string(),
            format!("High score: {}", snapshot.high_score.separate_with_commas()),
        ],
    };
    Some(lines)
}

/// Puts the terminal into raw mode on the alternate screen, and restores it on drop.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let restored = stdout
            .execute(Show)
            .and_then(|out| out.execute(LeaveAlternateScreen))
            .map(|_| ())
            .and_then(|_| terminal::disable_raw_mode());
        if let Err(e) = restored {
            warn!(error = %e, "Failed to restore the terminal");
        }
    }
}

/// Draws snapshots to stdout.
pub struct Renderer {
    stdout: Stdout,
    last_stage: Option<GameStage>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last_stage: None,
        }
    }

    pub fn draw(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        if self.last_stage != Some(snapshot.stage) {
            self.stdout.queue(Clear(ClearType::All))?;
            self.last_stage = Some(snapshot.stage);
        }

        let mut y = 0;
        match screen_lines(snapshot) {
            Some(lines) => {
                for line in lines {
                    self.text_line(y, &line)?;
                    y += 1;
                }
            }
            None => {
                for row in compose_maze(snapshot) {
                    self.stdout.queue(MoveTo(0, y))?;
                    for cell in row {
                        self.cell(cell)?;
                    }
                    self.stdout.queue(Clear(ClearType::UntilNewLine))?;
                    y += 1;
                }
                self.text_line(y, &hud_line(snapshot))?;
                self.text_line(y + 1, &help_line(snapshot))?;
                y += 2;
            }
        }

        self.stdout.queue(MoveTo(0, y))?;
        self.stdout.queue(Clear(ClearType::FromCursorDown))?;
        self.stdout.flush()
    }

    fn text_line(&mut self, y: u16, text: &str) -> io::Result<()> {
        self.stdout.queue(MoveTo(0, y))?;
        self.stdout.queue(Print(text))?;
        self.stdout.queue(Clear(ClearType::UntilNewLine))?;
        Ok(())
    }

    fn cell(&mut self, cell: Cell) -> io::Result<()> {
        if cell.color == Color::Reset && !cell.bold {
            self.stdout.queue(Print(cell.glyph))?;
            return Ok(());
        }
        if cell.bold {
            self.stdout.queue(SetAttribute(Attribute::Bold))?;
        }
        self.stdout.queue(SetForegroundColor(cell.color))?;
        self.stdout.queue(Print(cell.glyph))?;
        self.stdout.queue(ResetColor)?;
        if cell.bold {
            self.stdout.queue(SetAttribute(Attribute::Reset))?;
        }
        Ok(())
    }
}
