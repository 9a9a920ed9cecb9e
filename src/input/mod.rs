use std::collections::HashMap;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

use crate::game::events::GameEvent;
use crate::input::commands::GameCommand;
use crate::map::direction::Direction;

pub mod commands;

/// Key to command bindings.
#[derive(Debug, Clone)]
pub struct Bindings {
    key_bindings: HashMap<(KeyCode, KeyModifiers), GameCommand>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut key_bindings = HashMap::new();

        // Player movement
        key_bindings.insert((KeyCode::Up, KeyModifiers::NONE), GameCommand::MovePlayer(Direction::Up));
        key_bindings.insert((KeyCode::Down, KeyModifiers::NONE), GameCommand::MovePlayer(Direction::Down));
        key_bindings.insert((KeyCode::Left, KeyModifiers::NONE), GameCommand::MovePlayer(Direction::Left));
        key_bindings.insert((KeyCode::Right, KeyModifiers::NONE), GameCommand::MovePlayer(Direction::Right));

        // Game actions
        key_bindings.insert((KeyCode::Char(' '), KeyModifiers::NONE), GameCommand::Confirm);
        key_bindings.insert((KeyCode::Char('m'), KeyModifiers::NONE), GameCommand::ToggleMute);
        key_bindings.insert((KeyCode::Char('q'), KeyModifiers::NONE), GameCommand::Exit);
        key_bindings.insert((KeyCode::Char('c'), KeyModifiers::CONTROL), GameCommand::Exit);

        Self { key_bindings }
    }
}

impl Bindings {
    /// The command bound to a key press, if any. Releases and repeats of other kinds are ignored.
    pub fn command_for(&self, key: &KeyEvent) -> Option<GameCommand> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        // Shift is irrelevant to every binding
        let modifiers = key.modifiers - KeyModifiers::SHIFT;
        self.key_bindings.get(&(key.code, modifiers)).copied()
    }
}

/// Reads terminal events until the receiving side goes away, forwarding bound key presses.
///
/// Blocks, so it runs on its own thread.
pub fn forward_input(bindings: Bindings, sender: UnboundedSender<GameEvent>) {
    loop {
        let event = match crossterm::event::read() {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Terminal input failed, stopping input");
                let _ = sender.send(GameCommand::Exit.into());
                return;
            }
        };

        let Event::Key(key) = event else {
            continue;
        };
        let Some(command) = bindings.command_for(&key) else {
            trace!(key = ?key.code, "Unbound key");
            continue;
        };

        debug!(?command, "Triggering command");
        if sender.send(command.into()).is_err() || command == GameCommand::Exit {
            return;
        }
    }
}
