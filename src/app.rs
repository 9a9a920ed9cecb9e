//! The game loop: one task owns the [`Game`] and applies every event in arrival order.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::audio::Audio;
use crate::error::{GameError, GameResult};
use crate::formatter::{increment_event_count, set_session};
use crate::game::events::{Effect, GameEvent};
use crate::game::Game;
use crate::input::{forward_input, Bindings};
use crate::persistence::SessionStore;
use crate::render::Renderer;
use crate::scheduler::Scheduler;

pub struct App<S> {
    game: Game,
    audio: Audio,
    store: S,
    scheduler: Scheduler,
    sender: UnboundedSender<GameEvent>,
    receiver: UnboundedReceiver<GameEvent>,
    renderer: Option<Renderer>,
}

impl<S: SessionStore> App<S> {
    /// Creates a loop without a screen. Events only arrive through [`App::sender`] and timers.
    pub fn new(game: Game, audio: Audio, store: S) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            game,
            audio,
            store,
            scheduler: Scheduler::new(sender.clone()),
            sender,
            receiver,
            renderer: None,
        }
    }

    /// Draws a frame after every handled event.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// A handle for feeding events into the loop.
    pub fn sender(&self) -> UnboundedSender<GameEvent> {
        self.sender.clone()
    }

    /// Starts reading terminal keys on a dedicated thread.
    pub fn spawn_input(&self, bindings: Bindings) -> std::io::Result<std::thread::JoinHandle<()>> {
        let sender = self.sender();
        std::thread::Builder::new()
            .name("input".to_string())
            .spawn(move || forward_input(bindings, sender))
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs until the game asks to quit.
    pub async fn run(&mut self) -> GameResult<()> {
        info!(audio_disabled = self.audio.is_disabled(), "Starting game loop");
        self.audio.set_mute(self.game.is_muted());
        let effects = self.game.start();
        let mut running = self.apply(effects);
        self.draw()?;

        while running {
            let Some(event) = self.receiver.recv().await else {
                warn!("Event channel closed");
                break;
            };
            increment_event_count();

            let effects = self.game.handle(event);
            self.audio.set_mute(self.game.is_muted());
            running = self.apply(effects);
            if running {
                self.draw()?;
            }
        }

        self.scheduler.cancel();
        self.audio.stop();
        info!(stage = ?self.game.stage(), "Game loop stopped");
        Ok(())
    }

    /// Carries out the effects in order. Returns `false` once the game asked to quit.
    fn apply(&mut self, effects: Vec<Effect>) -> bool {
        let mut running = true;
        for effect in effects {
            match effect {
                Effect::SessionStarted(id) => {
                    set_session(id);
                    self.scheduler.begin_session(id);
                }
                Effect::Schedule { event, after } => self.scheduler.schedule(event, after),
                Effect::Play(sound) => self.audio.play(sound),
                Effect::StopSound => self.audio.stop(),
                Effect::Persist(record) => {
                    if let Err(e) = self.store.save(&record) {
                        warn!(error = %e, "Could not save the session");
                    }
                }
                Effect::Quit => {
                    debug!("Quit requested");
                    running = false;
                }
            }
        }
        running
    }

    fn draw(&mut self) -> GameResult<()> {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer
                .draw(&self.game.snapshot())
                .map_err(|e| GameError::Terminal(e.to_string()))?;
        }
        Ok(())
    }
}
