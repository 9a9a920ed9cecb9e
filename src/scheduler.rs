//! Timer tasks feeding the game loop.
//!
//! Every timer is a Tokio task that sleeps, then enqueues one event. Timers belong to the session
//! they were armed in and are cancelled together when the next session begins.

use std::time::Duration;

use tokio::sync::{mpsc::UnboundedSender, watch};
use tracing::{debug, trace};

use crate::game::events::{GameEvent, SessionId, TimerEvent};

/// Cancellation shared by every timer of one session.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Completes once the session is cancelled, or once its owner is gone.
    pub async fn cancelled(&mut self) {
        let _ = self.receiver.wait_for(|cancelled| *cancelled).await;
    }
}

#[derive(Debug)]
struct Session {
    id: SessionId,
    cancel: watch::Sender<bool>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        let (cancel, _) = watch::channel(false);
        Self { id, cancel }
    }

    fn token(&self) -> CancellationToken {
        CancellationToken {
            receiver: self.cancel.subscribe(),
        }
    }

    fn cancel(&self) {
        self.cancel.send_replace(true);
    }
}

/// Arms timers for the current session.
pub struct Scheduler {
    sender: UnboundedSender<GameEvent>,
    session: Option<Session>,
}

impl Scheduler {
    pub fn new(sender: UnboundedSender<GameEvent>) -> Self {
        Self { sender, session: None }
    }

    /// Cancels every timer of the previous session and opens `id`.
    pub fn begin_session(&mut self, id: SessionId) {
        if let Some(previous) = self.session.replace(Session::new(id)) {
            debug!(previous = previous.id, next = id, "Cancelling previous session timers");
            previous.cancel();
        }
    }

    /// Token of the current session, if one is open.
    pub fn token(&self) -> Option<CancellationToken> {
        self.session.as_ref().map(Session::token)
    }

    /// Delivers `event` after `after`, unless its session is cancelled first.
    ///
    /// Events armed for any session other than the current one are dropped right away.
    pub fn schedule(&self, event: TimerEvent, after: Duration) {
        let Some(session) = self.session.as_ref().filter(|session| session.id == event.session) else {
            trace!(timer = ?event.timer, session = event.session, "Not arming timer of an inactive session");
            return;
        };

        let mut token = session.token();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let elapsed = tokio::select! {
                _ = tokio::time::sleep(after) => true,
                _ = token.cancelled() => false,
            };

            if !elapsed || token.is_cancelled() {
                trace!(timer = ?event.timer, session = event.session, "Timer cancelled");
                return;
            }
            // The loop may already be gone
            let _ = sender.send(event.into());
        });
    }

    /// Cancels the current session's timers without opening a new one.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel();
        }
    }
}
