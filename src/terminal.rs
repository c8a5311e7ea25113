use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{Mutex, mpsc};

mod core;
pub mod data;
pub mod message;

pub use data::{PROMPT, Row, Screen, UiEvent};

use crate::log::Log;
use message::Message;

/// The terminal actor: owns the real terminal, draws screen snapshots and
/// forwards key presses to the application.
///
/// The mock variant records every drawn screen so tests can assert on what
/// would have been displayed.
#[derive(Debug, Clone)]
pub enum Terminal {
    Actual(mpsc::Sender<Message>),
    Mock(Arc<Mutex<Vec<Screen>>>),
}

impl Terminal {
    /// Takes over the terminal and spawns the actor.
    ///
    /// # Arguments
    /// * `log` - Logging actor
    /// * `ui_events` - Sender on which key presses are forwarded
    pub fn spawn(log: Log, ui_events: mpsc::Sender<UiEvent>) -> Self {
        let (terminal, _) = core::Core::new(log, ui_events).spawn();
        terminal
    }

    /// Creates a mock terminal backed by the given screen log.
    pub fn mock(screens: Arc<Mutex<Vec<Screen>>>) -> Self {
        Self::Mock(screens)
    }

    /// Renders a full screen snapshot.
    pub async fn draw(&self, screen: Screen) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Draw { screen, tx })
                    .await
                    .context("Sending message to Terminal actor")
                    .expect("Terminal actor died");
                rx.await
                    .context("Awaiting response from Terminal actor")
                    .expect("Terminal actor died")
            }
            Self::Mock(screens) => {
                screens.lock().await.push(screen);
                Ok(())
            }
        }
    }

    /// Restores the terminal and stops the actor.
    pub async fn quit(&self) {
        if let Self::Actual(sender) = self {
            let (tx, rx) = tokio::sync::oneshot::channel();
            if sender.send(Message::Quit { tx }).await.is_ok() {
                let _ = rx.await;
            }
        }
    }
}
