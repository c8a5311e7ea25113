use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;

mod core;
pub mod data;
pub mod message;

#[cfg(test)]
mod tests;

pub use data::{FALLBACK, GENERIC_LOAD_ERROR, ProjectsView, Slot, UiState};
pub use message::Message;

use crate::ArcStr;
use crate::feed::FeedResult;
use crate::log::Log;
use crate::terminal::Terminal;

/// The UI actor: single owner of the display state.
///
/// The mock variant applies the same state transitions to a shared
/// [`UiState`] without a terminal, so sequencer and application tests can
/// observe exactly what would have been rendered.
#[derive(Debug, Clone)]
pub enum Ui {
    Actual(tokio::sync::mpsc::Sender<Message>),
    Mock(Arc<Mutex<UiState>>),
}

impl Ui {
    /// Spawns the UI actor.
    pub fn spawn(log: Log, terminal: Terminal) -> Self {
        let (ui, _) = core::Core::new(log, terminal).spawn();
        ui
    }

    /// Creates a mock UI with default state.
    pub fn mock() -> Self {
        Self::Mock(Arc::new(Mutex::new(UiState::default())))
    }

    /// Reveals a script line. Idempotent.
    pub async fn reveal(&self, line: usize) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::Reveal { line })
                    .await
                    .expect("Ui actor died");
            }
            Self::Mock(state) => state.lock().await.reveal(line),
        }
    }

    /// Clears a slot and shows its typing cursor.
    pub async fn begin_slot(&self, slot: Slot) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::BeginSlot { slot })
                    .await
                    .expect("Ui actor died");
            }
            Self::Mock(state) => state.lock().await.begin_slot(slot),
        }
    }

    /// Appends one typed character to a slot.
    pub async fn append_slot(&self, slot: Slot, ch: char) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::AppendSlot { slot, ch })
                    .await
                    .expect("Ui actor died");
            }
            Self::Mock(state) => state.lock().await.append_slot(slot, ch),
        }
    }

    /// Finishes a slot's animation with its exact final text.
    pub async fn complete_slot(&self, slot: Slot, text: ArcStr) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::CompleteSlot { slot, text })
                    .await
                    .expect("Ui actor died");
            }
            Self::Mock(state) => state.lock().await.complete_slot(slot, text),
        }
    }

    /// Toggles the transient refreshing marker.
    pub async fn set_refreshing(&self, on: bool) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::SetRefreshing { on })
                    .await
                    .expect("Ui actor died");
            }
            Self::Mock(state) => state.lock().await.set_refreshing(on),
        }
    }

    /// Applies a load outcome to the display.
    ///
    /// # Errors
    /// Returns an error when the redraw itself fails; the caller is
    /// expected to fall back to [`Ui::show_load_error`].
    pub async fn show_feed(&self, result: FeedResult) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::ShowFeed { result, tx })
                    .await
                    .context("Sending message to Ui actor")
                    .expect("Ui actor died");
                rx.await
                    .context("Awaiting response from Ui actor")
                    .expect("Ui actor died")
            }
            Self::Mock(state) => {
                state.lock().await.apply_feed(result);
                Ok(())
            }
        }
    }

    /// Replaces the projects section with a generic error placeholder.
    pub async fn show_load_error(&self) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::ShowLoadError)
                    .await
                    .expect("Ui actor died");
            }
            Self::Mock(state) => state.lock().await.apply_load_error(),
        }
    }

    /// Enables the trailing blinking prompt cursor.
    pub async fn set_final_cursor(&self, on: bool) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::SetFinalCursor { on })
                    .await
                    .expect("Ui actor died");
            }
            Self::Mock(state) => state.lock().await.set_final_cursor(on),
        }
    }

    /// Re-pushes the current snapshot to the terminal.
    pub async fn redraw(&self) {
        match self {
            Self::Actual(sender) => {
                sender.send(Message::Redraw).await.expect("Ui actor died");
            }
            Self::Mock(_) => {}
        }
    }

    /// Snapshot of the current state, mainly for tests.
    pub async fn state(&self) -> UiState {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetState { tx })
                    .await
                    .expect("Ui actor died");
                rx.await.expect("Ui actor died")
            }
            Self::Mock(state) => state.lock().await.clone(),
        }
    }
}
