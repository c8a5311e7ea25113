use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::data::UiState;
use super::message::Message;
use crate::log::Log;
use crate::terminal::Terminal;

const SCOPE: &str = "app.ui";

/// Core implementation of the UI actor.
///
/// Owns the [`UiState`] and pushes a fresh screen snapshot to the terminal
/// actor after every mutation. State transitions themselves live on
/// [`UiState`] so the mock shares them.
pub struct Core {
    /// UI state
    state: UiState,
    /// Logging actor
    log: Log,
    /// Terminal actor for rendering
    terminal: Terminal,
}

impl Core {
    /// Creates a new UI actor core.
    pub fn new(log: Log, terminal: Terminal) -> Self {
        Self {
            state: UiState::default(),
            log,
            terminal,
        }
    }

    /// Spawns the UI actor.
    pub fn spawn(self) -> (super::Ui, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            let mut core = self;
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Reveal { line } => {
                        core.state.reveal(line);
                        core.draw_logged().await;
                    }
                    Message::BeginSlot { slot } => {
                        core.state.begin_slot(slot);
                        core.draw_logged().await;
                    }
                    Message::AppendSlot { slot, ch } => {
                        core.state.append_slot(slot, ch);
                        core.draw_logged().await;
                    }
                    Message::CompleteSlot { slot, text } => {
                        core.state.complete_slot(slot, text);
                        core.draw_logged().await;
                    }
                    Message::SetRefreshing { on } => {
                        core.state.set_refreshing(on);
                        core.draw_logged().await;
                    }
                    Message::ShowFeed { result, tx } => {
                        core.state.apply_feed(result);
                        let _ = tx.send(core.draw().await);
                    }
                    Message::ShowLoadError => {
                        core.state.apply_load_error();
                        core.draw_logged().await;
                    }
                    Message::SetFinalCursor { on } => {
                        core.state.set_final_cursor(on);
                        core.draw_logged().await;
                    }
                    Message::Redraw => {
                        core.draw_logged().await;
                    }
                    Message::GetState { tx } => {
                        let _ = tx.send(core.state.clone());
                    }
                }
            }
        });
        (super::Ui::Actual(tx), handle)
    }

    async fn draw(&self) -> anyhow::Result<()> {
        self.terminal.draw(self.state.screen()).await
    }

    async fn draw_logged(&self) {
        if let Err(err) = self.draw().await {
            self.log.error(SCOPE, format!("drawing failed: {err:#}"));
        }
    }
}
