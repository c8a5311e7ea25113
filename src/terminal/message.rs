use crate::terminal::data::Screen;

/// Messages that can be sent to the terminal actor.
#[derive(Debug)]
pub enum Message {
    /// Renders a full screen snapshot.
    Draw {
        screen: Screen,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<()>>,
    },
    /// Restores the terminal and stops the actor.
    Quit {
        tx: tokio::sync::oneshot::Sender<()>,
    },
}
