use crate::ArcStr;
use crate::feed::FeedResult;

use super::data::{Slot, UiState};

/// Messages that can be sent to the UI actor.
#[derive(Debug)]
pub enum Message {
    Reveal {
        line: usize,
    },
    BeginSlot {
        slot: Slot,
    },
    AppendSlot {
        slot: Slot,
        ch: char,
    },
    CompleteSlot {
        slot: Slot,
        text: ArcStr,
    },
    SetRefreshing {
        on: bool,
    },
    /// Applies a load outcome and redraws; the reply carries any failure of
    /// the draw so the caller can fall back to the generic error display.
    ShowFeed {
        result: FeedResult,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<()>>,
    },
    ShowLoadError,
    SetFinalCursor {
        on: bool,
    },
    /// Re-pushes the current snapshot; drives cursor blink and pulse decay.
    Redraw,
    GetState {
        tx: tokio::sync::oneshot::Sender<UiState>,
    },
}
