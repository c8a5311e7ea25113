use std::time::Duration;

use crate::ArcStr;

use super::ui::{Slot, Ui};

/// One step of the scripted intro animation.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Reveal a session line
    Reveal(usize),
    /// Type a command into a slot, one character per interval
    Type { slot: Slot, text: &'static str },
}

/// The fixed session script: reveal each line just before its command is
/// typed, with the command outputs appearing in between.
pub fn script() -> [Step; 9] {
    [
        Step::Reveal(0),
        Step::Type {
            slot: Slot::Whoami,
            text: "whoami",
        },
        Step::Reveal(1),
        Step::Reveal(2),
        Step::Type {
            slot: Slot::Echo,
            text: "echo \"Great to see you here, man\"",
        },
        Step::Reveal(3),
        Step::Reveal(4),
        Step::Type {
            slot: Slot::Ls,
            text: "ls",
        },
        Step::Reveal(5),
    ]
}

/// Plays the script to completion, awaiting each step in order. Strictly
/// linear; there is no cancellation.
pub async fn play(ui: &Ui, interval: Duration) {
    for step in script() {
        match step {
            Step::Reveal(line) => ui.reveal(line).await,
            Step::Type { slot, text } => type_text(ui, slot, text, interval).await,
        }
    }
}

/// Types `text` into a slot one character at a time, then completes the
/// slot with the full text so the final content is exact.
async fn type_text(ui: &Ui, slot: Slot, text: &str, interval: Duration) {
    ui.begin_slot(slot).await;
    for ch in text.chars() {
        ui.append_slot(slot, ch).await;
        tokio::time::sleep(interval).await;
    }
    ui.complete_slot(slot, ArcStr::from(text)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_interval_typing_still_appends_every_character() {
        let ui = Ui::mock();
        type_text(&ui, Slot::Whoami, "whoami", Duration::ZERO).await;

        let state = ui.state().await;
        assert_eq!(state.slots[0].text, "whoami");
        assert!(!state.slots[0].cursor);
    }

    #[tokio::test]
    async fn playing_the_script_reveals_and_types_everything() {
        let ui = Ui::mock();
        play(&ui, Duration::ZERO).await;

        let state = ui.state().await;
        assert!(state.revealed.iter().all(|revealed| *revealed));
        assert_eq!(state.slots[0].text, "whoami");
        assert_eq!(state.slots[1].text, "echo \"Great to see you here, man\"");
        assert_eq!(state.slots[2].text, "ls");
        assert!(state.slots.iter().all(|slot| !slot.cursor));
    }

    #[tokio::test(start_paused = true)]
    async fn typing_is_paced_by_the_interval() {
        let ui = Ui::mock();
        let start = tokio::time::Instant::now();
        type_text(&ui, Slot::Ls, "ls", Duration::from_millis(80)).await;

        // One suspension per character.
        assert_eq!(start.elapsed(), Duration::from_millis(160));
        assert_eq!(ui.state().await.slots[2].text, "ls");
    }
}
