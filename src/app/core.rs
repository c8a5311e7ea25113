use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::debounce::Debouncer;
use super::sequencer;
use super::ui::Ui;
use crate::feed::Feed;
use crate::log::Log;
use crate::terminal::{Terminal, UiEvent};

const SCOPE: &str = "app";

/// How often the screen is re-pushed to drive cursor blink and pulse decay.
const REDRAW_TICK: Duration = Duration::from_millis(125);

/// Internal commands produced by input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
}

/// The application: wires the sequencer, the feed and the UI together and
/// runs the main event loop.
pub struct App {
    log: Log,
    ui: Ui,
    feed: Feed,
    terminal: Terminal,
    events: mpsc::Receiver<UiEvent>,
    typing_interval: Duration,
    debounce: Duration,
}

impl App {
    /// Creates the application.
    ///
    /// # Arguments
    /// * `log` - Logging actor
    /// * `ui` - UI actor owning the display state
    /// * `feed` - Feed actor serving the project list
    /// * `terminal` - Terminal actor, quit on shutdown
    /// * `events` - Key presses forwarded by the terminal actor
    /// * `typing_interval` - Delay between typed characters
    /// * `debounce` - Quiet period collapsing rapid refresh triggers
    pub fn new(
        log: Log,
        ui: Ui,
        feed: Feed,
        terminal: Terminal,
        events: mpsc::Receiver<UiEvent>,
        typing_interval: Duration,
        debounce: Duration,
    ) -> Self {
        Self {
            log,
            ui,
            feed,
            terminal,
            events,
            typing_interval,
            debounce,
        }
    }

    /// Runs the application to completion.
    ///
    /// The intro sequence is strictly serialized: the typing script plays
    /// to the end, then the initial load happens, then the event loop
    /// starts. A manual refresh only re-runs the load, never the script.
    pub async fn run(self) -> anyhow::Result<()> {
        let App {
            log,
            ui,
            feed,
            terminal,
            mut events,
            typing_interval,
            debounce,
        } = self;

        sequencer::play(&ui, typing_interval).await;
        load(&ui, &feed, &log).await;
        ui.set_final_cursor(true).await;
        log.info(SCOPE, "intro finished, entering event loop");

        let (command_tx, mut commands) = mpsc::channel(crate::BUFFER_SIZE);
        let mut debouncer = Debouncer::new(debounce, command_tx);
        let mut ticker = tokio::time::interval(REDRAW_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(UiEvent::Key(key)) if key.eq_ignore_ascii_case(&'r') => {
                        debouncer.trigger(Command::Refresh);
                    }
                    Some(UiEvent::Key('q')) | Some(UiEvent::Esc) | Some(UiEvent::CtrlC) => break,
                    Some(_) => {}
                    None => break,
                },
                command = commands.recv() => {
                    if let Some(Command::Refresh) = command {
                        refresh(&ui, &feed, &log).await;
                    }
                }
                _ = ticker.tick() => ui.redraw().await,
            }
        }

        log.info(SCOPE, "shutting down");
        terminal.quit().await;
        Ok(())
    }
}

/// The manual refresh path: mark the display, drop the cache, reload.
async fn refresh(ui: &Ui, feed: &Feed, log: &Log) {
    ui.set_refreshing(true).await;
    feed.invalidate().await;
    load(ui, feed, log).await;
}

/// Fetches the feed and updates the display. A failure while updating is
/// swallowed into a generic placeholder; nothing here can take the
/// application down.
async fn load(ui: &Ui, feed: &Feed, log: &Log) {
    let result = feed.fetch().await;
    if let Err(err) = ui.show_feed(result).await {
        log.error(SCOPE, format!("updating the project display failed: {err:#}"));
        ui.show_load_error().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use tokio::sync::Mutex;

    use super::*;
    use crate::ArcStr;
    use crate::app::ui::ProjectsView;
    use crate::feed::{FeedResult, Project};

    fn sample_result() -> FeedResult {
        FeedResult {
            list: Some(vec![Project {
                label: ArcStr::from("termfolio"),
                url: ArcStr::from("https://example.com/termfolio"),
            }]),
            ts: Utc::now(),
            error: None,
        }
    }

    fn app_under_test(
        ui: &Ui,
        feed: &Feed,
        events: mpsc::Receiver<UiEvent>,
    ) -> App {
        App::new(
            Log::mock(),
            ui.clone(),
            feed.clone(),
            Terminal::mock(Arc::new(Mutex::new(Vec::new()))),
            events,
            Duration::ZERO,
            Duration::from_millis(300),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn startup_plays_the_script_then_loads_once() {
        let ui = Ui::mock();
        let feed = Feed::mock(sample_result());
        let (events_tx, events_rx) = mpsc::channel(8);
        let app = app_under_test(&ui, &feed, events_rx);
        drop(events_tx);

        app.run().await.unwrap();

        let state = ui.state().await;
        assert!(state.revealed.iter().all(|revealed| *revealed));
        assert_eq!(state.slots[0].text, "whoami");
        assert!(state.final_cursor);
        assert!(matches!(state.projects, ProjectsView::Rows(_)));

        let Feed::Mock(data) = &feed else { unreachable!() };
        let data = data.lock().await;
        assert_eq!(data.fetches, 1);
        assert_eq!(data.invalidations, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_refresh_presses_collapse_into_one_load() {
        let ui = Ui::mock();
        let feed = Feed::mock(sample_result());
        let (events_tx, events_rx) = mpsc::channel(8);
        let app = app_under_test(&ui, &feed, events_rx);
        let run = tokio::spawn(app.run());

        for _ in 0..3 {
            events_tx.send(UiEvent::Key('r')).await.unwrap();
        }
        // Let the quiet period elapse and the refresh complete.
        tokio::time::sleep(Duration::from_secs(1)).await;
        events_tx.send(UiEvent::Key('q')).await.unwrap();
        run.await.unwrap().unwrap();

        let Feed::Mock(data) = &feed else { unreachable!() };
        let data = data.lock().await;
        // One initial load plus exactly one debounced refresh.
        assert_eq!(data.fetches, 2);
        assert_eq!(data.invalidations, 1);
        assert!(!ui.state().await.refreshing);
    }

    #[tokio::test(start_paused = true)]
    async fn escape_quits_without_refreshing() {
        let ui = Ui::mock();
        let feed = Feed::mock(sample_result());
        let (events_tx, events_rx) = mpsc::channel(8);
        let app = app_under_test(&ui, &feed, events_rx);
        let run = tokio::spawn(app.run());

        events_tx.send(UiEvent::Esc).await.unwrap();
        run.await.unwrap().unwrap();

        let Feed::Mock(data) = &feed else { unreachable!() };
        assert_eq!(data.lock().await.fetches, 1);
    }
}
