use chrono::{TimeZone, Utc};

use crate::ArcStr;
use crate::app::ui::{FALLBACK, ProjectsView, Slot, Ui, UiState};
use crate::feed::{FeedResult, Project};
use crate::terminal::Row;

fn project(label: &str, url: &str) -> Project {
    Project {
        label: ArcStr::from(label),
        url: ArcStr::from(url),
    }
}

fn ok_result(projects: Vec<Project>) -> FeedResult {
    FeedResult {
        list: Some(projects),
        ts: Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap(),
        error: None,
    }
}

fn failed_result(message: &str) -> FeedResult {
    FeedResult {
        list: None,
        ts: Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap(),
        error: Some(message.into()),
    }
}

#[test]
fn reveal_is_idempotent_and_bounds_checked() {
    let mut state = UiState::default();
    state.reveal(2);
    state.reveal(2);
    state.reveal(99);

    assert_eq!(state.revealed, [false, false, true, false, false, false]);
}

#[test]
fn completing_a_slot_overrides_interleaved_mutation() {
    let mut state = UiState::default();
    state.begin_slot(Slot::Whoami);
    state.append_slot(Slot::Whoami, 'w');
    state.append_slot(Slot::Whoami, 'h');
    // Something else wipes the slot mid-animation.
    state.begin_slot(Slot::Whoami);
    state.complete_slot(Slot::Whoami, ArcStr::from("whoami"));

    assert_eq!(state.slots[0].text, "whoami");
    assert!(!state.slots[0].cursor);
}

#[test]
fn successful_load_updates_projects_and_stamp() {
    let mut state = UiState::default();
    state.set_refreshing(true);
    state.apply_feed(ok_result(vec![project("a", "https://a")]));

    assert_eq!(state.projects, ProjectsView::Rows(vec![project("a", "https://a")]));
    assert_eq!(
        state.updated_at.as_deref(),
        Some("last updated: 2026-08-30T12:00:00Z")
    );
    assert!(!state.refreshing);
    assert!(state.pulse_until.is_some());
}

#[test]
fn failed_load_shows_error_and_annotates_stamp() {
    let mut state = UiState::default();
    state.apply_feed(failed_result("HTTP 503"));

    assert_eq!(state.projects, ProjectsView::Errored(ArcStr::from("HTTP 503")));
    assert_eq!(
        state.updated_at.as_deref(),
        Some("last updated: 2026-08-30T12:00:00Z — fetch error")
    );
}

#[test]
fn screen_only_shows_revealed_lines() {
    let mut state = UiState::default();
    state.reveal(0);
    state.reveal(1);

    let screen = state.screen();
    assert_eq!(screen.rows.len(), 2);
    assert!(matches!(screen.rows[0], Row::Prompt { .. }));
    assert_eq!(screen.rows[1], Row::Output(ArcStr::from("guest")));
}

#[test]
fn screen_renders_links_in_input_order() {
    let mut state = UiState::default();
    for line in 0..6 {
        state.reveal(line);
    }
    state.apply_feed(ok_result(vec![
        project("first", "https://1"),
        project("second", "https://2"),
    ]));

    let rows = state.screen().rows;
    assert_eq!(
        rows[6],
        Row::Link {
            label: ArcStr::from("first"),
            url: ArcStr::from("https://1"),
        }
    );
    assert_eq!(
        rows[7],
        Row::Link {
            label: ArcStr::from("second"),
            url: ArcStr::from("https://2"),
        }
    );
}

#[test]
fn screen_renders_failure_as_message_plus_fallback() {
    let mut state = UiState::default();
    for line in 0..6 {
        state.reveal(line);
    }
    state.apply_feed(failed_result("request failed: boom"));

    let rows = state.screen().rows;
    assert_eq!(rows[6], Row::Notice(ArcStr::from("(request failed: boom)")));
    assert_eq!(rows[7], Row::Notice(ArcStr::from(FALLBACK)));
}

#[test]
fn screen_renders_empty_feed_as_fallback_only() {
    let mut state = UiState::default();
    for line in 0..6 {
        state.reveal(line);
    }
    state.apply_feed(ok_result(Vec::new()));

    let rows = state.screen().rows;
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[6], Row::Notice(ArcStr::from(FALLBACK)));
}

#[test]
fn final_cursor_appends_an_empty_prompt() {
    let mut state = UiState::default();
    state.set_final_cursor(true);

    let rows = state.screen().rows;
    assert_eq!(
        rows.last(),
        Some(&Row::Prompt {
            typed: ArcStr::from(""),
            cursor: true,
        })
    );
}

#[tokio::test]
async fn mock_applies_the_same_transitions() {
    let ui = Ui::mock();
    ui.reveal(0).await;
    ui.begin_slot(Slot::Whoami).await;
    ui.append_slot(Slot::Whoami, 'w').await;
    ui.complete_slot(Slot::Whoami, ArcStr::from("whoami")).await;
    ui.set_refreshing(true).await;
    ui.show_feed(ok_result(vec![project("a", "https://a")]))
        .await
        .unwrap();

    let state = ui.state().await;
    assert!(state.revealed[0]);
    assert_eq!(state.slots[0].text, "whoami");
    assert!(!state.refreshing);
    assert_eq!(state.projects, ProjectsView::Rows(vec![project("a", "https://a")]));
}
