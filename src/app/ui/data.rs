use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::time::Instant;

use crate::ArcStr;
use crate::feed::{FeedResult, Project};
use crate::terminal::{Row, Screen};

/// Number of scripted lines in the fake shell session.
pub const SCRIPT_LINES: usize = 6;

/// Placeholder shown when the feed has no entries to display.
pub const FALLBACK: &str = "no projects yet — check back soon";

/// Placeholder for the catch-all failure path of a load.
pub const GENERIC_LOAD_ERROR: &str = "an error occurred while loading projects";

/// How long the brightness pulse lasts after fresh content lands.
pub const PULSE: Duration = Duration::from_millis(180);

const WHOAMI_OUTPUT: &str = "guest";
const ECHO_OUTPUT: &str = "Great to see you here, man";
const LS_OUTPUT: &str = "projects/";

/// The three command-line targets of the typing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Whoami,
    Echo,
    Ls,
}

impl Slot {
    pub(crate) fn index(self) -> usize {
        match self {
            Slot::Whoami => 0,
            Slot::Echo => 1,
            Slot::Ls => 2,
        }
    }
}

/// Text typed into a command line so far, plus its cursor marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotState {
    pub text: String,
    pub cursor: bool,
}

/// What the projects section currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectsView {
    /// The initial load has not completed yet
    Pending,
    /// A fetched list; an empty one renders the fallback notice
    Rows(Vec<Project>),
    /// A failed load, rendered as a short message plus the fallback
    Errored(ArcStr),
}

/// The full UI state. All transitions live here so the actor core and the
/// test mock share one implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub revealed: [bool; SCRIPT_LINES],
    pub slots: [SlotState; 3],
    pub projects: ProjectsView,
    pub updated_at: Option<ArcStr>,
    pub refreshing: bool,
    pub pulse_until: Option<Instant>,
    pub final_cursor: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            revealed: [false; SCRIPT_LINES],
            slots: Default::default(),
            projects: ProjectsView::Pending,
            updated_at: None,
            refreshing: false,
            pulse_until: None,
            final_cursor: false,
        }
    }
}

impl UiState {
    /// One-way flip of a script line's revealed marker. Idempotent;
    /// out-of-range lines are ignored.
    pub fn reveal(&mut self, line: usize) {
        if let Some(flag) = self.revealed.get_mut(line) {
            *flag = true;
        }
    }

    /// Clears a slot and shows its cursor, ready for typing.
    pub fn begin_slot(&mut self, slot: Slot) {
        let slot = &mut self.slots[slot.index()];
        slot.text.clear();
        slot.cursor = true;
    }

    /// Appends one typed character in front of the cursor.
    pub fn append_slot(&mut self, slot: Slot, ch: char) {
        self.slots[slot.index()].text.push(ch);
    }

    /// Ends the animation for a slot: hides the cursor and replaces the
    /// content with the full text wholesale, so the final state is exact no
    /// matter what happened to the slot mid-animation.
    pub fn complete_slot(&mut self, slot: Slot, text: ArcStr) {
        let slot = &mut self.slots[slot.index()];
        slot.text = text.to_string();
        slot.cursor = false;
    }

    pub fn set_refreshing(&mut self, on: bool) {
        self.refreshing = on;
    }

    pub fn set_final_cursor(&mut self, on: bool) {
        self.final_cursor = on;
    }

    /// Applies a load outcome: swaps the projects section, stamps the
    /// update time (annotated on failure), clears the refreshing marker and
    /// starts the brightness pulse.
    pub fn apply_feed(&mut self, result: FeedResult) {
        match result.list {
            None => {
                let message = result
                    .error
                    .unwrap_or_else(|| "could not load the project feed".into());
                self.projects = ProjectsView::Errored(ArcStr::from(message.as_str()));
                self.updated_at = Some(format_updated(&result.ts, Some("fetch error")));
            }
            Some(list) => {
                self.projects = ProjectsView::Rows(list);
                self.updated_at = Some(format_updated(&result.ts, None));
            }
        }
        self.refreshing = false;
        self.pulse_until = Some(Instant::now() + PULSE);
    }

    /// Catch-all for failures while updating the display itself.
    pub fn apply_load_error(&mut self) {
        self.projects = ProjectsView::Errored(ArcStr::from(GENERIC_LOAD_ERROR));
        self.refreshing = false;
    }

    /// Builds the render snapshot: revealed session lines, the projects
    /// section once `ls` has run, and the trailing prompt cursor.
    pub fn screen(&self) -> Screen {
        let mut rows = Vec::new();
        for line in 0..SCRIPT_LINES {
            if !self.revealed[line] {
                continue;
            }
            rows.push(match line {
                0 => self.prompt_row(Slot::Whoami),
                1 => Row::Output(ArcStr::from(WHOAMI_OUTPUT)),
                2 => self.prompt_row(Slot::Echo),
                3 => Row::Output(ArcStr::from(ECHO_OUTPUT)),
                4 => self.prompt_row(Slot::Ls),
                _ => Row::Output(ArcStr::from(LS_OUTPUT)),
            });
        }

        if self.revealed[SCRIPT_LINES - 1] {
            match &self.projects {
                ProjectsView::Pending => {}
                ProjectsView::Rows(list) if list.is_empty() => {
                    rows.push(Row::Notice(ArcStr::from(FALLBACK)));
                }
                ProjectsView::Rows(list) => {
                    rows.extend(list.iter().map(|project| Row::Link {
                        label: project.label.clone(),
                        url: project.url.clone(),
                    }));
                }
                ProjectsView::Errored(message) => {
                    rows.push(Row::Notice(ArcStr::from(format!("({message})").as_str())));
                    rows.push(Row::Notice(ArcStr::from(FALLBACK)));
                }
            }
        }

        if self.final_cursor {
            rows.push(Row::Prompt {
                typed: ArcStr::from(""),
                cursor: true,
            });
        }

        Screen {
            rows,
            updated_at: self.updated_at.clone(),
            refreshing: self.refreshing,
            pulse: self
                .pulse_until
                .is_some_and(|until| Instant::now() < until),
        }
    }

    fn prompt_row(&self, slot: Slot) -> Row {
        let state = &self.slots[slot.index()];
        Row::Prompt {
            typed: ArcStr::from(state.text.as_str()),
            cursor: state.cursor,
        }
    }
}

fn format_updated(ts: &DateTime<Utc>, note: Option<&str>) -> ArcStr {
    let mut text = format!(
        "last updated: {}",
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    if let Some(note) = note {
        text.push_str(" — ");
        text.push_str(note);
    }
    ArcStr::from(text.as_str())
}
