use crate::ArcStr;

/// Shell prompt shown in front of every command row.
pub const PROMPT: &str = "guest@termfolio:~$ ";

/// Key presses forwarded from the input thread to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Key(char),
    Esc,
    CtrlC,
}

/// One visible row of the fake shell session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// A command line: prompt, the text typed so far and an optional
    /// blinking cursor
    Prompt { typed: ArcStr, cursor: bool },
    /// Plain command output
    Output(ArcStr),
    /// A project link
    Link { label: ArcStr, url: ArcStr },
    /// A placeholder such as an error or the empty-feed fallback
    Notice(ArcStr),
}

/// A complete description of what the terminal should display. Pure data:
/// the UI actor builds it, the terminal actor draws it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    pub rows: Vec<Row>,
    /// Preformatted "last updated" stamp
    pub updated_at: Option<ArcStr>,
    /// A refresh is pending or in flight
    pub refreshing: bool,
    /// Brief brightness pulse after fresh content lands
    pub pulse: bool,
}
