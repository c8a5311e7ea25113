use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use ratatui::Frame;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Paragraph};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Terminal;
use super::data::{PROMPT, Row, Screen, UiEvent};
use super::message::Message;
use crate::log::Log;

const SCOPE: &str = "terminal";

/// Blink period of the cursor markers, in milliseconds.
const BLINK_MS: u128 = 530;

/// Core implementation of the terminal actor that owns the ratatui
/// terminal and the crossterm input thread.
pub struct Core {
    log: Log,
    ui_events: mpsc::Sender<UiEvent>,
}

impl Core {
    /// Creates a new terminal core.
    ///
    /// # Arguments
    /// * `log` - Logging actor
    /// * `ui_events` - Channel sender for forwarding key presses to the
    ///   application
    pub fn new(log: Log, ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { log, ui_events }
    }

    /// Spawns the terminal actor and returns the public interface and join
    /// handle.
    ///
    /// Takes over the terminal (raw mode, alternate screen) and starts a
    /// dedicated thread for blocking event reads; the actor itself stays a
    /// tokio task.
    pub fn spawn(self) -> (Terminal, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Message>(crate::BUFFER_SIZE);

        let handle = tokio::spawn(async move {
            let mut terminal = ratatui::init();

            let events = self.ui_events.clone();
            thread::spawn(move || input_loop(events));

            self.log.info(SCOPE, "terminal actor started");

            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Draw { screen, tx } => {
                        let res = terminal
                            .draw(|frame| render(frame, &screen))
                            .map(|_| ())
                            .map_err(anyhow::Error::from);
                        let _ = tx.send(res);
                    }
                    Message::Quit { tx } => {
                        ratatui::restore();
                        let _ = tx.send(());
                        break;
                    }
                }
            }
        });

        (Terminal::Actual(tx), handle)
    }
}

/// Blocking crossterm read loop; key presses are forwarded to the
/// application and silently dropped when the channel is full or closed.
fn input_loop(events: mpsc::Sender<UiEvent>) {
    loop {
        let Ok(event) = event::read() else {
            break;
        };
        let Event::Key(key) = event else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let ev = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => UiEvent::CtrlC,
            KeyCode::Char(c) => UiEvent::Key(c),
            KeyCode::Esc => UiEvent::Esc,
            _ => continue,
        };
        let _ = events.try_send(ev);
    }
}

/// Draws a screen snapshot: the session rows, an optional updated-at stamp
/// and a key-hint footer, with the viewport pinned to the bottom of the
/// content.
fn render(frame: &mut Frame, screen: &Screen) {
    let blink_on = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_millis() / BLINK_MS) % 2 == 0)
        .unwrap_or(true);

    let mut lines: Vec<Line> = screen.rows.iter().map(|row| row_line(row, blink_on)).collect();
    if let Some(updated) = &screen.updated_at {
        lines.push(Line::default());
        lines.push(Line::styled(
            updated.to_string(),
            Style::new().fg(Color::DarkGray),
        ));
    }

    let footer = if screen.refreshing {
        " [r] refresh  [q] quit  ~  refreshing... "
    } else {
        " [r] refresh  [q] quit "
    };
    let block = Block::bordered()
        .title(" guest@termfolio ")
        .title_bottom(Line::styled(footer, Style::new().fg(Color::DarkGray)));

    let inner = block.inner(frame.area());
    let scroll = lines.len().saturating_sub(inner.height as usize) as u16;

    let style = if screen.pulse {
        // Brightness pulse right after fresh content lands.
        Style::new().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .style(style)
        .block(block)
        .scroll((scroll, 0));
    frame.render_widget(paragraph, frame.area());
}

fn row_line(row: &Row, blink_on: bool) -> Line<'static> {
    match row {
        Row::Prompt { typed, cursor } => {
            let mut spans = vec![
                Span::styled(PROMPT, Style::new().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::raw(typed.to_string()),
            ];
            if *cursor && blink_on {
                spans.push(Span::styled("█", Style::new().fg(Color::Green)));
            }
            Line::from(spans)
        }
        Row::Output(text) => Line::raw(text.to_string()),
        Row::Link { label, url } => Line::from(vec![
            Span::raw("  "),
            Span::styled(
                label.to_string(),
                Style::new().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
            ),
            Span::raw("  "),
            Span::styled(url.to_string(), Style::new().fg(Color::DarkGray)),
        ]),
        Row::Notice(text) => Line::styled(
            text.to_string(),
            Style::new().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    }
}
