use std::{fmt::Display, str::FromStr, sync::Arc};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc::Sender, task::JoinHandle};

use crate::{ArcPath, ArcStr, fs::Fs};

/// Describes the log level of a message.
///
/// The levels are ordered by severity: `Info` < `Warning` < `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum LogLevel {
    #[default]
    /// The lowest level, dedicated to regular information that is not critical.
    Info,
    /// Mid level, used to indicate when something went wrong but it's not
    /// critical.
    Warning,
    /// The highest level, used for errors that require attention but are not
    /// severe enough to crash the program.
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow::anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// A single entry handled by the logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    level: LogLevel,
    scope: ArcStr,
    message: String,
}

impl Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.scope, self.message)
    }
}

/// The core of the logging system.
///
/// Writes timestamped lines through the [`Fs`] actor to both a per-run log
/// file and a `latest.log`, and buffers messages at or above the configured
/// print level so they can be flushed to stderr once the TUI has released
/// the screen.
#[derive(Debug)]
pub struct LogCore {
    /// Filesystem interface for file operations
    fs: Fs,
    /// Path to the current per-run log file
    log_path: ArcPath,
    /// Path to the "latest" log file
    latest_path: ArcPath,
    /// Messages waiting to be printed to stderr on flush
    logs_to_print: Vec<LogMessage>,
    /// Minimum level of messages to be printed to stderr
    print_level: LogLevel,
}

impl LogCore {
    /// Creates a new logger instance.
    ///
    /// # Arguments
    /// * `fs` - Filesystem interface for file operations
    /// * `level` - Minimum log level for messages to be printed to stderr
    /// * `max_age` - Maximum age of log files in days before they are deleted
    /// * `log_dir` - Directory where log files will be stored
    ///
    /// # Errors
    /// Returns an error if the log directory cannot be created or the latest
    /// log file cannot be reset.
    pub async fn build(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        fs.create_dir_all(log_dir.clone())
            .await
            .context("Creating the log directory")?;

        let log_path = ArcPath::from(
            log_dir
                .join(format!(
                    "termfolio_{}.log",
                    chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S")
                ))
                .as_path(),
        );
        let latest_path = ArcPath::from(log_dir.join("latest.log").as_path());

        fs.write(latest_path.clone(), String::new())
            .await
            .context("Resetting the latest log file")?;

        Self::prune_old_logs(&fs, &log_dir, max_age).await;

        Ok(Self {
            fs,
            log_path,
            latest_path,
            logs_to_print: Vec::new(),
            print_level: level,
        })
    }

    /// Transforms the logging core into an actor.
    pub fn spawn(self) -> (Log, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            let mut core = self;
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Record(entry) => core.record(entry).await,
                    Message::Flush(tx) => {
                        core.flush();
                        let _ = tx.send(());
                    }
                }
            }
        });
        (Log::Actual(tx), handle)
    }

    /// Appends an entry to both log files and buffers it for stderr when it
    /// meets the print level.
    async fn record(&mut self, entry: LogMessage) {
        let line = format!(
            "[{}] {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            entry
        );
        // Logging must never take the application down.
        let _ = self
            .fs
            .append_line(self.log_path.clone(), line.clone())
            .await;
        let _ = self.fs.append_line(self.latest_path.clone(), line).await;

        if entry.level >= self.print_level {
            self.logs_to_print.push(entry);
        }
    }

    /// Prints the buffered messages to stderr and clears the buffer.
    fn flush(&mut self) {
        for entry in self.logs_to_print.drain(..) {
            eprintln!("{}", entry);
        }
    }

    /// Deletes per-run log files older than `max_age` days. Failures are
    /// ignored: stale logs are an annoyance, not an error.
    async fn prune_old_logs(fs: &Fs, log_dir: &ArcPath, max_age: usize) {
        let Ok(entries) = fs.list_dir(log_dir.clone()).await else {
            return;
        };
        let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(max_age as i64);
        for path in entries {
            if let Some(stamp) = file_timestamp(&path)
                && stamp < cutoff
            {
                let _ = fs.remove_file(path).await;
            }
        }
    }
}

/// Extracts the timestamp from a per-run log file name of the form
/// `termfolio_%Y-%m-%d-%H-%M-%S.log`.
fn file_timestamp(path: &ArcPath) -> Option<chrono::NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix("termfolio_")?.strip_suffix(".log")?;
    chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d-%H-%M-%S").ok()
}

/// Messages that can be sent to a [`LogCore`].
#[derive(Debug)]
pub enum Message {
    Record(LogMessage),
    Flush(tokio::sync::oneshot::Sender<()>),
}

/// The logging actor interface.
///
/// Recording is fire-and-forget so callers never block on the logger; a
/// full channel simply drops the entry.
#[derive(Debug, Clone)]
pub enum Log {
    Actual(Sender<Message>),
    Mock(Arc<std::sync::Mutex<Vec<LogMessage>>>),
}

impl Log {
    /// Builds and spawns the logging actor.
    pub async fn spawn(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        let (log, _) = LogCore::build(fs, level, max_age, log_dir).await?.spawn();
        Ok(log)
    }

    /// Creates a mock logger that records entries in memory.
    pub fn mock() -> Self {
        Self::Mock(Arc::new(std::sync::Mutex::new(Vec::new())))
    }

    /// Logs a message with [`LogLevel::Info`].
    pub fn info(&self, scope: &str, message: impl Into<String>) {
        self.record(LogLevel::Info, scope, message.into());
    }

    /// Logs a message with [`LogLevel::Warning`].
    pub fn warn(&self, scope: &str, message: impl Into<String>) {
        self.record(LogLevel::Warning, scope, message.into());
    }

    /// Logs a message with [`LogLevel::Error`].
    pub fn error(&self, scope: &str, message: impl Into<String>) {
        self.record(LogLevel::Error, scope, message.into());
    }

    /// Prints buffered messages to stderr. Call after the terminal has been
    /// restored.
    pub async fn flush(&self) {
        if let Self::Actual(sender) = self {
            let (tx, rx) = tokio::sync::oneshot::channel();
            if sender.send(Message::Flush(tx)).await.is_ok() {
                let _ = rx.await;
            }
        }
    }

    fn record(&self, level: LogLevel, scope: &str, message: String) {
        let entry = LogMessage {
            level,
            scope: ArcStr::from(scope),
            message,
        };
        match self {
            Self::Actual(sender) => {
                let _ = sender.try_send(Message::Record(entry));
            }
            Self::Mock(entries) => {
                entries.lock().expect("log mock poisoned").push(entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_and_display() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("Error".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Warning.to_string(), "WARN");
    }

    #[test]
    fn file_timestamps_only_match_run_logs() {
        let run = ArcPath::from(std::path::Path::new(
            "/logs/termfolio_2026-08-30-10-00-00.log",
        ));
        let latest = ArcPath::from(std::path::Path::new("/logs/latest.log"));
        assert!(file_timestamp(&run).is_some());
        assert!(file_timestamp(&latest).is_none());
    }

    #[tokio::test]
    async fn entries_reach_both_log_files() {
        let fs = Fs::mock();
        let dir = ArcPath::from(std::path::Path::new("/logs"));
        let log = Log::spawn(fs.clone(), LogLevel::Warning, 30, dir.clone())
            .await
            .unwrap();

        log.info("test", "starting up");
        log.flush().await;

        let latest = fs
            .read_to_string(ArcPath::from(std::path::Path::new("/logs/latest.log")))
            .await
            .unwrap();
        assert!(latest.contains("[INFO] test: starting up"));

        let files = fs.list_dir(dir).await.unwrap();
        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn mock_records_entries() {
        let log = Log::mock();
        log.error("scope", "boom");
        let Log::Mock(entries) = &log else {
            unreachable!()
        };
        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].to_string(), "[ERROR] scope: boom");
    }
}
