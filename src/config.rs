use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{ArcPath, ArcStr, fs::Fs, log::LogLevel};


/// The core of the configuration actor, owning the loaded settings and the
/// path of the TOML file they came from.
pub struct ConfigCore {
    pub(crate) data: Data,
    path: ArcPath,
    fs: Fs,
}

impl ConfigCore {
    /// Creates a new instance of [`ConfigCore`] with default settings.
    ///
    /// # Arguments
    /// * `fs` - The filesystem actor
    /// * `path` - The path to the configuration file
    pub fn new(fs: Fs, path: ArcPath) -> Self {
        Self {
            data: Data::default(),
            path,
            fs,
        }
    }

    /// Transforms the configuration core into an actor.
    pub fn spawn(mut self) -> (Config, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Load(tx) => {
                        let res = self.load().await;
                        let _ = tx.send(res);
                    }
                    Message::Save(tx) => {
                        let res = self.save().await;
                        let _ = tx.send(res);
                    }
                    Message::GetFeedUrl(tx) => {
                        let _ = tx.send(ArcStr::from(self.data.feed_url.as_str()));
                    }
                    Message::SetFeedUrl(url) => {
                        self.data.feed_url = url;
                    }
                    Message::GetLogLevel(tx) => {
                        let _ = tx.send(self.data.log_level);
                    }
                    Message::GetPath(opt, tx) => {
                        let res = match opt {
                            PathOpt::LogDir => ArcPath::from(self.data.log_dir.as_path()),
                        };
                        let _ = tx.send(res);
                    }
                    Message::GetUSize(opt, tx) => {
                        let res = match opt {
                            USizeOpt::MaxLogAge => self.data.max_log_age,
                        };
                        let _ = tx.send(res);
                    }
                    Message::GetDuration(opt, tx) => {
                        let res = match opt {
                            DurationOpt::TypingInterval => {
                                Duration::from_millis(self.data.typing_interval_ms)
                            }
                            DurationOpt::CacheTtl => Duration::from_secs(self.data.cache_ttl_secs),
                            DurationOpt::Debounce => Duration::from_millis(self.data.debounce_ms),
                        };
                        let _ = tx.send(res);
                    }
                }
            }
        });
        (Config::Actual(tx), handle)
    }

    /// Loads the configuration from the file.
    ///
    /// Failure means the config file does not exist or is not valid TOML;
    /// missing fields keep their defaults.
    async fn load(&mut self) -> anyhow::Result<()> {
        let buf = self.fs.read_to_string(self.path.clone()).await?;
        self.data = toml::from_str(&buf).context("Parsing the configuration file")?;
        Ok(())
    }

    /// Saves the configuration to the file, creating its directory first.
    async fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            self.fs
                .create_dir_all(ArcPath::from(parent))
                .await
                .context("Creating the configuration directory")?;
        }
        let buf = toml::to_string_pretty(&self.data).context("Serializing the configuration")?;
        self.fs.write(self.path.clone(), buf).await
    }
}

/// The data structure for the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Data {
    /// JSON endpoint serving the project list
    pub feed_url: String,
    /// Delay between typed characters in the intro animation
    pub typing_interval_ms: u64,
    /// How long a fetched project list stays valid
    pub cache_ttl_secs: u64,
    /// Quiet period that collapses rapid refresh triggers
    pub debounce_ms: u64,
    /// Directory where log files are stored
    pub log_dir: PathBuf,
    /// Minimum level of messages printed to stderr on exit
    pub log_level: LogLevel,
    /// Maximum age of log files in days before they are deleted
    pub max_log_age: usize,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            feed_url: "http://localhost:8000/projects.json".into(),
            typing_interval_ms: 80,
            cache_ttl_secs: 5 * 60,
            debounce_ms: 300,
            log_dir: std::env::temp_dir().join("termfolio").join("logs"),
            log_level: LogLevel::Warning,
            max_log_age: 30,
        }
    }
}

/// The path-valued configuration options.
#[derive(Debug, Clone, Copy)]
pub enum PathOpt {
    LogDir,
}

/// The usize-valued configuration options.
#[derive(Debug, Clone, Copy)]
pub enum USizeOpt {
    MaxLogAge,
}

/// The duration-valued configuration options.
#[derive(Debug, Clone, Copy)]
pub enum DurationOpt {
    TypingInterval,
    CacheTtl,
    Debounce,
}

/// The message type for the configuration actor.
#[derive(Debug)]
pub enum Message {
    Load(tokio::sync::oneshot::Sender<anyhow::Result<()>>),
    Save(tokio::sync::oneshot::Sender<anyhow::Result<()>>),
    GetFeedUrl(tokio::sync::oneshot::Sender<ArcStr>),
    SetFeedUrl(String),
    GetLogLevel(tokio::sync::oneshot::Sender<LogLevel>),
    GetPath(PathOpt, tokio::sync::oneshot::Sender<ArcPath>),
    GetUSize(USizeOpt, tokio::sync::oneshot::Sender<usize>),
    GetDuration(DurationOpt, tokio::sync::oneshot::Sender<Duration>),
}

/// The configuration actor interface.
#[derive(Debug, Clone)]
pub enum Config {
    Actual(tokio::sync::mpsc::Sender<Message>),
    Mock(Arc<std::sync::Mutex<Data>>),
}

impl Config {
    /// Spawns the configuration actor.
    pub fn spawn(fs: Fs, path: ArcPath) -> Self {
        let (config, _) = ConfigCore::new(fs, path).spawn();
        config
    }

    /// Creates a mock configuration, optionally seeded with custom data.
    pub fn mock(data: Option<Data>) -> Self {
        Self::Mock(Arc::new(std::sync::Mutex::new(data.unwrap_or_default())))
    }

    /// Loads the configuration from its file.
    pub async fn load(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Load(tx))
                    .await
                    .expect("Config actor died");
                rx.await.expect("Config actor died")
            }
            Self::Mock(_) => Ok(()),
        }
    }

    /// Saves the configuration to its file.
    pub async fn save(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Save(tx))
                    .await
                    .expect("Config actor died");
                rx.await.expect("Config actor died")
            }
            Self::Mock(_) => Ok(()),
        }
    }

    /// Gets the feed endpoint URL.
    pub async fn feed_url(&self) -> ArcStr {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetFeedUrl(tx))
                    .await
                    .expect("Config actor died");
                rx.await.expect("Config actor died")
            }
            Self::Mock(data) => {
                ArcStr::from(data.lock().expect("config mock poisoned").feed_url.as_str())
            }
        }
    }

    /// Overrides the feed endpoint URL for this run.
    pub async fn set_feed_url(&self, url: String) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetFeedUrl(url)).await;
            }
            Self::Mock(data) => {
                data.lock().expect("config mock poisoned").feed_url = url;
            }
        }
    }

    /// Gets the configured log level.
    pub async fn log_level(&self) -> LogLevel {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetLogLevel(tx))
                    .await
                    .expect("Config actor died");
                rx.await.expect("Config actor died")
            }
            Self::Mock(data) => data.lock().expect("config mock poisoned").log_level,
        }
    }

    /// Gets a config of type path.
    pub async fn path(&self, opt: PathOpt) -> ArcPath {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetPath(opt, tx))
                    .await
                    .expect("Config actor died");
                rx.await.expect("Config actor died")
            }
            Self::Mock(data) => {
                let data = data.lock().expect("config mock poisoned");
                match opt {
                    PathOpt::LogDir => ArcPath::from(data.log_dir.as_path()),
                }
            }
        }
    }

    /// Gets a config of type usize.
    pub async fn usize(&self, opt: USizeOpt) -> usize {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetUSize(opt, tx))
                    .await
                    .expect("Config actor died");
                rx.await.expect("Config actor died")
            }
            Self::Mock(data) => {
                let data = data.lock().expect("config mock poisoned");
                match opt {
                    USizeOpt::MaxLogAge => data.max_log_age,
                }
            }
        }
    }

    /// Gets a config of type duration.
    pub async fn duration(&self, opt: DurationOpt) -> Duration {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetDuration(opt, tx))
                    .await
                    .expect("Config actor died");
                rx.await.expect("Config actor died")
            }
            Self::Mock(data) => {
                let data = data.lock().expect("config mock poisoned");
                match opt {
                    DurationOpt::TypingInterval => Duration::from_millis(data.typing_interval_ms),
                    DurationOpt::CacheTtl => Duration::from_secs(data.cache_ttl_secs),
                    DurationOpt::Debounce => Duration::from_millis(data.debounce_ms),
                }
            }
        }
    }
}
