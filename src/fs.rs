use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, mpsc::Sender};
use tokio::task::JoinHandle;

use crate::ArcPath;

/// The core of the filesystem actor, a thin wrapper over [`tokio::fs`] so
/// the rest of the application never touches the disk directly.
#[derive(Debug, Default)]
pub struct FsCore;

impl FsCore {
    /// Creates a new filesystem core.
    pub fn new() -> Self {
        Default::default()
    }

    /// Transforms an instance of [`FsCore`] into an actor ready to receive
    /// messages.
    pub fn spawn(self) -> (Fs, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                use Message::*;
                match msg {
                    ReadToString { path, tx } => {
                        let res = tokio::fs::read_to_string(path.as_ref())
                            .await
                            .with_context(|| format!("Reading {}", path.display()));
                        let _ = tx.send(res);
                    }
                    Write { path, contents, tx } => {
                        let res = tokio::fs::write(path.as_ref(), contents)
                            .await
                            .with_context(|| format!("Writing {}", path.display()));
                        let _ = tx.send(res);
                    }
                    AppendLine { path, line, tx } => {
                        let res = Self::append_line(&path, &line)
                            .await
                            .with_context(|| format!("Appending to {}", path.display()));
                        let _ = tx.send(res);
                    }
                    CreateDirAll { path, tx } => {
                        let res = tokio::fs::create_dir_all(path.as_ref())
                            .await
                            .with_context(|| format!("Creating directory {}", path.display()));
                        let _ = tx.send(res);
                    }
                    ListDir { path, tx } => {
                        let res = Self::list_dir(&path)
                            .await
                            .with_context(|| format!("Listing {}", path.display()));
                        let _ = tx.send(res);
                    }
                    RemoveFile { path, tx } => {
                        let res = tokio::fs::remove_file(path.as_ref())
                            .await
                            .with_context(|| format!("Removing {}", path.display()));
                        let _ = tx.send(res);
                    }
                }
            }
        });

        (Fs::Actual(tx), handle)
    }

    async fn append_line(path: &ArcPath, line: &str) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }

    async fn list_dir(path: &ArcPath) -> anyhow::Result<Vec<ArcPath>> {
        let mut entries = tokio::fs::read_dir(path.as_ref()).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            paths.push(ArcPath::from(entry.path().as_path()));
        }
        Ok(paths)
    }
}

/// Messages that can be sent to a [`FsCore`].
#[derive(Debug)]
pub enum Message {
    ReadToString {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<String>>,
    },
    Write {
        path: ArcPath,
        contents: String,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<()>>,
    },
    AppendLine {
        path: ArcPath,
        line: String,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<()>>,
    },
    CreateDirAll {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<()>>,
    },
    ListDir {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<Vec<ArcPath>>>,
    },
    RemoveFile {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<()>>,
    },
}

/// In-memory stand-in for the filesystem used in tests. Directories are
/// implicit: a file exists iff its path is a key of `files`.
#[derive(Debug, Default)]
pub struct FsMock {
    pub files: HashMap<ArcPath, String>,
}

/// The filesystem actor interface.
///
/// Cloning is cheap as it only copies the channel sender or the mock
/// reference.
#[derive(Debug, Clone)]
pub enum Fs {
    Actual(Sender<Message>),
    Mock(Arc<Mutex<FsMock>>),
}

use Fs::*;

impl Fs {
    /// Spawns the filesystem actor.
    pub fn spawn() -> Self {
        let (fs, _) = FsCore::new().spawn();
        fs
    }

    /// Creates an empty in-memory mock for testing.
    pub fn mock() -> Self {
        Mock(Arc::new(Mutex::new(FsMock::default())))
    }

    /// Reads the whole file at `path` into a string.
    pub async fn read_to_string(&self, path: ArcPath) -> anyhow::Result<String> {
        match self {
            Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::ReadToString { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Mock(lock) => {
                let lock = lock.lock().await;
                lock.files
                    .get(&path)
                    .cloned()
                    .with_context(|| format!("Reading {}", path.display()))
            }
        }
    }

    /// Writes `contents` to `path`, replacing any previous content.
    pub async fn write(&self, path: ArcPath, contents: String) -> anyhow::Result<()> {
        match self {
            Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Write { path, contents, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Mock(lock) => {
                let mut lock = lock.lock().await;
                lock.files.insert(path, contents);
                Ok(())
            }
        }
    }

    /// Appends a single line (with a trailing newline) to the file at
    /// `path`, creating it if necessary.
    pub async fn append_line(&self, path: ArcPath, line: String) -> anyhow::Result<()> {
        match self {
            Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::AppendLine { path, line, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Mock(lock) => {
                let mut lock = lock.lock().await;
                let file = lock.files.entry(path).or_default();
                file.push_str(&line);
                file.push('\n');
                Ok(())
            }
        }
    }

    /// Creates `path` and all of its missing parent directories.
    pub async fn create_dir_all(&self, path: ArcPath) -> anyhow::Result<()> {
        match self {
            Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::CreateDirAll { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Mock(_) => Ok(()),
        }
    }

    /// Lists the entries of the directory at `path`.
    pub async fn list_dir(&self, path: ArcPath) -> anyhow::Result<Vec<ArcPath>> {
        match self {
            Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::ListDir { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Mock(lock) => {
                let lock = lock.lock().await;
                Ok(lock
                    .files
                    .keys()
                    .filter(|p| p.parent() == Some(path.as_ref()))
                    .cloned()
                    .collect())
            }
        }
    }

    /// Removes the file at `path`.
    pub async fn remove_file(&self, path: ArcPath) -> anyhow::Result<()> {
        match self {
            Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::RemoveFile { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Mock(lock) => {
                let mut lock = lock.lock().await;
                lock.files
                    .remove(&path)
                    .map(|_| ())
                    .with_context(|| format!("Removing {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc_path(path: &std::path::Path) -> ArcPath {
        ArcPath::from(path)
    }

    #[tokio::test]
    async fn write_then_read_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Fs::spawn();
        let path = arc_path(&dir.path().join("a.txt"));

        fs.write(path.clone(), "hello".into()).await.unwrap();
        assert_eq!(fs.read_to_string(path).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn append_line_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Fs::spawn();
        let path = arc_path(&dir.path().join("log.txt"));

        fs.append_line(path.clone(), "one".into()).await.unwrap();
        fs.append_line(path.clone(), "two".into()).await.unwrap();
        assert_eq!(fs.read_to_string(path).await.unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn list_dir_and_remove_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Fs::spawn();
        let sub = arc_path(&dir.path().join("logs"));
        fs.create_dir_all(sub.clone()).await.unwrap();
        let file = arc_path(&dir.path().join("logs").join("x.log"));
        fs.write(file.clone(), String::new()).await.unwrap();

        let listed = fs.list_dir(sub.clone()).await.unwrap();
        assert_eq!(listed, vec![file.clone()]);

        fs.remove_file(file).await.unwrap();
        assert!(fs.list_dir(sub).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mock_behaves_like_a_filesystem() {
        let fs = Fs::mock();
        let path = arc_path(std::path::Path::new("/virtual/dir/file.txt"));

        assert!(fs.read_to_string(path.clone()).await.is_err());
        fs.write(path.clone(), "data".into()).await.unwrap();
        assert_eq!(fs.read_to_string(path.clone()).await.unwrap(), "data");

        let dir = arc_path(std::path::Path::new("/virtual/dir"));
        assert_eq!(fs.list_dir(dir).await.unwrap(), vec![path.clone()]);
        fs.remove_file(path.clone()).await.unwrap();
        assert!(fs.read_to_string(path).await.is_err());
    }
}
