//! File change detection.
//!
//! Walks the site directory once at startup and registers a non-recursive
//! watch on every directory found. Directories created later are not watched.

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// Capacity of the channel between the watcher thread and the stream.
const CHANNEL_CAPACITY: usize = 100;

/// Kind of filesystem change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    Created,
    Written,
    Removed,
    Renamed,
}

/// A change to a path under the watched root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Error setting up the file watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The OS watch facility could not be initialised.
    #[error("failed to create file watcher: {0}")]
    Init(#[source] notify::Error),
    /// A directory under the root could not be read.
    #[error("failed to scan {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    /// The root is not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    /// A directory could not be added to the watcher.
    #[error("failed to watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Live sequence of change events.
///
/// Holds the underlying watcher; dropping the stream stops watching.
pub(crate) struct ChangeStream {
    rx: mpsc::Receiver<ChangeEvent>,
    _watcher: Option<RecommendedWatcher>,
}

impl ChangeStream {
    /// Wait for the next change event.
    ///
    /// Returns `None` once the watcher has shut down.
    pub(crate) async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Build a stream fed by a plain channel instead of a watcher.
    #[cfg(test)]
    pub(crate) fn from_receiver(rx: mpsc::Receiver<ChangeEvent>) -> Self {
        Self { rx, _watcher: None }
    }
}

/// Start watching `root` for changes.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created, `root` is missing or
/// unreadable, or any directory cannot be watched.
pub(crate) fn watch(root: &Path) -> Result<ChangeStream, WatchError> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let mut watcher = notify::recommended_watcher(move |res| forward_event(res, &tx))
        .map_err(WatchError::Init)?;

    let mut directories = 0_usize;
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| WatchError::Walk {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        watcher
            .watch(entry.path(), RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Watch {
                path: entry.path().to_path_buf(),
                source,
            })?;
        directories += 1;
    }

    if directories == 0 {
        return Err(WatchError::NotADirectory(root.to_path_buf()));
    }

    tracing::info!(root = %root.display(), directories, "Watching for changes");

    Ok(ChangeStream {
        rx,
        _watcher: Some(watcher),
    })
}

/// Map a notify event kind to a change kind.
///
/// Returns `None` for access and attribute-only events, and for the paired
/// rename event that repeats both paths already reported by the `From` and
/// `To` halves.
fn change_kind(kind: EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => None,
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(ChangeKind::Written),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        _ => None,
    }
}

/// Forward a notify callback result into the event channel.
///
/// Runs on the watcher's thread.
fn forward_event(res: Result<notify::Event, notify::Error>, tx: &mpsc::Sender<ChangeEvent>) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, paths = ?e.paths, "File watch error");
            return;
        }
    };
    let Some(kind) = change_kind(event.kind) else {
        return;
    };
    for path in event.paths {
        // Send fails only when the stream was dropped.
        if tx.blocking_send(ChangeEvent { path, kind }).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};

    use super::*;

    /// Wait for the first event on `path`, skipping events on other paths.
    async fn next_event_for(stream: &mut ChangeStream, path: &Path, wait: Duration) -> Option<ChangeEvent> {
        tokio::time::timeout(wait, async {
            while let Some(event) = stream.recv().await {
                if event.path == path {
                    return Some(event);
                }
            }
            None
        })
        .await
        .ok()
        .flatten()
    }

    /// Discard whatever arrives within `wait`.
    async fn drain(stream: &mut ChangeStream, wait: Duration) {
        let _ = tokio::time::timeout(wait, async { while stream.recv().await.is_some() {} }).await;
    }

    fn site_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        (dir, root)
    }

    #[test]
    fn test_change_kind_mapping() {
        assert_eq!(
            change_kind(EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            change_kind(EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(ChangeKind::Written)
        );
        assert_eq!(
            change_kind(EventKind::Modify(ModifyKind::Any)),
            Some(ChangeKind::Written)
        );
        assert_eq!(
            change_kind(EventKind::Modify(ModifyKind::Name(RenameMode::From))),
            Some(ChangeKind::Renamed)
        );
        assert_eq!(
            change_kind(EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            Some(ChangeKind::Renamed)
        );
        assert_eq!(
            change_kind(EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            None
        );
        assert_eq!(
            change_kind(EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Removed)
        );
        assert_eq!(
            change_kind(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))),
            None
        );
        assert_eq!(change_kind(EventKind::Access(AccessKind::Any)), None);
        assert_eq!(change_kind(EventKind::Any), None);
    }

    #[test]
    fn test_forward_event_one_per_path() {
        let (tx, mut rx) = mpsc::channel(10);
        let event = notify::Event::new(EventKind::Remove(RemoveKind::Any))
            .add_path(PathBuf::from("/site/a.html"))
            .add_path(PathBuf::from("/site/b.html"));

        forward_event(Ok(event), &tx);

        assert_eq!(
            rx.try_recv().unwrap(),
            ChangeEvent {
                path: PathBuf::from("/site/a.html"),
                kind: ChangeKind::Removed
            }
        );
        assert_eq!(rx.try_recv().unwrap().path, PathBuf::from("/site/b.html"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_forward_event_skips_paired_rename() {
        let (tx, mut rx) = mpsc::channel(10);
        let event = notify::Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/site/draft.html"))
            .add_path(PathBuf::from("/site/final.html"));

        forward_event(Ok(event), &tx);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_forward_event_error_is_skipped() {
        let (tx, mut rx) = mpsc::channel(10);

        forward_event(Err(notify::Error::generic("transient")), &tx);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_forward_event_after_stream_dropped() {
        let (tx, rx) = mpsc::channel(10);
        drop(rx);
        let event = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/site/a.html"));

        forward_event(Ok(event), &tx);
    }

    #[test]
    fn test_watch_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let result = watch(&missing);

        assert!(
            matches!(result, Err(WatchError::Walk { .. })),
            "expected walk error"
        );
    }

    #[test]
    fn test_watch_file_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        fs::write(&file, "<html></html>").unwrap();

        let result = watch(&file);

        assert!(matches!(result, Err(WatchError::NotADirectory(_))));
    }

    #[tokio::test]
    async fn test_detects_write() {
        let (_dir, root) = site_dir();
        let page = root.join("index.html");
        fs::write(&page, "<h1>one</h1>").unwrap();

        let mut stream = watch(&root).unwrap();
        fs::write(&page, "<h1>two</h1>").unwrap();

        let event = next_event_for(&mut stream, &page, Duration::from_secs(5))
            .await
            .expect("no event for write");
        assert_eq!(event.kind, ChangeKind::Written);
    }

    #[tokio::test]
    async fn test_detects_create_in_existing_subdirectory() {
        let (_dir, root) = site_dir();
        fs::create_dir_all(root.join("blog/posts")).unwrap();

        let mut stream = watch(&root).unwrap();
        let post = root.join("blog/posts/hello.html");
        fs::write(&post, "hello").unwrap();

        let event = next_event_for(&mut stream, &post, Duration::from_secs(5))
            .await
            .expect("no event for create");
        assert_eq!(event.kind, ChangeKind::Created);
    }

    #[tokio::test]
    async fn test_detects_remove() {
        let (_dir, root) = site_dir();
        let page = root.join("old.html");
        fs::write(&page, "old").unwrap();

        let mut stream = watch(&root).unwrap();
        fs::remove_file(&page).unwrap();

        let event = next_event_for(&mut stream, &page, Duration::from_secs(5))
            .await
            .expect("no event for remove");
        assert_eq!(event.kind, ChangeKind::Removed);
    }

    #[tokio::test]
    async fn test_detects_rename() {
        let (_dir, root) = site_dir();
        let from = root.join("draft.html");
        let to = root.join("final.html");
        fs::write(&from, "draft").unwrap();

        let mut stream = watch(&root).unwrap();
        fs::rename(&from, &to).unwrap();

        let event = next_event_for(&mut stream, &to, Duration::from_secs(5))
            .await
            .expect("no event for rename");
        assert_eq!(event.kind, ChangeKind::Renamed);
    }

    #[tokio::test]
    async fn test_rename_yields_one_event_per_path() {
        let (_dir, root) = site_dir();
        let from = root.join("draft.html");
        let to = root.join("final.html");
        fs::write(&from, "draft").unwrap();

        let mut stream = watch(&root).unwrap();
        fs::rename(&from, &to).unwrap();

        let mut events = Vec::new();
        let _ = tokio::time::timeout(Duration::from_millis(800), async {
            while let Some(event) = stream.recv().await {
                events.push(event);
            }
        })
        .await;

        assert_eq!(
            events,
            vec![
                ChangeEvent {
                    path: from,
                    kind: ChangeKind::Renamed
                },
                ChangeEvent {
                    path: to,
                    kind: ChangeKind::Renamed
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_new_subdirectory_contents_not_detected() {
        let (_dir, root) = site_dir();
        let mut stream = watch(&root).unwrap();

        let late = root.join("late");
        fs::create_dir(&late).unwrap();
        // The directory itself is created inside a watched directory.
        let created = next_event_for(&mut stream, &late, Duration::from_secs(5))
            .await
            .expect("no event for new directory");
        assert_eq!(created.kind, ChangeKind::Created);
        drain(&mut stream, Duration::from_millis(200)).await;

        let page = late.join("page.html");
        fs::write(&page, "not watched").unwrap();

        assert!(
            next_event_for(&mut stream, &page, Duration::from_millis(500))
                .await
                .is_none()
        );
    }
}
