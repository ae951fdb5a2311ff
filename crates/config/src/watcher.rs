use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Editors often write a file in several steps; events closer together
/// than this are reported as one change.
const SETTLE: Duration = Duration::from_millis(200);

/// Watches the config file and sends one notification per settled burst of writes.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut rx) = dash_config::ConfigWatcher::spawn(dash_config::default_path());
/// while rx.recv().await.is_some() {
///     println!("config changed, reloading");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path` on the current Tokio runtime.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

    let (raw_tx, mut raw_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = raw_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    // Watch the directory: editors that replace the file would orphan a file watch.
    let target = path.parent().filter(|p| p.exists()).unwrap_or(&path).to_path_buf();
    if let Err(e) = watcher.watch(&target, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", target.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    let is_relevant = |event: &Event| {
        matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
            && event.paths.iter().any(|p| p == &path)
    };

    while let Some(event) = raw_rx.recv().await {
        match event {
            Ok(e) if is_relevant(&e) => {
                // Swallow the rest of the burst.
                while let Ok(Some(_)) = tokio::time::timeout(SETTLE, raw_rx.recv()).await {}
                debug!("config write settled");
                if tx.send(()).await.is_err() {
                    break; // receiver dropped
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}
