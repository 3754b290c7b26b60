//! Configuration file watcher for hot reload.
//!
//! # Responsibilities
//! - Watch the config file's directory, so atomic rename-over saves are seen
//! - Reload, validate and compile the route table on every change
//! - Forward only configs whose routes compile
//!
//! # Design Decisions
//! - A file that fails to parse, validate or compile is logged and dropped;
//!   the running route table stays in place
//! - Compilation here is a gate only; the server compiles its own table with
//!   its own registry when the update arrives

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ServiceConfig;
use crate::routing::{PredicateRegistry, Router};

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    registry: Arc<PredicateRegistry>,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher that checks reloaded routes against `registry`.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(
        path: &Path,
        registry: Arc<PredicateRegistry>,
    ) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                registry,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching on notify's background thread.
    ///
    /// The returned handle must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.canonicalize().map_err(notify::Error::io)?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| notify::Error::path_not_found().add_path(path.clone()))?;

        let tx = self.update_tx;
        let registry = self.registry;
        let file = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, &file) => {
                    tracing::info!(path = ?file, "Config file change detected, reloading");
                    if let Some(config) = reload(&file, &registry) {
                        let _ = tx.send(config);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

fn touches(event: &Event, file: &Path) -> bool {
    (event.kind.is_modify() || event.kind.is_create()) && event.paths.iter().any(|p| p == file)
}

/// Load `path` and compile its routes; `None` if any step fails.
fn reload(path: &Path, registry: &PredicateRegistry) -> Option<ServiceConfig> {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config, keeping current routes");
            return None;
        }
    };

    match Router::compile(&config.routes, registry) {
        Ok(table) => {
            tracing::debug!(routes = table.len(), "Reloaded routes compile");
            Some(config)
        }
        Err(e) => {
            tracing::error!(error = %e, "Reloaded routes rejected, keeping current routes");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::time::timeout;

    const CANARY: &str = r#"
        [[routes]]
        name = "canary"
        backend_group = "v2"
        predicates = [{ name = "Traffic", args = [0.3, "group", "B"] }]
    "#;

    const BROKEN: &str = r#"
        [[routes]]
        name = "canary"
        backend_group = "v2"
        predicates = [{ name = "Traffic", args = [1.3] }]
    "#;

    /// Replace the file in one step so the watcher never sees a half-written file.
    fn save(path: &Path, content: &str) {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content).unwrap();
        fs::rename(&tmp, path).unwrap();
    }

    /// Discard duplicate notifications for the same save.
    async fn drain(rx: &mut mpsc::UnboundedReceiver<ServiceConfig>) {
        while let Ok(Some(_)) = timeout(Duration::from_millis(300), rx.recv()).await {}
    }

    #[test]
    fn test_reload_rejects_bad_traffic_args() {
        let dir = std::env::temp_dir().join(format!("traffic-router-reload-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("routes.toml");
        let registry = PredicateRegistry::with_defaults();

        fs::write(&path, CANARY).unwrap();
        let config = reload(&path, &registry).expect("valid routes reload");
        assert_eq!(config.routes[0].predicates[0].args.len(), 3);

        fs::write(&path, BROKEN).unwrap();
        assert!(reload(&path, &registry).is_none());

        fs::write(&path, "[listener]\nbind_address = \"nowhere\"").unwrap();
        assert!(reload(&path, &registry).is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_watcher_forwards_only_compiling_configs() {
        let dir = std::env::temp_dir().join(format!("traffic-router-watch-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("routes.toml");
        fs::write(&path, "").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path, Arc::new(PredicateRegistry::with_defaults()));
        let _handle = watcher.run().unwrap();

        save(&path, CANARY);
        let config = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("reload within timeout")
            .expect("channel open");
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].name, "canary");
        drain(&mut rx).await;

        save(&path, BROKEN);
        assert!(
            timeout(Duration::from_secs(1), rx.recv()).await.is_err(),
            "config with invalid Traffic args was forwarded"
        );

        let _ = fs::remove_dir_all(&dir);
    }
}
