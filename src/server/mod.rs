//! Configuration web server
//!
//! Serves the Asterisk configuration files as JSON and writes edits back:
//! - `GET /config/:name` and `POST /config/:name`
//! - `GET /devices`
//! - static assets under `/static/` and the home page
//!
//! Parsed files are cached in a [`ConfigStore`]; a file watcher on the
//! configuration directory drops cached entries when files change on disk.

mod handlers;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, Debouncer};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info};

use crate::cli::ServeOptions;
use crate::config::Config;
use crate::device::DeviceManager;

pub use handlers::ApiError;
pub use store::ConfigStore;

/// Shared server state
pub struct AppState {
    /// Parsed configuration files
    pub store: Arc<ConfigStore>,

    /// Modem discovery
    pub devices: DeviceManager,

    /// Directory holding `index.html`
    pub templates_dir: PathBuf,

    /// Serving a temporary copy of the sample files
    pub dev: bool,
}

impl AppState {
    pub fn new(config_dir: impl Into<PathBuf>, templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(ConfigStore::new(config_dir)),
            devices: DeviceManager::default(),
            templates_dir: templates_dir.into(),
            dev: false,
        }
    }

    pub fn with_devices(mut self, devices: DeviceManager) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/config/:filename",
            get(handlers::get_config).post(handlers::update_config),
        )
        .route("/devices", get(handlers::list_devices))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The configuration server
pub struct Server {
    config: Arc<Config>,
    options: ServeOptions,
}

impl Server {
    pub fn new(config: Arc<Config>, options: ServeOptions) -> Self {
        Self { config, options }
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn start(&self) -> Result<()> {
        let config_dir = self.config.asterisk_config_dir();
        if !config_dir.is_dir() {
            anyhow::bail!(
                "Asterisk configuration directory does not exist: {}",
                config_dir.display()
            );
        }

        let state = Arc::new(
            AppState::new(&config_dir, self.config.templates_dir()).with_dev(self.options.dev),
        );

        // Dropping the debouncer stops the watcher
        let _watcher = watch_config_dir(state.store.clone())?;

        let app = router(state, self.config.static_dir());

        let listener = tokio::net::TcpListener::bind((self.options.host.as_str(), self.options.port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", self.options.host, self.options.port))?;

        info!("Server listening on http://{}", listener.local_addr()?);
        info!("Serving configuration files from {}", config_dir.display());

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Watch the store's directory and invalidate entries of changed files
fn watch_config_dir(store: Arc<ConfigStore>) -> Result<Debouncer<notify::RecommendedWatcher>> {
    let dir = store.dir().to_path_buf();

    let mut debouncer = new_debouncer(
        std::time::Duration::from_millis(100),
        move |res: notify_debouncer_mini::DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    debug!("File changed: {}", event.path.display());
                    store.invalidate_path(&event.path);
                }
            }
            Err(e) => error!("Watch error: {:?}", e),
        },
    )?;

    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;

    Ok(debouncer)
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
