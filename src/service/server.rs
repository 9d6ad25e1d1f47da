//! Service startup and lifecycle

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{ServiceConfig, config_path, log_path};
use crate::service::refresh::RefreshScheduler;
use crate::service::request::KmodService;
use crate::version::cache::SharedState;
use crate::version::matcher::KernelMatcher;
use crate::version::matchers::DistToolMatcher;
use crate::version::source::CatalogSource;
use crate::version::sources::HttpCatalogSource;

/// A running service: populated shared state, request handler and the
/// background refresh task
pub struct Service {
    state: Arc<SharedState>,
    handler: Arc<KmodService<SharedState>>,
    cancel: CancellationToken,
    refresh: JoinHandle<()>,
}

impl Service {
    /// Start with the HTTP catalog source and the external distribution tool
    pub async fn start(config: &ServiceConfig) -> Self {
        let source = Arc::new(HttpCatalogSource::new(&config.catalog.url));
        let matcher = Arc::new(DistToolMatcher::from_config(&config.matcher));
        Self::start_with(config, source, matcher).await
    }

    /// Start with custom collaborators
    ///
    /// Runs one refresh before returning so the first request already sees
    /// data, then leaves the refresh loop running in the background.
    pub async fn start_with(
        config: &ServiceConfig,
        source: Arc<dyn CatalogSource>,
        matcher: Arc<dyn KernelMatcher>,
    ) -> Self {
        let state = Arc::new(SharedState::new());

        let scheduler = RefreshScheduler::new(
            Arc::clone(&state),
            source,
            config.catalog.clone(),
            Duration::from_millis(config.refresh.interval),
        );
        let summary = scheduler.run_once().await;
        if summary.updated.is_empty() {
            warn!("No distribution could be populated at startup, all requests will fail until the next refresh");
        }

        let cancel = CancellationToken::new();
        let refresh = scheduler.spawn(cancel.clone());

        let handler = Arc::new(KmodService::new(
            Arc::clone(&state),
            matcher,
            Duration::from_millis(config.matcher.timeout),
        ));

        Self {
            state,
            handler,
            cancel,
            refresh,
        }
    }

    /// Request handler to hand to the transport layer
    pub fn handler(&self) -> Arc<KmodService<SharedState>> {
        Arc::clone(&self.handler)
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Stop the refresh loop and wait for it to finish
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.refresh.await {
            error!("Refresh task ended abnormally: {}", e);
        }
    }
}

/// Set up file logging. The returned guard must be held for the lifetime of
/// the process, dropping it flushes and stops the log writer.
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    let log_path = log_path();
    let log_dir = log_path.parent().unwrap_or(Path::new("."));
    let file_name = log_path
        .file_name()
        .unwrap_or(OsStr::new("best-kmod.log"));

    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::never(log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// Run the service until Ctrl-C
pub async fn run_server() -> anyhow::Result<()> {
    let _guard = init_logging()?;

    let path = config_path();
    let config = ServiceConfig::load(&path)?;
    info!(
        "Starting best-kmod with config {:?}: {} distributions from {}",
        path,
        config.catalog.distributions.len(),
        config.catalog.url
    );

    let service = Service::start(&config).await;
    info!(
        "Serving distributions: {:?}",
        service.state().distributions()?
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    service.shutdown().await;

    Ok(())
}
