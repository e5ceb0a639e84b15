// # proxy-configd - Proxy Configuration Daemon
//
// CRITICAL RULES:
// - This is a THIN integration layer ONLY
// - DO NOT add parsing, diffing or dispatch logic here
// - All watcher logic MUST be in proxy-config-core
// - Configuration is via environment variables ONLY
//
// The proxy-configd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering sources and building one watcher per source
// 4. Consuming each source's updates until a shutdown signal arrives
//
// ## Configuration
//
// ### Source
// - `PROXY_CONFIG_SOURCE_TYPE`: Type of source (file, http)
// - `PROXY_CONFIG_SOURCE_PATHS`: Comma-separated document paths (for file)
// - `PROXY_CONFIG_SOURCE_URL`: Document URL (for http)
// - `PROXY_CONFIG_HTTP_TIMEOUT_SECS`: Request timeout (for http)
//
// ### Watcher
// - `PROXY_CONFIG_POLL_INTERVAL_MS`: Fixed wait between cycles (default 5000)
// - `PROXY_CONFIG_CHANNEL_CAPACITY`: Outbound channel capacity (default 1)
//
// ### Logging
// - `PROXY_CONFIG_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export PROXY_CONFIG_SOURCE_TYPE=file
// export PROXY_CONFIG_SOURCE_PATHS=/etc/proxy/services.json
// export PROXY_CONFIG_POLL_INTERVAL_MS=5000
//
// proxy-configd
// ```

use anyhow::Result;
use proxy_config_core::{
    ConfigWatcher, EndpointFact, Operation, PollConfig, ServiceFact, SourceConfig,
    SourceRegistry, Update, WatcherConfig, WatcherHandle,
};
use std::env;
use std::process::ExitCode;
use tokio_stream::StreamExt;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    source_type: String,
    source_paths: Vec<String>,
    source_url: Option<String>,
    http_timeout_secs: u64,
    poll: PollConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let defaults = PollConfig::default();

        Ok(Self {
            source_type: env::var("PROXY_CONFIG_SOURCE_TYPE")
                .unwrap_or_else(|_| "file".to_string()),
            source_paths: env::var("PROXY_CONFIG_SOURCE_PATHS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            source_url: env::var("PROXY_CONFIG_SOURCE_URL").ok(),
            http_timeout_secs: parse_var("PROXY_CONFIG_HTTP_TIMEOUT_SECS", 10)?,
            poll: PollConfig {
                poll_interval_ms: parse_var(
                    "PROXY_CONFIG_POLL_INTERVAL_MS",
                    defaults.poll_interval_ms,
                )?,
                channel_capacity: parse_var(
                    "PROXY_CONFIG_CHANNEL_CAPACITY",
                    defaults.channel_capacity,
                )?,
            },
            log_level: env::var("PROXY_CONFIG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Build one watcher configuration per configured source
    fn watcher_configs(&self) -> Result<Vec<WatcherConfig>> {
        let sources: Vec<SourceConfig> = match self.source_type.as_str() {
            "file" => {
                if self.source_paths.is_empty() {
                    anyhow::bail!(
                        "PROXY_CONFIG_SOURCE_PATHS must contain at least one path. \
                        Set it via: export PROXY_CONFIG_SOURCE_PATHS=/etc/proxy/services.json"
                    );
                }
                self.source_paths
                    .iter()
                    .map(|path| SourceConfig::File { path: path.clone() })
                    .collect()
            }
            "http" => match self.source_url.as_deref() {
                Some(url) if !url.is_empty() => vec![SourceConfig::Http {
                    url: url.to_string(),
                    timeout_secs: self.http_timeout_secs,
                }],
                _ => anyhow::bail!(
                    "PROXY_CONFIG_SOURCE_URL is required when PROXY_CONFIG_SOURCE_TYPE=http"
                ),
            },
            other => anyhow::bail!(
                "PROXY_CONFIG_SOURCE_TYPE '{}' is not supported. \
                Supported types: file, http",
                other
            ),
        };

        Ok(sources
            .into_iter()
            .map(|source| WatcherConfig {
                source,
                poll: self.poll.clone(),
            })
            .collect())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        for watcher in self.watcher_configs()? {
            watcher.validate()?;
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PROXY_CONFIG_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Parse a numeric environment variable, falling back to a default when unset
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a number. Got '{}': {}", name, value, e)),
        Err(_) => Ok(default),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting proxy-configd");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let registry = SourceRegistry::with_builtin();

    #[cfg(feature = "http")]
    {
        info!("Registering HTTP source");
        proxy_config_source_http::register(&registry);
    }

    // Each source gets its own watcher, channels and consumer. A `Set` event
    // replaces one source's view and must never reach another source's table.
    let mut handles: Vec<WatcherHandle> = Vec::new();
    let mut consumers = Vec::new();
    for watcher_config in config.watcher_configs()? {
        let source = registry.create_source(&watcher_config.source)?;
        let (watcher, receivers) = ConfigWatcher::new(source, watcher_config.poll)?;

        let name = watcher.source_name().to_string();
        consumers.push(tokio::spawn(consume_updates(name, receivers.into_stream())));
        handles.push(watcher.spawn());
    }

    info!("Watching {} source(s)", handles.len());

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);

    let mut failed = false;
    for handle in handles {
        let name = handle.source_name().to_string();
        if let Err(e) = handle.stop().await {
            warn!("Watcher for {} ended with error: {}", name, e);
            failed = true;
        }
    }

    // Every sender is gone, so each consumer drains and exits
    for consumer in consumers {
        if let Err(e) = consumer.await {
            warn!("Update consumer task failed: {}", e);
        }
    }

    info!("Shutting down daemon");
    if failed {
        anyhow::bail!("One or more watchers stopped with an error");
    }
    Ok(())
}

/// Stand-in for the routing table: keep one source's view and log every
/// full replacement
async fn consume_updates<S>(source: String, mut updates: S) -> SourceView
where
    S: tokio_stream::Stream<Item = Update> + Unpin,
{
    let mut view = SourceView::default();

    while let Some(update) = updates.next().await {
        view.apply(update);
        info!(
            "Routing table for {} now has {} service(s) and {} address(es): {:?}",
            source,
            view.services.len(),
            view.address_count(),
            view.service_names()
        );
    }

    view
}

/// Latest full view received from one source
#[derive(Debug, Default)]
struct SourceView {
    services: Vec<ServiceFact>,
    endpoints: Vec<EndpointFact>,
}

impl SourceView {
    /// Replace the family carried by `update`
    fn apply(&mut self, update: Update) {
        match update {
            Update::Services(update) => match update.op {
                Operation::Set => self.services = update.payload,
                op => warn!("Ignoring services update with unsupported operation {:?}", op),
            },
            Update::Endpoints(update) => match update.op {
                Operation::Set => self.endpoints = update.payload,
                op => warn!("Ignoring endpoints update with unsupported operation {:?}", op),
            },
        }
    }

    fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    fn address_count(&self) -> usize {
        self.endpoints.iter().map(|e| e.addresses.len()).sum()
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
