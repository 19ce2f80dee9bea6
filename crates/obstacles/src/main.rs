// # obstacles - Offline Obstacle Log
//
// This binary is a THIN front end over obstacle-core:
// - No validation, persistence or rollback logic lives here
// - All collection rules are enforced by ObstacleRegistry
// - Configuration is via environment variables ONLY
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the store and providers
// 4. Loading the collection and running the interactive shell
//
// ## Configuration
//
// ### Store
// - `OBSTACLES_STORE_TYPE`: Type of store (file, memory)
// - `OBSTACLES_STORE_DIR`: Data directory (for file store)
//
// ### Geolocation
// - `OBSTACLES_GEO_TYPE`: Position source (disabled, fixed, http)
// - `OBSTACLES_GEO_LATITUDE` / `OBSTACLES_GEO_LONGITUDE`: Position (for fixed)
// - `OBSTACLES_GEO_URL`: JSON endpoint (for http)
// - `OBSTACLES_GEO_TIMEOUT_SECS`: Request timeout (for http)
//
// ### Media
// - `OBSTACLES_MEDIA_DIR`: Directory attached photos are copied into
//
// ### Logging
// - `OBSTACLES_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export OBSTACLES_STORE_DIR=$HOME/.local/share/obstacles
// export OBSTACLES_GEO_TYPE=fixed
// export OBSTACLES_GEO_LATITUDE=48.85
// export OBSTACLES_GEO_LONGITUDE=2.35
//
// obstacles
// ```

mod console;
mod repl;

use anyhow::{Context, Result};
use obstacle_core::config::{
    GeolocationConfig, MediaConfig, ObstaclesConfig, RegistryConfig, StoreConfig,
};
use obstacle_core::state::open_store;
use obstacle_core::ObstacleRegistry;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use console::{Console, PathPicker, TerminalPermissions};
use repl::Shell;

/// Exit codes for different termination scenarios
///
/// - 0: Clean exit
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ObstaclesExitCode {
    /// Normal exit
    Clean = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<ObstaclesExitCode> for ExitCode {
    fn from(code: ObstaclesExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Raw settings as read from the environment
struct Config {
    store_type: String,
    store_dir: Option<String>,
    geo_type: String,
    geo_url: Option<String>,
    geo_timeout_secs: Option<String>,
    geo_latitude: Option<String>,
    geo_longitude: Option<String>,
    media_dir: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            store_type: env::var("OBSTACLES_STORE_TYPE").unwrap_or_else(|_| "file".to_string()),
            store_dir: env::var("OBSTACLES_STORE_DIR").ok(),
            geo_type: env::var("OBSTACLES_GEO_TYPE").unwrap_or_else(|_| "disabled".to_string()),
            geo_url: env::var("OBSTACLES_GEO_URL").ok(),
            geo_timeout_secs: env::var("OBSTACLES_GEO_TIMEOUT_SECS").ok(),
            geo_latitude: env::var("OBSTACLES_GEO_LATITUDE").ok(),
            geo_longitude: env::var("OBSTACLES_GEO_LONGITUDE").ok(),
            media_dir: env::var("OBSTACLES_MEDIA_DIR").ok(),
            log_level: env::var("OBSTACLES_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Translate into a validated [`ObstaclesConfig`]
    fn resolve(&self) -> Result<ObstaclesConfig> {
        let defaults = ObstaclesConfig::default();

        let store = match self.store_type.as_str() {
            "file" => match self.store_dir.as_deref() {
                Some("") => anyhow::bail!(
                    "OBSTACLES_STORE_DIR cannot be empty when OBSTACLES_STORE_TYPE=file"
                ),
                Some(dir) => StoreConfig::File {
                    dir: PathBuf::from(dir),
                },
                None => defaults.store,
            },
            "memory" => StoreConfig::Memory,
            other => anyhow::bail!(
                "OBSTACLES_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                other
            ),
        };

        let geolocation = match self.geo_type.as_str() {
            "disabled" => GeolocationConfig::Disabled,
            "fixed" => GeolocationConfig::Fixed {
                latitude: parse_required(&self.geo_latitude, "OBSTACLES_GEO_LATITUDE")?,
                longitude: parse_required(&self.geo_longitude, "OBSTACLES_GEO_LONGITUDE")?,
            },
            "http" => {
                let Some(url) = self.geo_url.clone().filter(|u| !u.is_empty()) else {
                    anyhow::bail!("OBSTACLES_GEO_URL is required when OBSTACLES_GEO_TYPE=http");
                };
                if url.starts_with("http://") {
                    eprintln!(
                        "WARNING: OBSTACLES_GEO_URL uses HTTP (not HTTPS). \
                        Your position is sent in the clear."
                    );
                }
                let timeout_secs = match &self.geo_timeout_secs {
                    Some(raw) => raw.parse().with_context(|| {
                        format!("OBSTACLES_GEO_TIMEOUT_SECS is not a number: {}", raw)
                    })?,
                    None => obstacle_providers::http::DEFAULT_TIMEOUT_SECS,
                };
                GeolocationConfig::Http { url, timeout_secs }
            }
            other => anyhow::bail!(
                "OBSTACLES_GEO_TYPE '{}' is not supported. \
                Supported types: disabled, fixed, http",
                other
            ),
        };

        let media = match self.media_dir.as_deref() {
            Some(dir) => MediaConfig {
                dir: PathBuf::from(dir),
            },
            None => match &store {
                StoreConfig::File { dir } => MediaConfig {
                    dir: dir.join("media"),
                },
                StoreConfig::Memory => defaults.media,
            },
        };

        let config = ObstaclesConfig {
            store,
            geolocation,
            media,
            registry: RegistryConfig::default(),
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate settings that are not part of [`ObstaclesConfig`]
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "OBSTACLES_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn parse_required(value: &Option<String>, name: &str) -> Result<f64> {
    let raw = value
        .as_deref()
        .with_context(|| format!("{} is required when OBSTACLES_GEO_TYPE=fixed", name))?;
    raw.trim()
        .parse()
        .with_context(|| format!("{} is not a number: {}", name, raw))
}

fn main() -> ExitCode {
    let env_config = Config::from_env();

    let (config, log_level) = match env_config.resolve().and_then(|c| {
        let level = env_config.log_level()?;
        Ok((c, level))
    }) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ObstaclesExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr so they never interleave with shell prompts on stdout
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ObstaclesExitCode::ConfigError.into();
    }

    info!(
        "Store: {}, geolocation: {}",
        config.store.type_name(),
        config.geolocation.type_name()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ObstaclesExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(()) => ObstaclesExitCode::Clean,
            Err(e) => {
                error!("{:#}", e);
                ObstaclesExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Build the registry, load it, and hand control to the shell
async fn run(config: ObstaclesConfig) -> Result<()> {
    let console = Console::new();
    let permissions = Arc::new(TerminalPermissions::new(console.clone()));

    let store = open_store(&config.store)
        .await
        .context("Failed to open the obstacle store")?;
    let geolocation = obstacle_providers::build_geolocation(&config.geolocation, permissions.clone())?;
    let images = obstacle_providers::build_image_capture(
        &config.media,
        Arc::new(PathPicker::new(console.clone())),
        permissions,
    );

    let (registry, events) = ObstacleRegistry::new(geolocation, images, store, &config.registry)?;

    // A failed load is reported as a notice; the shell starts with an empty list
    match registry.load().await {
        Ok(count) => info!("Loaded {} obstacle(s)", count),
        Err(e) => error!("{}", e),
    }

    Shell::new(registry, events, console).run().await?;

    info!("Goodbye");
    Ok(())
}
