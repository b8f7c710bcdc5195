//! Layered configuration for the Wayfarer binary.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from wayfarer.toml)
//! - `~/.config/wayfarer/wayfarer.toml`
//! - `./wayfarer.toml`
//! - `WAYFARER__SECTION__KEY` environment variables

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use wayfarer_compression::{CompressionProfiles, TargetFormat};
use wayfarer_error::{ConfigError, WayfarerError, WayfarerResult};
use wayfarer_migration::{MigrationOrchestrator, OrchestratorConfig};
use wayfarer_storage::{BlobNaming, BlobStorage, FileSystemBlobStorage, SourceFetcher};
use wayfarer_store::{EntityStore, JsonDirectoryStore};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../wayfarer.toml");

/// Blob storage backend settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlobConfig {
    /// Directory blobs are written under
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// URL the root directory is served at
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Extra hosts (exact or `*.suffix`) whose URLs count as migrated
    #[serde(default)]
    pub host_patterns: Vec<String>,
    /// Filename uniqueness strategy
    #[serde(default)]
    pub naming: BlobNaming,
}

impl BlobConfig {
    /// Both a root and a public URL are set.
    pub fn is_configured(&self) -> bool {
        self.root.is_some() && self.public_base_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// Entity store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory holding one `<id>.json` document per entity
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// A store path is set.
    pub fn is_configured(&self) -> bool {
        self.path.is_some()
    }
}

/// Orchestrator tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MigrationSettings {
    /// Entities migrated at the same time
    #[serde(default = "default_entity_concurrency")]
    pub entity_concurrency: usize,
    /// Image jobs in flight across a run
    #[serde(default = "default_image_concurrency")]
    pub image_concurrency: usize,
    /// Re-encode images before upload
    #[serde(default = "default_true")]
    pub compress_on_ingest: bool,
    /// Encoding path when compressing on ingest
    #[serde(default)]
    pub target_format: TargetFormat,
    /// Stop starting new entities after this many seconds
    #[serde(default)]
    pub deadline_secs: Option<u64>,
    /// Per-request timeout for source downloads
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_entity_concurrency() -> usize {
    4
}

fn default_image_concurrency() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            entity_concurrency: default_entity_concurrency(),
            image_concurrency: default_image_concurrency(),
            compress_on_ingest: true,
            target_format: TargetFormat::default(),
            deadline_secs: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// Top-level Wayfarer configuration.
///
/// # Example
///
/// ```no_run
/// use wayfarer::WayfarerConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = WayfarerConfig::load()?;
/// println!("blob configured: {}", config.blob.is_configured());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WayfarerConfig {
    /// Blob storage backend
    #[serde(default)]
    pub blob: BlobConfig,
    /// Entity store backend
    #[serde(default)]
    pub store: StoreConfig,
    /// Orchestrator tuning
    #[serde(default)]
    pub migration: MigrationSettings,
    /// Per-category compression profiles
    #[serde(default)]
    pub compression: CompressionProfiles,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,
}

impl WayfarerConfig {
    /// Load configuration from a specific file path, over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> WayfarerResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));
        Self::finish(builder.add_source(environment()))
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> WayfarerResult<Self> {
        debug!("Loading layered configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/wayfarer/wayfarer.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("wayfarer").required(false));
        Self::finish(builder.add_source(environment()))
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> WayfarerResult<Self> {
        builder
            .build()
            .map_err(|e| {
                WayfarerError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                WayfarerError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Orchestrator configuration derived from these settings.
    ///
    /// Backend flags reflect whether each backend has the settings it needs.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_blob_configured(self.blob.is_configured())
            .with_store_configured(self.store.is_configured())
            .with_entity_concurrency(self.migration.entity_concurrency)
            .with_image_concurrency(self.migration.image_concurrency)
            .with_compress_on_ingest(self.migration.compress_on_ingest)
            .with_target_format(self.migration.target_format)
            .with_profiles(self.compression.clone())
            .with_deadline(self.migration.deadline_secs.map(Duration::from_secs))
            .with_fetch_timeout(Duration::from_secs(self.migration.fetch_timeout_secs))
    }

    /// Filesystem blob backend, if configured.
    pub fn blob_storage(&self) -> WayfarerResult<Option<Arc<dyn BlobStorage>>> {
        let (Some(root), Some(base_url)) = (&self.blob.root, &self.blob.public_base_url) else {
            return Ok(None);
        };
        let fetcher = SourceFetcher::new(Duration::from_secs(self.migration.fetch_timeout_secs))?;
        let storage: Arc<dyn BlobStorage> = Arc::new(
            FileSystemBlobStorage::new(root.clone(), base_url, self.blob.naming, fetcher)?
                .with_host_patterns(&self.blob.host_patterns),
        );
        Ok(Some(storage))
    }

    /// JSON directory entity store, if configured.
    pub fn entity_store(&self) -> WayfarerResult<Option<Arc<dyn EntityStore>>> {
        let Some(path) = &self.store.path else {
            return Ok(None);
        };
        let store: Arc<dyn EntityStore> = Arc::new(JsonDirectoryStore::new(path.clone())?);
        Ok(Some(store))
    }

    /// Build an orchestrator over the configured backends.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a backend is missing or invalid.
    pub fn build_orchestrator(&self) -> WayfarerResult<MigrationOrchestrator> {
        MigrationOrchestrator::new(
            self.orchestrator_config(),
            self.entity_store()?,
            self.blob_storage()?,
        )
    }
}

/// `WAYFARER__BLOB__ROOT=/srv/blob` sets `blob.root`.
fn environment() -> Environment {
    Environment::with_prefix("WAYFARER")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("blob.host_patterns")
        .try_parsing(true)
}
