//! Layered configuration loading.

use crate::{
    ApiSection, LlmConfig, MergeConfig, NarrationConfig, OrchestratorConfig, StorageConfig,
    VideoConfig,
};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use sjt_error::{ConfigError, SjtError, SjtResult};
use std::path::Path;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../sjt.toml");

/// Complete pipeline configuration.
///
/// # Examples
///
/// ```
/// use sjt_config::SjtConfig;
///
/// let config = SjtConfig::bundled().unwrap();
/// assert_eq!(config.video.max_polls, 100);
/// assert_eq!(config.video.resolution, "768P");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SjtConfig {
    /// Chat model
    pub llm: LlmConfig,
    /// Video rendering service
    pub video: VideoConfig,
    /// Text-to-speech service
    pub narration: NarrationConfig,
    /// Filesystem locations
    pub storage: StorageConfig,
    /// Muxing
    pub merge: MergeConfig,
    /// Agent swarm
    pub orchestrator: OrchestratorConfig,
}

impl SjtConfig {
    /// Bundled defaults only.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file does not parse.
    pub fn bundled() -> SjtResult<Self> {
        Self::finish(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load configuration from a specific file layered over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> SjtResult<Self> {
        debug!("Loading configuration from file");

        Self::finish(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from(path.as_ref())),
        )
    }

    /// Load configuration with precedence, later sources overriding earlier:
    /// 1. Bundled defaults (`sjt.toml` shipped with the crate)
    /// 2. `~/.config/sjt/sjt.toml`
    /// 3. `./sjt.toml`
    /// 4. `explicit`, if given (must exist)
    /// 5. `SJT__SECTION__KEY` environment variables
    ///
    /// A `.env` file in the working directory is loaded first so that API
    /// keys named by `api_key_env` can live there.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse.
    #[instrument(skip(explicit))]
    pub fn load(explicit: Option<&Path>) -> SjtResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/sjt/sjt.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("sjt").required(false));

        if let Some(path) = explicit {
            debug!(path = %path.display(), "Adding explicit configuration file");
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("SJT")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> SjtResult<Self> {
        builder
            .build()
            .map_err(|e| {
                SjtError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                SjtError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Resolve the API key for a section from its named environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the variable is unset or blank.
    pub fn api_key(&self, section: ApiSection) -> SjtResult<String> {
        let var = match section {
            ApiSection::Llm => &self.llm.api_key_env,
            ApiSection::Video => &self.video.api_key_env,
            ApiSection::Narration => &self.narration.api_key_env,
        };
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(SjtError::from(ConfigError::new(format!(
                "Missing API key for [{}]: set {}",
                section, var
            )))),
        }
    }
}
