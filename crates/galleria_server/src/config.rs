//! Layered server configuration.
//!
//! Sources, lowest precedence first:
//! - Bundled defaults (include_str! from galleria.toml)
//! - A user file (`--config <path>`, or ./galleria.toml if present)
//! - Environment variables prefixed with `GALLERIA_`

use config::{Config, Environment, File, FileFormat};
use galleria_error::{ConfigError, GalleriaError, GalleriaResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../galleria.toml");

/// Configuration for the upload server.
///
/// # Example
///
/// ```toml
/// bind = "0.0.0.0:6111"
/// allow_upload = true
/// content_dir = "/srv/galleria/image"
/// staging_dir = "/srv/galleria/tmp"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: SocketAddr,
    /// Process-wide switch for the upload endpoint
    pub allow_upload: bool,
    /// Name of the session cookie
    pub cookie_name: String,
    /// Root of the content-addressed image store
    pub content_dir: PathBuf,
    /// Directory uploads are staged in
    pub staging_dir: PathBuf,
    /// TOML file listing users and their session states
    pub users_file: PathBuf,
    /// Request body limit in bytes
    pub max_upload_bytes: usize,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON logs
    pub json_logs: bool,
}

impl ServerConfig {
    /// Load configuration from all sources.
    ///
    /// `path` names an explicit user file, which must exist. Without it,
    /// `./galleria.toml` is used when present.
    pub fn load(path: Option<&Path>) -> GalleriaResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment map.
    ///
    /// `None` reads the process environment.
    #[instrument(skip(env))]
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> GalleriaResult<Self> {
        debug!("Loading configuration with precedence: environment > user file > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        builder = match path {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml)),
            None => builder.add_source(File::with_name("galleria").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("GALLERIA")
                .try_parsing(true)
                .source(env),
        );

        builder
            .build()
            .map_err(|e| {
                GalleriaError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GalleriaError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
