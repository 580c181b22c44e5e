//! src/config.rs
//! ============================================================================
//! # Config: Browser Configuration Loader and Saver
//!
//! Manages user-editable settings for the scene file browser: the accepted
//! scene file types and the entry filter applied during enumeration. Loads
//! and saves settings as TOML from the cross-platform config path using the
//! [`directories`](https://docs.rs/directories) crate.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use tokio::fs as TokioFs;

/// Which entries count as openable scene files.
///
/// An entry is accepted when its name ends in one of `extensions` or its
/// declared media type is listed in `media_types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptConfig {
    /// File extensions (without the leading dot) accepted for activation.
    pub extensions: Vec<String>,

    /// Declared media types accepted for activation.
    pub media_types: Vec<String>,
}

impl Default for AcceptConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["excalidraw".to_string()],
            media_types: vec!["application/json".to_string()],
        }
    }
}

impl AcceptConfig {
    /// Checks an entry name and declared media type against the accept set.
    #[must_use]
    pub fn matches(&self, name: &str, media_type: Option<&str>) -> bool {
        let by_extension = self
            .extensions
            .iter()
            .any(|ext| name.ends_with(&format!(".{ext}")));

        let by_media_type = media_type
            .is_some_and(|mt| self.media_types.iter().any(|accepted| accepted == mt));

        by_extension || by_media_type
    }
}

/// Main configuration struct for the browser core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Accepted scene file types.
    #[serde(default)]
    pub accept: AcceptConfig,

    /// Include dotfiles in directory listings. Defaults to true: the host
    /// permission prompt already scopes what is reachable, so the browser
    /// shows everything the capability yields.
    pub show_hidden: bool,

    /// Default root directory offered by the local gateway when the host has
    /// no interactive picker.
    pub default_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accept: AcceptConfig::default(),
            show_hidden: true,
            default_root: None,
        }
    }
}

impl Config {
    /// Loads config from TOML file at the XDG-compliant app config dir, or
    /// returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/SceneFileBrowser/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path).await?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Saves config to TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "example", "SceneFileBrowser")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
