//! Suppression-config document loading.
//!
//! Documents are TOML with one `[[suppressions]]` table per entry (`rule`
//! may be spelled `sniff` for compatibility with older configs). Loading
//! resolves relative entry paths against the config file's directory so
//! that every entry carries the same canonical absolute form engine paths
//! are normalized to. Counts are validated downstream when the registry is
//! seeded; negative counts already fail here at deserialization.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use quell_types::SuppressionEntry;

/// File name probed in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "quell.toml";

/// Errors from suppression-config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read suppression config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse suppression config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// One parsed suppression document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuppressionConfig {
    #[serde(default)]
    pub suppressions: Vec<SuppressionEntry>,
}

impl SuppressionConfig {
    /// Parse a document from a TOML string. Entry paths are kept verbatim;
    /// use [`SuppressionConfig::from_file`] to get directory-relative
    /// resolution.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a document from a TOML file, resolving relative entry paths
    /// against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;

        let dir = config_dir(path)?;
        for entry in &mut config.suppressions {
            entry.path = quell_path::resolve(&dir, &entry.path);
        }
        Ok(config)
    }
}

/// Load several documents and flatten them in order. Later entries win on
/// exact key collision when the registry is seeded, which gives merged
/// documents their documented precedence.
pub fn load_all(paths: &[std::path::PathBuf]) -> Result<Vec<SuppressionEntry>, ConfigError> {
    let mut entries = Vec::new();
    for path in paths {
        entries.extend(SuppressionConfig::from_file(path)?.suppressions);
    }
    Ok(entries)
}

/// The default config file in the working directory, when present.
#[must_use]
pub fn discover() -> Option<std::path::PathBuf> {
    let candidate = std::path::PathBuf::from(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Absolute directory of a config file, for entry-path resolution.
fn config_dir(path: &Path) -> Result<String, ConfigError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.display().to_string(),
        _ => ".".to_string(),
    };
    let cwd = std::env::current_dir()?;
    Ok(quell_path::resolve(&cwd.display().to_string(), &parent))
}
