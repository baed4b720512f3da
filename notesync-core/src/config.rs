//! YAML configuration: vault location and folder → collection mappings.
//!
//! # Storage layout
//!
//! ```text
//! ~/.notesync/
//!   config.yaml   (mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! The API token is never stored here; it comes from [`TOKEN_ENV`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{CollectionId, FolderName};

/// Environment variable holding the remote API token.
pub const TOKEN_ENV: &str = "NOTION_API_TOKEN";

/// Current on-disk config version.
pub const CONFIG_VERSION: u32 = 1;

/// Frontmatter key read for tags when the config does not name one.
pub const DEFAULT_TAG_KEY: &str = "hubs";
const DEFAULT_PACING_MS: u64 = 350;

fn default_tag_key() -> String {
    DEFAULT_TAG_KEY.to_string()
}

fn default_pacing_ms() -> u64 {
    DEFAULT_PACING_MS
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One vault folder synchronized into one remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMapping {
    pub folder: FolderName,
    pub database_id: CollectionId,
}

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    /// Absolute path to the notes vault.
    pub vault: PathBuf,
    /// Frontmatter key holding the tag list.
    #[serde(default = "default_tag_key")]
    pub tag_key: String,
    /// Delay after each created page, in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default)]
    pub collections: Vec<CollectionMapping>,
}

impl Config {
    /// Fresh config for `vault` with no collections.
    pub fn new(vault: PathBuf) -> Self {
        Config {
            version: CONFIG_VERSION,
            vault,
            tag_key: default_tag_key(),
            pacing_ms: default_pacing_ms(),
            collections: vec![],
        }
    }

    /// Look up the mapping for `folder`.
    pub fn collection(&self, folder: &str) -> Result<&CollectionMapping, ConfigError> {
        self.collections
            .iter()
            .find(|m| m.folder.0 == folder)
            .ok_or_else(|| ConfigError::UnknownFolder {
                folder: folder.to_string(),
            })
    }

    /// Map `folder` to `database_id`, replacing any existing mapping.
    pub fn set_collection(&mut self, folder: FolderName, database_id: CollectionId) {
        match self.collections.iter_mut().find(|m| m.folder == folder) {
            Some(existing) => existing.database_id = database_id,
            None => self.collections.push(CollectionMapping {
                folder,
                database_id,
            }),
        }
    }

    /// Drop the mapping for `folder`. Returns `false` if there was none.
    pub fn remove_collection(&mut self, folder: &str) -> bool {
        let before = self.collections.len();
        self.collections.retain(|m| m.folder.0 != folder);
        self.collections.len() != before
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// `<vault>/<folder>`
    pub fn folder_path(&self, folder: &FolderName) -> PathBuf {
        self.vault.join(&folder.0)
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.notesync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".notesync").join("config.yaml")
}

// ---------------------------------------------------------------------------
// Load / save / init
// ---------------------------------------------------------------------------

/// Load `<home>/.notesync/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Atomically save the config.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let path = config_path_at(home);
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            set_dir_permissions(dir)?;
        }
    }
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

/// Create a config pointing at `vault`.
///
/// Idempotent: if a config already exists, loads and returns it unchanged.
pub fn init_at(home: &Path, vault: PathBuf) -> Result<Config, ConfigError> {
    if config_path_at(home).exists() {
        return load_at(home);
    }
    let config = Config::new(vault);
    save_at(home, &config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
