//! Configuration management for `issuehub`.
//!
//! Layers, lowest to highest precedence:
//! 1. Defaults
//! 2. User config (`~/.config/issuehub/config.yaml`)
//! 3. Project config (`.issuehub/config.yaml`)
//! 4. Environment (`IH_*`)
//! 5. CLI flags

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::auth::AuthContext;
use crate::error::{Result, TrackerError};
use crate::storage::{DEFAULT_LOCK_TIMEOUT_MS, SqliteStorage};

/// Workspace directory name searched for from the CWD upward.
pub const WORKSPACE_DIR_NAME: &str = ".issuehub";
/// Database file inside the workspace directory.
pub const DEFAULT_DB_FILENAME: &str = "issuehub.db";
pub const CONFIG_FILENAME: &str = "config.yaml";

const ENV_PREFIX: &str = "IH_";
const WORKSPACE_ENV: &str = "ISSUEHUB_DIR";

pub const KEY_DB: &str = "db";
pub const KEY_LOCK_TIMEOUT: &str = "lock-timeout";
pub const KEY_USER: &str = "user";
pub const KEY_ORG: &str = "org";

const KNOWN_KEYS: &[&str] = &[KEY_DB, KEY_LOCK_TIMEOUT, KEY_USER, KEY_ORG];

/// Written by `ih init`.
pub const CONFIG_TEMPLATE: &str = "\
# issuehub configuration
#
# Values here are overridden by IH_* environment variables and CLI flags.

# user: alice
# org: acme
# lock-timeout: 30000
# db: issuehub.db
";

/// One configuration source, keyed by normalized key name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Set a key, normalizing `_` to `-`. Empty values are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        self.values.insert(normalize_key(key), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge layers given lowest to highest precedence.
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file. A missing file yields an empty layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or not a mapping.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut layer = Self::default();
        match value {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Mapping(map) => {
                for (key, value) in map {
                    let (Some(key), Some(value)) = (key.as_str(), yaml_scalar_to_string(&value))
                    else {
                        continue;
                    };
                    layer.set(key, value);
                }
            }
            _ => {
                return Err(TrackerError::Config(
                    "config file must be a mapping of keys to values".to_string(),
                ));
            }
        }
        Ok(layer)
    }

    /// Build a layer from the process environment (`IH_USER`, `IH_LOCK_TIMEOUT`, ...).
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from arbitrary `(name, value)` pairs using the `IH_` prefix.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let normalized = normalize_key(stripped);
                if KNOWN_KEYS.contains(&normalized.as_str()) {
                    layer.set(&normalized, value);
                }
            }
        }
        layer
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub user: Option<String>,
    pub org: Option<String>,
    pub lock_timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        if let Some(path) = &self.db {
            layer.set(KEY_DB, path.to_string_lossy());
        }
        if let Some(user) = &self.user {
            layer.set(KEY_USER, user.clone());
        }
        if let Some(org) = &self.org {
            layer.set(KEY_ORG, org.clone());
        }
        if let Some(timeout) = self.lock_timeout {
            layer.set(KEY_LOCK_TIMEOUT, timeout.to_string());
        }
        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set(KEY_LOCK_TIMEOUT, DEFAULT_LOCK_TIMEOUT_MS.to_string());
    layer
}

/// Find the active `.issuehub` directory.
///
/// Honors `ISSUEHUB_DIR` when it names a directory, otherwise walks up from
/// `start` (or the CWD).
///
/// # Errors
///
/// `NotInitialized` when no workspace is found, or an I/O error reading the CWD.
pub fn discover_workspace_dir(start: Option<&Path>) -> Result<PathBuf> {
    let env_override = env::var(WORKSPACE_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    discover_workspace_dir_with_env(start, env_override.as_deref())
}

fn discover_workspace_dir_with_env(
    start: Option<&Path>,
    env_override: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };
    loop {
        let candidate = current.join(WORKSPACE_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !current.pop() {
            break;
        }
    }
    Err(TrackerError::NotInitialized)
}

/// Load user config (`~/.config/issuehub/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("issuehub")
        .join(CONFIG_FILENAME);
    ConfigLayer::from_yaml(&path)
}

/// Load project config (`.issuehub/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(workspace_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&workspace_dir.join(CONFIG_FILENAME))
}

/// Merge every layer in precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(workspace_dir: Option<&Path>, cli: &CliOverrides) -> Result<ConfigLayer> {
    let project = match workspace_dir {
        Some(dir) => load_project_config(dir)?,
        None => ConfigLayer::default(),
    };
    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        load_user_config()?,
        project,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

/// Build the caller identity from the merged layer.
#[must_use]
pub fn auth_context_from_layer(layer: &ConfigLayer) -> AuthContext {
    AuthContext {
        user_id: layer.get(KEY_USER).map(str::to_string),
        org_id: layer.get(KEY_ORG).map(str::to_string),
    }
}

/// # Errors
///
/// `Config` when the value is not a non-negative integer.
pub fn lock_timeout_from_layer(layer: &ConfigLayer) -> Result<u64> {
    layer.get(KEY_LOCK_TIMEOUT).map_or(Ok(DEFAULT_LOCK_TIMEOUT_MS), |raw| {
        raw.trim().parse::<u64>().map_err(|_| {
            TrackerError::Config(format!(
                "{KEY_LOCK_TIMEOUT} must be a number of milliseconds, got '{raw}'"
            ))
        })
    })
}

/// Database path: the `db` key (relative paths resolve against the workspace
/// directory), else `issuehub.db` inside the workspace.
///
/// # Errors
///
/// `NotInitialized` when neither a `db` key nor a workspace is available.
pub fn db_path_from_layer(layer: &ConfigLayer, workspace_dir: Option<&Path>) -> Result<PathBuf> {
    match (layer.get(KEY_DB).map(str::trim), workspace_dir) {
        (Some(db), Some(dir)) => {
            let path = PathBuf::from(db);
            if path.is_absolute() {
                Ok(path)
            } else {
                Ok(dir.join(path))
            }
        }
        (Some(db), None) => Ok(PathBuf::from(db)),
        (None, Some(dir)) => Ok(dir.join(DEFAULT_DB_FILENAME)),
        (None, None) => Err(TrackerError::NotInitialized),
    }
}

/// Everything a command needs to run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub workspace_dir: Option<PathBuf>,
    pub db_path: PathBuf,
    pub lock_timeout_ms: u64,
    pub auth: AuthContext,
}

impl ResolvedConfig {
    /// Discover the workspace, merge all layers and resolve paths and identity.
    /// A CLI `--db` makes the workspace optional.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Config`, or a config file read/parse error.
    pub fn resolve(cli: &CliOverrides, start: Option<&Path>) -> Result<Self> {
        let workspace_dir = match discover_workspace_dir(start) {
            Ok(dir) => Some(dir),
            Err(TrackerError::NotInitialized) if cli.db.is_some() => None,
            Err(err) => return Err(err),
        };
        let layer = load_config(workspace_dir.as_deref(), cli)?;
        Self::from_layer(&layer, workspace_dir)
    }

    /// # Errors
    ///
    /// `NotInitialized` or `Config`.
    pub fn from_layer(layer: &ConfigLayer, workspace_dir: Option<PathBuf>) -> Result<Self> {
        let db_path = db_path_from_layer(layer, workspace_dir.as_deref())?;
        let lock_timeout_ms = lock_timeout_from_layer(layer)?;
        let auth = auth_context_from_layer(layer);
        debug!(db = %db_path.display(), lock_timeout_ms, "config resolved");
        Ok(Self {
            workspace_dir,
            db_path,
            lock_timeout_ms,
            auth,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_storage(&self) -> Result<SqliteStorage> {
        SqliteStorage::open_with_timeout(&self.db_path, Some(self.lock_timeout_ms))
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
