use std::fs;
use std::path::Path;

use serde_json::json;
use tracing::info;

use super::{CommandResult, OutputContext};
use crate::config::{CONFIG_FILENAME, CONFIG_TEMPLATE, DEFAULT_DB_FILENAME, WORKSPACE_DIR_NAME};
use crate::error::{Result, TrackerError};
use crate::storage::SqliteStorage;

const GITIGNORE: &str = "\
*.db
*.db-shm
*.db-wal
";

/// Create `.issuehub/` with a fresh database and a config template.
///
/// # Errors
///
/// `AlreadyInitialized` when a database exists and `force` is not set, or an
/// I/O or database error.
pub fn execute(force: bool, root_dir: Option<&Path>, output: OutputContext) -> CommandResult {
    let workspace = init_workspace(force, root_dir)?;
    if output.json {
        output.print_json(&json!({ "workspace": workspace.display().to_string() }))?;
    } else {
        output.line(&format!(
            "Initialized issuehub workspace in {}",
            workspace.display()
        ));
    }
    Ok(())
}

/// # Errors
///
/// See [`execute`].
pub fn init_workspace(force: bool, root_dir: Option<&Path>) -> Result<std::path::PathBuf> {
    let base_dir = root_dir.unwrap_or_else(|| Path::new("."));
    let workspace = base_dir.join(WORKSPACE_DIR_NAME);
    let db_path = workspace.join(DEFAULT_DB_FILENAME);

    if workspace.exists() {
        if db_path.exists() {
            if !force {
                return Err(TrackerError::AlreadyInitialized { path: db_path });
            }
            for suffix in ["", "-wal", "-shm"] {
                let path = workspace.join(format!("{DEFAULT_DB_FILENAME}{suffix}"));
                if path.exists() {
                    fs::remove_file(path)?;
                }
            }
        }
    } else {
        fs::create_dir_all(&workspace)?;
    }

    SqliteStorage::open(&db_path)?;

    let config_path = workspace.join(CONFIG_FILENAME);
    if !config_path.exists() {
        fs::write(config_path, CONFIG_TEMPLATE)?;
    }
    let gitignore_path = workspace.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(gitignore_path, GITIGNORE)?;
    }

    info!(path = %workspace.display(), force, "workspace initialized");
    Ok(workspace)
}
