use crate::config::VaultConfig;
use crate::error::{Result, SnipError};
use crate::repository::Vault;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the platform data directory.
pub const HOME_ENV: &str = "SNIPVAULT_HOME";

/// Where the vault lives: `$SNIPVAULT_HOME` if set and non-empty, otherwise
/// the platform data directory (e.g. `~/.local/share/snipvault` on Linux).
pub fn resolve_data_dir() -> Result<PathBuf> {
    resolve_data_dir_from(std::env::var_os(HOME_ENV).map(PathBuf::from))
}

fn resolve_data_dir_from(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }

    ProjectDirs::from("com", "snipvault", "snipvault")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            SnipError::Config(format!(
                "Could not determine a data directory; set {} to choose one",
                HOME_ENV
            ))
        })
}

/// Reads `dir/config.json` and opens the vault's data file inside `dir`.
pub fn open(dir: &Path) -> Result<Vault> {
    let config = VaultConfig::load(dir)?;
    let path = config.data_path(dir);
    tracing::debug!(path = %path.display(), "opening vault");

    let vault = Vault::new(path).with_pretty_json(config.pretty_json);
    vault.load()?;
    Ok(vault)
}

/// [`open`] at the directory chosen by [`resolve_data_dir`].
pub fn open_default() -> Result<Vault> {
    open(&resolve_data_dir()?)
}
