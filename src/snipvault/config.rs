use crate::error::{Result, SnipError};
use crate::store::persist::write_atomic;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DATA_FILE: &str = "snippets.json";

/// Configuration for a vault directory, stored in `<dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaultConfig {
    /// Name of the data file inside the vault directory
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Indent the data file (easier to diff and hand-edit) or write it compact
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
}

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

fn default_pretty_json() -> bool {
    true
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            pretty_json: default_pretty_json(),
        }
    }
}

impl VaultConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(SnipError::Io(e)),
        };
        let config: VaultConfig =
            serde_json::from_str(&content).map_err(|source| SnipError::Malformed {
                path: config_path.clone(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        self.validate()?;
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(SnipError::Serialization)?;
        write_atomic(&config_path, &content)
    }

    /// The data file must be a plain file name so it stays inside the directory.
    fn validate(&self) -> Result<()> {
        let name = Path::new(&self.data_file);
        let is_plain = name.components().count() == 1 && name.file_name().is_some();
        if self.data_file.trim().is_empty() || !is_plain {
            return Err(SnipError::Config(format!(
                "data_file must be a file name, got '{}'",
                self.data_file
            )));
        }
        Ok(())
    }

    pub fn data_path<P: AsRef<Path>>(&self, dir: P) -> PathBuf {
        dir.as_ref().join(&self.data_file)
    }
}
