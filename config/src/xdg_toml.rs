//! Load `$XDG_CONFIG_HOME/<app>/config.toml`: the `[env]` table and the `[sandbox]` table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::settings::SandboxTable;
use crate::LoadError;

/// Base config directory: `$XDG_CONFIG_HOME` when set to an absolute path, else the
/// platform config directory.
fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        if dir.is_absolute() {
            return Ok(dir);
        }
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory".to_string()))
}

fn xdg_config_path(app_name: &str) -> Result<Option<PathBuf>, LoadError> {
    let path = config_home()?.join(app_name).join("config.toml");
    if path.exists() {
        Ok(Some(path))
    } else {
        Ok(None)
    }
}

#[derive(serde::Deserialize, Default)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub(crate) env: HashMap<String, String>,
    #[serde(default)]
    pub(crate) sandbox: Option<SandboxTable>,
}

fn read_config_file(path: &Path) -> Result<ConfigFile, LoadError> {
    let content = std::fs::read_to_string(path).map_err(LoadError::XdgRead)?;
    Ok(toml::from_str(&content)?)
}

/// Parses the app's `config.toml`. Missing file returns an empty [`ConfigFile`].
pub(crate) fn load_config_file(app_name: &str) -> Result<ConfigFile, LoadError> {
    match xdg_config_path(app_name)? {
        Some(path) => read_config_file(&path),
        None => Ok(ConfigFile::default()),
    }
}

/// Returns env key-value pairs from `[env]` section. Missing file or empty section returns empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    Ok(load_config_file(app_name)?.env)
}
