use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable that overrides the data directory
pub const HOME_ENV: &str = "FOCUSSPACE_HOME";

/// Error type for reading config.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Read `<data>/config.toml`. A missing file yields the defaults.
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::ReadError { path, source }),
    };
    Ok(toml::from_str(&text)?)
}

/// Write `contents` as config.toml unless one exists. Returns whether it wrote.
pub fn write_config_if_missing(data_dir: &Path, contents: &str) -> Result<bool, ConfigError> {
    let path = config_path(data_dir);
    if path.exists() {
        return Ok(false);
    }
    fs::create_dir_all(data_dir).map_err(|source| ConfigError::WriteError {
        path: data_dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, contents).map_err(|source| ConfigError::WriteError { path, source })?;
    Ok(true)
}

/// Resolve the data directory: explicit flag, then `$FOCUSSPACE_HOME`, then
/// `$XDG_DATA_HOME/focusspace`, then `$HOME/.local/share/focusspace`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_data_dir_with(explicit, |name| std::env::var(name).ok())
}

/// `resolve_data_dir` with a custom environment lookup
pub fn resolve_data_dir_with<F>(explicit: Option<&Path>, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    let non_empty = |name: &str| env(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    if let Some(dir) = non_empty(HOME_ENV) {
        return dir;
    }
    if let Some(dir) = non_empty("XDG_DATA_HOME") {
        return dir.join("focusspace");
    }
    non_empty("HOME")
        .unwrap_or_else(|| PathBuf::from("/"))
        .join(".local")
        .join("share")
        .join("focusspace")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.pomodoro.work_minutes, 25);
    }

    #[test]
    fn bad_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[pomodoro\nwork_minutes = ").unwrap();
        assert!(matches!(
            read_config(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn reads_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[goal]\ndefault = 8\n[backup]\nauto_backup = false\n",
        )
        .unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.goal.default, 8);
        assert!(!config.backup.auto_backup);
    }

    #[test]
    fn write_if_missing_does_not_clobber() {
        let tmp = TempDir::new().unwrap();
        assert!(write_config_if_missing(tmp.path(), "[goal]\ndefault = 3\n").unwrap());
        assert!(!write_config_if_missing(tmp.path(), "[goal]\ndefault = 9\n").unwrap());
        assert_eq!(read_config(tmp.path()).unwrap().goal.default, 3);
    }

    #[test]
    fn data_dir_precedence() {
        let explicit = PathBuf::from("/tmp/explicit");
        let vars = env_of(&[
            ("FOCUSSPACE_HOME", "/fs"),
            ("XDG_DATA_HOME", "/xdg"),
            ("HOME", "/home/u"),
        ]);
        let env = |name: &str| vars.get(name).cloned();
        assert_eq!(resolve_data_dir_with(Some(explicit.as_path()), &env), explicit);
        assert_eq!(resolve_data_dir_with(None, &env), PathBuf::from("/fs"));

        let vars = env_of(&[("XDG_DATA_HOME", "/xdg"), ("HOME", "/home/u")]);
        let env = |name: &str| vars.get(name).cloned();
        assert_eq!(
            resolve_data_dir_with(None, &env),
            PathBuf::from("/xdg/focusspace")
        );

        let vars = env_of(&[("FOCUSSPACE_HOME", ""), ("HOME", "/home/u")]);
        let env = |name: &str| vars.get(name).cloned();
        assert_eq!(
            resolve_data_dir_with(None, &env),
            PathBuf::from("/home/u/.local/share/focusspace")
        );
    }
}
