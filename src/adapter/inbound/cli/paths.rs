//! Default file locations.
//!
//! Everything lives under `~/.fglpool/`:
//! - `~/.fglpool/config.toml` - configuration
//! - `~/.fglpool/fglpool.db` - pool database

use std::path::{Path, PathBuf};

/// Returns the fglpool home directory (`~/.fglpool/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fglpool")
}

pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

pub fn default_database() -> PathBuf {
    home_dir().join("fglpool.db")
}

/// Creates the directory that will hold `file`, if it has one.
pub fn ensure_parent(file: &Path) -> std::io::Result<()> {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_fglpool_home() {
        assert!(default_config().starts_with(home_dir()));
        assert!(default_database().starts_with(home_dir()));
        assert!(home_dir().ends_with(".fglpool"));
    }

    #[test]
    fn ensure_parent_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/pool.db");
        ensure_parent(&file).unwrap();
        assert!(dir.path().join("a/b").is_dir());
        ensure_parent(Path::new("pool.db")).unwrap();
    }
}
