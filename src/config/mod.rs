//! Configuration module for catalog-api
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Load settings from the first file found, or use defaults.
///
/// Lookup order: `explicit`, `CATALOG_SETTINGS_PATH`, then the well-known
/// locations. Environment overrides are applied last.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Settings file not found: {}", path.display());
        }
        candidates.push(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("CATALOG_SETTINGS_PATH") {
        candidates.push(PathBuf::from(path));
    }
    candidates.extend(default_paths());

    let mut settings = match candidates.iter().find(|p| p.exists()) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/catalog-api/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("catalog-api/settings.yml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_must_exist() {
        let missing = Path::new("/definitely/not/here/settings.yml");
        assert!(load(Some(missing)).is_err());
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");
        std::fs::write(&path, "general:\n  instance_name: test-catalog\n").unwrap();

        let settings = load(Some(&path)).unwrap();
        assert_eq!(settings.general.instance_name, "test-catalog");
    }
}
