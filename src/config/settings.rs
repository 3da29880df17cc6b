use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;

const APP_NAME: &str = "FolderParser";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "folderparser", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

/// Returns the full path to the configuration file.
pub fn get_config_file_path() -> Option<PathBuf> {
    get_config_directory().map(|dir| dir.join(CONFIG_FILE))
}

fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => get_config_file_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory")),
    }
}

/// Loads the configuration from `path`, or from the platform location.
/// If the file doesn't exist, a default one is written there.
/// A file that cannot be parsed is migrated when possible and otherwise
/// replaced in memory by the defaults, so a bad file never blocks startup.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = resolve_path(path)?;

    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default config at {:?}",
            config_path
        );
        let default_config = AppConfig::default();
        save_config(&default_config, Some(&config_path))?;
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

    match serde_json::from_str::<AppConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            migrate_legacy_config(&config_content).or_else(|_| Ok(AppConfig::default()))
        }
    }
}

/// Fills in fields that older config files lack (or carry as `null`) and
/// deserializes the result.
fn migrate_legacy_config(config_content: &str) -> Result<AppConfig> {
    let mut value: Value = serde_json::from_str(config_content)?;
    let obj = value
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Config is not a JSON object"))?;

    let defaults = serde_json::to_value(AppConfig::default())?;
    let Value::Object(defaults) = defaults else {
        anyhow::bail!("Default config did not serialize to an object");
    };

    for (key, default_val) in defaults {
        let missing = obj.get(&key).is_none_or(Value::is_null);
        // Optional paths are allowed to stay null.
        let nullable = matches!(
            key.as_str(),
            "last_directory" | "output_directory" | "folder_tree_root"
        );
        if missing && !(nullable && obj.contains_key(&key)) {
            obj.insert(key, default_val);
        }
    }

    let migrated_config: AppConfig = serde_json::from_value(value)?;
    tracing::info!("Successfully migrated legacy config");
    Ok(migrated_config)
}

/// Saves the configuration to `path`, or to the platform location.
pub fn save_config(config: &AppConfig, path: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(path)?;

    if let Some(config_dir) = config_path.parent() {
        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            tracing::info!("Created config directory: {:?}", config_dir);
        }
    }

    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_json)
        .with_context(|| format!("Failed to write config file {}", config_path.display()))?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}

/// Exports the current configuration to a user-specified JSON file.
pub fn export_config(config: &AppConfig, export_path: &Path) -> Result<()> {
    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(export_path, config_json)?;
    tracing::info!("Exported config to {:?}", export_path);
    Ok(())
}

/// Imports a configuration from a user-specified JSON file.
pub fn import_config(import_path: &Path) -> Result<AppConfig> {
    let config_content = fs::read_to_string(import_path)?;
    match serde_json::from_str::<AppConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Imported config from {:?}", import_path);
            Ok(config)
        }
        Err(_) => {
            tracing::info!("Importing legacy config format from {:?}", import_path);
            migrate_legacy_config(&config_content)
        }
    }
}

// Platform-specific configuration paths for reference:
// macOS:   ~/Library/Application Support/com.folderparser.FolderParser/
// Linux:   ~/.config/folderparser/
// Windows: %APPDATA%/folderparser/FolderParser/config/
