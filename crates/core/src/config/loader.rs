//! Configuration file loader for the `.clipflow/` directory structure.
//!
//! This module loads and parses all configuration files from the
//! `.clipflow/` directory, including:
//! - `config.toml`: Global settings
//! - `items/*.md`: Content items with YAML front matter
//! - `processes/*.yaml`: Process definitions

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use cf_protocol::{GlobalConfig, Item, ItemId, ProcessDefinition};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Name of the project configuration directory.
pub const CONFIG_DIR: &str = ".clipflow";

/// Loads all configuration from the `.clipflow/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.clipflow/` folder
///
/// # Returns
///
/// An `AppConfig` containing all loaded configuration. Missing directories
/// or files yield defaults rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML, YAML, or Markdown front matter)
/// - Two items share an id
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let cf_dir = root.join(CONFIG_DIR);

    if !cf_dir.exists() {
        debug!("No {} directory under {}", CONFIG_DIR, root.display());
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&cf_dir)?;
    let items = load_items(&cf_dir)?;
    let processes = load_processes(&cf_dir)?;

    debug!(
        "Loaded {} items and {} process definitions from {}",
        items.len(),
        processes.len(),
        cf_dir.display()
    );

    Ok(AppConfig {
        global,
        items,
        processes,
    })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(cf_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = cf_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::Settings {
            path: config_path.clone(),
            source,
        })?;

    if config.stats_window == 0 {
        return Err(ConfigError::InvalidSetting {
            path: config_path,
            reason: "stats_window must be at least 1".to_string(),
        });
    }

    Ok(config)
}

/// Files directly inside `dir` whose extension is one of `extensions`,
/// sorted by file name.
fn config_files(dir: &Path, extensions: &[&str]) -> ConfigResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        let ext = path.extension().and_then(|s| s.to_str());
        if ext.is_some_and(|ext| extensions.contains(&ext)) && entry.file_type().is_file() {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Parse one item file: YAML front matter for metadata, body for content.
fn parse_item(path: &Path, source: &str) -> ConfigResult<Item> {
    let matter = Matter::<YAML>::new();
    let result = matter.parse(source);

    let mut item: Item = result
        .data
        .ok_or_else(|| ConfigError::Item {
            path: path.to_path_buf(),
            reason: "Missing YAML front matter".to_string(),
        })?
        .deserialize()
        .map_err(|e| ConfigError::Item {
            path: path.to_path_buf(),
            reason: format!("Failed to deserialize front matter: {}", e),
        })?;

    // Blank lines around the body are layout, not content.
    item.content = result
        .content
        .trim_start_matches(['\r', '\n'])
        .trim_end()
        .to_string();
    Ok(item)
}

/// Loads all items from `items/*.md`, sorted by id.
fn load_items(cf_dir: &Path) -> ConfigResult<Vec<Item>> {
    let mut items = Vec::new();
    let mut seen: HashMap<ItemId, PathBuf> = HashMap::new();

    for path in config_files(&cf_dir.join("items"), &["md"])? {
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let item = parse_item(&path, &content)?;
        if let Some(first) = seen.get(&item.id) {
            return Err(ConfigError::DuplicateItem {
                id: item.id,
                path,
                first: first.clone(),
            });
        }
        seen.insert(item.id, path);
        items.push(item);
    }

    items.sort_by_key(|item| item.id);
    Ok(items)
}

/// Loads all process definitions from `processes/*.yaml` (or `.yml`).
fn load_processes(cf_dir: &Path) -> ConfigResult<Vec<ProcessDefinition>> {
    let mut definitions = Vec::new();

    for path in config_files(&cf_dir.join("processes"), &["yaml", "yml"])? {
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let definition: ProcessDefinition =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Definition {
                path: path.clone(),
                source,
            })?;

        definitions.push(definition);
    }

    Ok(definitions)
}
