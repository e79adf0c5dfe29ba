//! Sample project files compiled into the binary.

use rust_embed::RustEmbed;

/// Everything under the workspace `templates/` directory, keyed by relative path.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Contents of the template at `path` (`"config.toml"`, `"items/username.md"`, ...).
///
/// ```
/// use cf_core::init::templates::get_template;
///
/// let config = get_template("config.toml").expect("config.toml should exist");
/// assert!(config.contains("stats_window"));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// Template paths starting with `prefix`, sorted.
///
/// ```
/// use cf_core::init::templates::list_templates;
///
/// let items = list_templates("items/");
/// assert!(items.contains(&"items/username.md".to_string()));
/// ```
pub fn list_templates(prefix: &str) -> Vec<String> {
    let mut paths: Vec<String> = TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect();
    paths.sort();
    paths
}
