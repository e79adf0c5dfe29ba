//! Directory structure and file generation for `.clipflow/` initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::CONFIG_DIR;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Templates written in minimal mode: one process and the items it uses.
const MINIMAL_TEMPLATES: &[&str] = &[
    "config.toml",
    "items/username.md",
    "items/password.md",
    "processes/login.yaml",
];

/// Options for initializing a `.clipflow` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Target directory where `.clipflow` will be created.
    pub target_dir: PathBuf,

    /// Overwrite template files in an existing `.clipflow` directory.
    pub force: bool,

    /// Only write the `login` process and the items it references.
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate a `.clipflow` directory populated from the embedded templates.
///
/// ```text
/// .clipflow/
/// ├── config.toml
/// ├── items/
/// │   ├── username.md
/// │   ├── password.md
/// │   └── host.md (unless minimal)
/// └── processes/
///     ├── login.yaml
///     └── staging-login.yaml (unless minimal)
/// ```
///
/// Returns the paths of the files written, in write order.
///
/// # Errors
///
/// - [`InitError::AlreadyInitialized`] if `.clipflow` exists and `force` is unset
/// - [`InitError::MissingTemplate`] if an embedded template is missing
/// - I/O failures while creating directories or writing files
pub async fn generate_clipflow_structure(options: InitOptions) -> InitResult<Vec<PathBuf>> {
    let cf_dir = options.target_dir.join(CONFIG_DIR);

    if cf_dir.exists() && !options.force {
        return Err(InitError::AlreadyInitialized(cf_dir));
    }

    for sub in ["items", "processes"] {
        let dir = cf_dir.join(sub);
        fs::create_dir_all(&dir).map_err(|source| InitError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }

    let templates: Vec<String> = if options.minimal {
        MINIMAL_TEMPLATES.iter().map(|s| s.to_string()).collect()
    } else {
        let mut all = vec!["config.toml".to_string()];
        all.extend(list_templates("items/"));
        all.extend(list_templates("processes/"));
        all
    };

    let mut written = Vec::with_capacity(templates.len());
    for template in &templates {
        written.push(write_template_file(&cf_dir, template)?);
    }

    debug!("Wrote {} template files to {}", written.len(), cf_dir.display());
    Ok(written)
}

fn write_template_file(cf_dir: &Path, template_path: &str) -> InitResult<PathBuf> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::MissingTemplate(template_path.to_string()))?;

    let target_path = cf_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::Write {
        path: target_path.clone(),
        source,
    })?;

    Ok(target_path)
}
