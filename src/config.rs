//! Loader configuration
//!
//! Settings for how [`crate::FileHandler`] turns files into trees. Defaults
//! match a stock MOOSE project layout; a YAML file or the environment can
//! override them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the directory whose files are offered for
/// file-name parameters.
pub const PROJECT_DIR_ENV: &str = "MOOSE_PROJECT_DIR";

const DEFAULT_SYNTAX_EXTENSION: &str = "syntax";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory listed for file-name options. When unset, the schema file's
    /// grandparent directory is used.
    pub project_dir: Option<PathBuf>,
    /// Extension of the action-syntax file sitting next to a schema.
    pub syntax_extension: String,
    /// Promote `<type>` groups named by the action-syntax file.
    pub resolve_hard_paths: bool,
    /// Constrain `variable` entries after loading an instance.
    pub constrain_variables: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            project_dir: None,
            syntax_extension: DEFAULT_SYNTAX_EXTENSION.to_string(),
            resolve_hard_paths: true,
            constrain_variables: true,
        }
    }
}

impl LoaderConfig {
    /// Defaults, with the project directory taken from `MOOSE_PROJECT_DIR`
    /// when it is set and non-empty.
    pub fn from_env() -> Self {
        Self::default().with_project_dir_override(std::env::var(PROJECT_DIR_ENV).ok())
    }

    /// Load settings from a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading loader configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: LoaderConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    fn with_project_dir_override(mut self, dir: Option<String>) -> Self {
        if let Some(dir) = dir.filter(|d| !d.is_empty()) {
            self.project_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Where a schema's action-syntax file lives: same path, different
    /// extension.
    pub fn syntax_path(&self, schema: &Path) -> PathBuf {
        schema.with_extension(&self.syntax_extension)
    }

    /// The directory to list for file-name options of `schema`.
    pub fn project_dir_for(&self, schema: &Path) -> Option<PathBuf> {
        if let Some(dir) = &self.project_dir {
            return Some(dir.clone());
        }
        schema
            .parent()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.project_dir, None);
        assert_eq!(config.syntax_extension, "syntax");
        assert!(config.resolve_hard_paths);
        assert!(config.constrain_variables);
    }

    #[test]
    fn test_env_override_ignores_empty_value() {
        let config = LoaderConfig::default().with_project_dir_override(Some(String::new()));
        assert_eq!(config.project_dir, None);

        let config = LoaderConfig::default().with_project_dir_override(Some("/proj".into()));
        assert_eq!(config.project_dir, Some(PathBuf::from("/proj")));
    }

    #[test]
    fn test_from_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loader.yaml");
        std::fs::write(&path, "resolve_hard_paths: false\n").unwrap();

        let config = LoaderConfig::from_file(&path).unwrap();
        assert!(!config.resolve_hard_paths);
        assert!(config.constrain_variables);
        assert_eq!(config.syntax_extension, "syntax");
    }

    #[test]
    fn test_from_file_reports_path() {
        let err = LoaderConfig::from_file(Path::new("/nonexistent/loader.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/loader.yaml"));
    }

    #[test]
    fn test_syntax_and_project_paths() {
        let config = LoaderConfig::default();
        let schema = Path::new("/work/app/schema/app.yaml");
        assert_eq!(
            config.syntax_path(schema),
            PathBuf::from("/work/app/schema/app.syntax")
        );
        assert_eq!(
            config.project_dir_for(schema),
            Some(PathBuf::from("/work/app"))
        );
        assert_eq!(config.project_dir_for(Path::new("app.yaml")), None);

        let pinned = LoaderConfig {
            project_dir: Some("/data".into()),
            ..LoaderConfig::default()
        };
        assert_eq!(pinned.project_dir_for(schema), Some(PathBuf::from("/data")));
    }
}
