//! Locating config files and folding them into one [`ParleyConfig`].
//!
//! Two layers are read, the later one winning section by section:
//!
//! | Layer     | File                                                        |
//! |-----------|-------------------------------------------------------------|
//! | `user`    | `config.toml` in `$PARLEY_CONFIG_DIR` or `<config dir>/parley` |
//! | `project` | `parley.toml` in the working (or given) directory           |
//!
//! Command-line flags sit above both and are applied by the binary.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::types::APP_NAME;
use crate::{ConfigError, ParleyConfig, Result};

const PROJECT_FILE: &str = "parley.toml";
const USER_FILE: &str = "config.toml";

/// Overrides the platform config directory when set and non-empty.
pub const CONFIG_DIR_VAR: &str = "PARLEY_CONFIG_DIR";

/// Which layer a config file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    User,
    Project,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::User => "user",
            Self::Project => "project",
        })
    }
}

/// One file that was considered during discovery.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSource {
    pub layer: Layer,
    pub path: PathBuf,
    /// False when the file is absent or failed to parse.
    pub loaded: bool,
}

/// The merged configuration plus a record of how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ParleyConfig,
    /// Lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// User config directory, used for the default log location.
    pub config_dir: Option<PathBuf>,
    /// Unreadable layers and out-of-range values, for the caller to log.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Files that actually contributed settings.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter_map(|source| source.loaded.then_some(source.path.as_path()))
            .collect()
    }
}

/// Discover and merge both layers using the default user directory.
pub fn load_layered(project_dir: Option<&Path>) -> LoadedConfig {
    load_layered_from(project_dir, None)
}

/// Discover and merge both layers.
///
/// An explicit `user_dir` takes precedence over [`CONFIG_DIR_VAR`] and the
/// platform default. Reading never fails outright: a bad layer is skipped
/// and reported in [`LoadedConfig::warnings`].
pub fn load_layered_from(project_dir: Option<&Path>, user_dir: Option<&Path>) -> LoadedConfig {
    let config_dir = user_dir.map(Path::to_path_buf).or_else(user_config_dir);

    let mut candidates = Vec::with_capacity(2);
    if let Some(dir) = &config_dir {
        candidates.push((Layer::User, dir.join(USER_FILE)));
    }
    let project_root = project_dir.unwrap_or(Path::new("."));
    candidates.push((Layer::Project, project_root.join(PROJECT_FILE)));

    let mut config = ParleyConfig::new();
    let mut warnings = Vec::new();
    let sources = candidates
        .into_iter()
        .map(|(layer, path)| {
            let loaded = match read_layer(&path) {
                Ok(Some(layer_config)) => {
                    config.merge(layer_config);
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    warnings.push(format!("Skipping {layer} config {}: {e}", path.display()));
                    false
                }
            };
            ConfigSource {
                layer,
                path,
                loaded,
            }
        })
        .collect();

    warnings.extend(value_warnings(&config));

    LoadedConfig {
        config,
        sources,
        config_dir,
        warnings,
    }
}

/// Parse a single config file.
pub fn read_config(path: &Path) -> Result<ParleyConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    ParleyConfig::from_toml(&text)
}

/// `config.toml` inside [`user_config_dir`].
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(USER_FILE))
}

/// `$PARLEY_CONFIG_DIR` if set, else the platform config dir plus `parley`.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_VAR) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|dir| dir.join(APP_NAME)),
    }
}

/// `Ok(None)` for a missing file.
fn read_layer(path: &Path) -> Result<Option<ParleyConfig>> {
    if path.is_file() {
        read_config(path).map(Some)
    } else {
        Ok(None)
    }
}

/// Settings the store will clamp or that make recall meaningless.
fn value_warnings(config: &ParleyConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(memory) = &config.memory {
        if memory.capacity == 0 {
            warnings.push("[memory] capacity = 0 is raised to 1".to_string());
        }
        if memory.topic_index_retain > memory.topic_index_cap {
            warnings.push(format!(
                "[memory] topic_index_retain ({}) exceeds topic_index_cap ({}) and is lowered to it",
                memory.topic_index_retain, memory.topic_index_cap
            ));
        }
    }

    if let Some(recall) = &config.recall
        && !(0.0..=1.0).contains(&recall.threshold)
    {
        warnings.push(format!(
            "[recall] threshold {} is outside 0.0-1.0",
            recall.threshold
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dirs_with(user_toml: Option<&str>, project_toml: Option<&str>) -> (TempDir, TempDir) {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        if let Some(text) = user_toml {
            fs::write(user.path().join(USER_FILE), text).unwrap();
        }
        if let Some(text) = project_toml {
            fs::write(project.path().join(PROJECT_FILE), text).unwrap();
        }
        (user, project)
    }

    #[test]
    fn test_user_config_path_names_file() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with(USER_FILE));
        }
    }

    #[test]
    fn test_read_config_missing_file() {
        let err = read_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
        assert!(err.to_string().contains("here.toml"));
    }

    #[test]
    fn test_read_config_bad_toml() {
        let (user, _project) = dirs_with(Some("[memory\ncapacity ="), None);
        let err = read_config(&user.path().join(USER_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_nothing_on_disk_gives_defaults() {
        let (user, project) = dirs_with(None, None);
        let loaded = load_layered_from(Some(project.path()), Some(user.path()));

        assert_eq!(loaded.config, ParleyConfig::default());
        assert!(loaded.loaded_from().is_empty());
        assert_eq!(
            loaded.sources.iter().map(|s| s.layer).collect::<Vec<_>>(),
            vec![Layer::User, Layer::Project]
        );
        assert_eq!(loaded.config_dir.as_deref(), Some(user.path()));
    }

    #[test]
    fn test_project_section_replaces_user_section() {
        let (user, project) = dirs_with(
            Some("[memory]\ncapacity = 500\n\n[recall]\nlimit = 5\n"),
            Some("[memory]\ncapacity = 40\n"),
        );
        let loaded = load_layered_from(Some(project.path()), Some(user.path()));

        assert_eq!(loaded.config.memory.as_ref().unwrap().capacity, 40);
        assert_eq!(loaded.config.recall.as_ref().unwrap().limit, 5);
        assert_eq!(loaded.loaded_from().len(), 2);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_broken_layer_is_skipped_with_warning() {
        let (user, project) = dirs_with(Some("[recall]\nlimit = 9\n"), Some("= nope"));
        let loaded = load_layered_from(Some(project.path()), Some(user.path()));

        assert_eq!(loaded.config.recall.as_ref().unwrap().limit, 9);
        let user_file = user.path().join(USER_FILE);
        assert_eq!(loaded.loaded_from(), vec![user_file.as_path()]);
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].starts_with("Skipping project config"));
        assert!(loaded.warnings[0].contains(PROJECT_FILE));
    }

    #[test]
    fn test_suspicious_values_warn() {
        let (user, project) = dirs_with(
            None,
            Some(
                "[memory]\ncapacity = 0\ntopic_index_cap = 5\ntopic_index_retain = 8\n\n[recall]\nthreshold = 1.5\n",
            ),
        );
        let loaded = load_layered_from(Some(project.path()), Some(user.path()));
        assert_eq!(loaded.warnings.len(), 3);
    }

    #[test]
    fn test_layer_display() {
        assert_eq!(Layer::User.to_string(), "user");
        assert_eq!(Layer::Project.to_string(), "project");
    }
}
