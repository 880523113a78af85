//! Run configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for `bt run`, loaded from .bt/config.yaml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Tick budget for one run
    pub max_ticks: u64,

    /// Tick the tree only every N steps
    pub think_every_ticks: u32,

    /// Stop as soon as the root finishes
    pub stop_on_completion: bool,

    /// Persisted blackboard to start from (relative to project root)
    pub blackboard: Option<PathBuf>,

    /// Write the blackboard back after the run
    pub save_blackboard: bool,

    /// Reject unknown script attributes when compiling
    pub strict_attributes: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: 100,
            think_every_ticks: 1,
            stop_on_completion: true,
            blackboard: None,
            save_blackboard: false,
            strict_attributes: false,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from project root (looks for .bt/config.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".bt/config.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve paths relative to project root
    pub fn resolve_paths(&mut self, project_root: &Path) {
        if let Some(blackboard) = self.blackboard.take() {
            self.blackboard = Some(project_root.join(blackboard));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::load_from_project(dir.path()).unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.max_ticks, 100);
        assert!(config.stop_on_completion);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".bt")).unwrap();
        std::fs::write(
            dir.path().join(".bt/config.yaml"),
            "max_ticks: 7\nblackboard: state/bb.json\n",
        )
        .unwrap();

        let mut config = RunConfig::load_from_project(dir.path()).unwrap();
        config.resolve_paths(dir.path());

        assert_eq!(config.max_ticks, 7);
        assert_eq!(config.think_every_ticks, 1);
        assert_eq!(config.blackboard, Some(dir.path().join("state/bb.json")));
    }

    #[test]
    fn invalid_yaml_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "max_ticks: [").unwrap();

        let err = RunConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.yaml"));
    }
}
