use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub capture: CaptureConfig,
    pub persistence: PersistenceConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureConfig {
    pub max_stored: usize,
    pub auto_capture: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PersistenceConfig {
    pub recent_limit: usize,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReplayConfig {
    pub default_scheme: String,
    pub timeout_secs: u64,
    pub include_credentials: bool,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_stored: crate::DEFAULT_MAX_STORED,
            auto_capture: false,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            recent_limit: crate::DEFAULT_RECENT_LIMIT,
            debounce_ms: 1000,
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            default_scheme: "http".to_string(),
            timeout_secs: 30,
            include_credentials: true,
            accept_invalid_certs: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl WorkspaceConfig {
    pub fn load_or_create(path: &Path) -> Result<Self, String> {
        if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
            toml::from_str(&raw).map_err(|err| err.to_string())
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let contents = toml::to_string_pretty(self).map_err(|err| err.to_string())?;
        std::fs::write(path, contents).map_err(|err| err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub config_filename: String,
    pub state_filename: String,
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            config_filename: "repeater.toml".to_string(),
            state_filename: "state.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub config: PathBuf,
    pub state: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: impl AsRef<Path>, layout: &WorkspaceLayout) -> Self {
        let root = root.as_ref().to_path_buf();
        let config = root.join(&layout.config_filename);
        let state = root.join(&layout.state_filename);

        Self {
            root,
            config,
            state,
        }
    }

    pub fn ensure(&self) -> Result<(), String> {
        std::fs::create_dir_all(&self.root).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{LogFormat, WorkspaceConfig, WorkspaceLayout, WorkspacePaths};

    #[test]
    fn default_layout_uses_expected_names() {
        let layout = WorkspaceLayout::default();
        assert_eq!(layout.config_filename, "repeater.toml");
        assert_eq!(layout.state_filename, "state.json");
    }

    #[test]
    fn workspace_paths_join_layout_entries() {
        let layout = WorkspaceLayout::default();
        let paths = WorkspacePaths::new("/tmp/repeater", &layout);

        assert_eq!(paths.config, std::path::Path::new("/tmp/repeater/repeater.toml"));
        assert_eq!(paths.state, std::path::Path::new("/tmp/repeater/state.json"));
    }

    #[test]
    fn config_defaults() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.capture.max_stored, 1000);
        assert!(!config.capture.auto_capture);
        assert_eq!(config.persistence.recent_limit, 100);
        assert_eq!(config.persistence.debounce_ms, 1000);
        assert_eq!(config.replay.default_scheme, "http");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repeater.toml");
        let config = WorkspaceConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, WorkspaceConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repeater.toml");
        std::fs::write(&path, "[capture]\nmax_stored = 10\n\n[logging]\nformat = \"json\"\n").unwrap();
        let config = WorkspaceConfig::load_or_create(&path).unwrap();
        assert_eq!(config.capture.max_stored, 10);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.replay.timeout_secs, 30);
    }

    #[test]
    fn replay_section_controls_tls_verification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repeater.toml");
        assert!(!WorkspaceConfig::default().replay.accept_invalid_certs);
        std::fs::write(&path, "[replay]\naccept_invalid_certs = true\n").unwrap();
        let config = WorkspaceConfig::load_or_create(&path).unwrap();
        assert!(config.replay.accept_invalid_certs);
        assert!(config.replay.include_credentials);
    }

    #[test]
    fn config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repeater.toml");
        let mut config = WorkspaceConfig::default();
        config.replay.default_scheme = "https".to_string();
        config.persistence.recent_limit = 25;
        config.save(&path).unwrap();
        let loaded = WorkspaceConfig::load_or_create(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
