//! Locations of the file-backed layers

use std::path::Path;

use switchyard_fs::NormalizedPath;

use crate::{ConfigLayer, Environment, Error, Result};

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "switchyard";

/// File name of the user layer inside the config directory.
pub const USER_FILE_NAME: &str = "config.toml";

/// File name of the machine layer inside the config directory.
pub const MACHINE_FILE_NAME: &str = "machine.toml";

/// File name searched for when discovering the project layer.
pub const PROJECT_FILE_NAME: &str = ".switchyard.toml";

/// Environment variable that relocates the user and machine layer directory.
pub const CONFIG_HOME_ENV: &str = "SWITCHYARD_CONFIG_HOME";

/// Where each file-backed layer lives.
///
/// The user and machine layers are single fixed files; the project layer is
/// discovered by walking upward from `search_start` until a directory contains
/// `project_file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPaths {
    pub user: Option<NormalizedPath>,
    pub machine: Option<NormalizedPath>,
    pub search_start: NormalizedPath,
    pub project_file_name: String,
}

impl LayerPaths {
    /// Paths with no user or machine file, searching for a project file from
    /// `search_start`.
    pub fn new(search_start: impl AsRef<Path>) -> Self {
        Self {
            user: None,
            machine: None,
            search_start: NormalizedPath::canonical(search_start),
            project_file_name: PROJECT_FILE_NAME.to_string(),
        }
    }

    /// Platform defaults for this host.
    ///
    /// The config directory is `$SWITCHYARD_CONFIG_HOME` when set, otherwise
    /// the platform config directory:
    /// - Linux: `~/.config/switchyard/`
    /// - macOS: `~/Library/Application Support/switchyard/`
    /// - Windows: `%APPDATA%\switchyard\`
    pub fn platform(search_start: impl AsRef<Path>, env: &Environment) -> Self {
        let config_dir = env
            .get(CONFIG_HOME_ENV)
            .filter(|dir| !dir.is_empty())
            .map(NormalizedPath::new)
            .or_else(|| dirs::config_dir().map(|d| NormalizedPath::new(d.join(APP_DIR_NAME))));

        let paths = Self::new(search_start);
        match config_dir {
            Some(dir) => paths.with_config_dir(dir),
            None => {
                tracing::warn!("No platform config directory; user and machine layers disabled");
                paths
            }
        }
    }

    /// Place the user and machine files inside `dir`.
    pub fn with_config_dir(self, dir: impl Into<NormalizedPath>) -> Self {
        let dir = dir.into();
        Self {
            user: Some(dir.join(USER_FILE_NAME)),
            machine: Some(dir.join(MACHINE_FILE_NAME)),
            ..self
        }
    }

    pub fn with_user_file(mut self, path: impl Into<NormalizedPath>) -> Self {
        self.user = Some(path.into());
        self
    }

    pub fn with_machine_file(mut self, path: impl Into<NormalizedPath>) -> Self {
        self.machine = Some(path.into());
        self
    }

    pub fn with_project_file_name(mut self, name: impl Into<String>) -> Self {
        self.project_file_name = name.into();
        self
    }

    /// Find the nearest project file at or above `search_start`.
    ///
    /// Stops at the first match or at the filesystem root.
    pub fn discover_project(&self) -> Option<NormalizedPath> {
        self.search_start
            .ancestors()
            .map(|dir| dir.join(&self.project_file_name))
            .find(NormalizedPath::is_file)
    }

    /// The file a read of `layer` consults, if any.
    pub fn read_path(&self, layer: ConfigLayer) -> Option<NormalizedPath> {
        match layer {
            ConfigLayer::Project => self.discover_project(),
            ConfigLayer::Machine => self.machine.clone(),
            ConfigLayer::User => self.user.clone(),
            ConfigLayer::Environment | ConfigLayer::Default => None,
        }
    }

    /// The file a write to `layer` targets.
    ///
    /// Project writes go to the discovered project file, or to a new one in
    /// `search_start` when none exists yet.
    pub fn write_path(&self, layer: ConfigLayer) -> Result<NormalizedPath> {
        match layer {
            ConfigLayer::Environment | ConfigLayer::Default => {
                Err(Error::ReadOnlyLayer { layer })
            }
            ConfigLayer::Project => Ok(self
                .discover_project()
                .unwrap_or_else(|| self.search_start.join(&self.project_file_name))),
            ConfigLayer::Machine | ConfigLayer::User => self
                .read_path(layer)
                .ok_or(Error::NoLayerPath { layer }),
        }
    }
}
