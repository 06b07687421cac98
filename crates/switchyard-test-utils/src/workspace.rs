//! [`TestWorkspace`] builder for layered-config test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// File name of the project layer, mirrored here to keep this crate free of
/// workspace dependencies.
pub const PROJECT_FILE: &str = ".switchyard.toml";

/// A temporary directory laid out like a real host:
///
/// ```text
/// <root>/
///   config/            config home (user + machine layer files)
///     config.toml
///     machine.toml
///   work/project/      project root (project layer file)
///     .switchyard.toml
///     src/nested/      working directory used for upward discovery
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use switchyard_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.write_user("[vault]\nbackend = \"1password\"\n");
/// ws.write_project("[vault]\nbackend = \"bitwarden\"\n");
/// assert!(ws.user_file().is_file());
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create the directory skeleton. No layer files are written yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("TestWorkspace::new: failed to create temp dir");
        let ws = Self { temp_dir };
        fs::create_dir_all(ws.config_home()).expect("TestWorkspace::new: config home");
        fs::create_dir_all(ws.working_dir()).expect("TestWorkspace::new: working dir");
        ws
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory holding the user and machine layer files.
    pub fn config_home(&self) -> PathBuf {
        self.root().join("config")
    }

    pub fn user_file(&self) -> PathBuf {
        self.config_home().join("config.toml")
    }

    pub fn machine_file(&self) -> PathBuf {
        self.config_home().join("machine.toml")
    }

    /// Root of the project tree; the project layer file lives here.
    pub fn project_root(&self) -> PathBuf {
        self.root().join("work").join("project")
    }

    pub fn project_file(&self) -> PathBuf {
        self.project_root().join(PROJECT_FILE)
    }

    /// A directory two levels below the project root, for discovery tests.
    pub fn working_dir(&self) -> PathBuf {
        self.project_root().join("src").join("nested")
    }

    pub fn write_user(&self, content: &str) {
        self.write_file(&self.user_file(), content);
    }

    pub fn write_machine(&self, content: &str) {
        self.write_file(&self.machine_file(), content);
    }

    pub fn write_project(&self, content: &str) {
        self.write_file(&self.project_file(), content);
    }

    /// Write `content` to `path`, creating parent directories.
    pub fn write_file(&self, path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("failed to create {}: {e}", parent.display()));
        }
        fs::write(path, content).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    }

    /// Read a file back, panicking with the path when it is missing.
    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
    }

    /// Assert that `path` exists.
    pub fn assert_file_exists(&self, path: &Path) {
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }
}
