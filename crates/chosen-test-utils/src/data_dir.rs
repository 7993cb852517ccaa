//! [`TestDataDir`] fixture for file-store test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary data directory that is removed when dropped.
///
/// # Example
///
/// ```rust,no_run
/// use chosen_test_utils::TestDataDir;
///
/// let data = TestDataDir::new();
/// data.write("conversations/abc.yaml", "platform: email\n");
/// data.assert_file_exists("conversations/abc.yaml");
/// ```
pub struct TestDataDir {
    temp_dir: TempDir,
}

impl Default for TestDataDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDataDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path for `relative` inside the directory. Nothing is created.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Create the directory `relative` and its parents.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.child(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.child(relative))
            .unwrap_or_else(|e| panic!("failed to read {relative}: {e}"))
    }

    /// File names directly inside `relative`, sorted.
    pub fn entries(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.child(relative))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn assert_file_exists(&self, relative: &str) {
        assert!(
            self.child(relative).is_file(),
            "expected file to exist: {relative}"
        );
    }

    pub fn assert_not_exists(&self, relative: &str) {
        assert!(
            !self.child(relative).exists(),
            "expected path to be absent: {relative}"
        );
    }
}

/// True when the tests run with root privileges.
///
/// Permission tests skip themselves under root, where `chmod 000` does not
/// prevent access.
pub fn is_root() -> bool {
    match std::process::Command::new("id").arg("-u").output() {
        Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
        Err(_) => false,
    }
}
