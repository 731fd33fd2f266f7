//! [`TestProject`] builder for importer test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory.
///
/// # Example
///
/// ```rust,no_run
/// use import_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.asset("Assets/Sprites/a.png", "0001");
/// project.folder("Assets/Art/Icons", "0002");
/// project.write_settings("importer.toml", "[[rules]]\npattern = 'Assets/.*'\n");
/// project.assert_file_exists("Assets/Sprites/a.png.meta");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a project-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Create a file with its `.meta` sidecar holding `guid`.
    pub fn asset(&self, relative: &str, guid: &str) {
        self.file(relative, "");
        self.meta(relative, guid);
    }

    /// Create a directory with its `.meta` sidecar holding `guid`.
    pub fn folder(&self, relative: &str, guid: &str) {
        fs::create_dir_all(self.path(relative)).unwrap();
        self.meta(relative, guid);
    }

    /// Create a plain file, including parent directories.
    pub fn file(&self, relative: &str, content: &str) {
        let full = self.path(relative);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    /// Write `<relative>.meta` with a `guid:` line.
    pub fn meta(&self, relative: &str, guid: &str) {
        let relative = relative.trim_end_matches('/');
        self.file(
            &format!("{}.meta", relative),
            &format!("fileFormatVersion: 2\nguid: {}\n", guid),
        );
    }

    /// Write a settings file and return its absolute path.
    pub fn write_settings(&self, name: &str, content: &str) -> PathBuf {
        self.file(name, content);
        self.path(name)
    }

    /// Delete a file or directory.
    pub fn remove(&self, relative: &str) {
        let full = self.path(relative);
        if full.is_dir() {
            fs::remove_dir_all(full).unwrap();
        } else {
            fs::remove_file(full).unwrap();
        }
    }

    /// Move a file or directory, carrying its `.meta` sidecar along.
    pub fn rename(&self, from: &str, to: &str) {
        let target = self.path(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::rename(self.path(from), &target).unwrap();
        let meta_from = self.path(&format!("{}.meta", from.trim_end_matches('/')));
        if meta_from.exists() {
            fs::rename(meta_from, self.path(&format!("{}.meta", to.trim_end_matches('/')))).unwrap();
        }
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn assert_file_exists(&self, relative: &str) {
        assert!(
            self.path(relative).exists(),
            "expected {} to exist",
            relative
        );
    }

    pub fn assert_file_missing(&self, relative: &str) {
        assert!(
            !self.path(relative).exists(),
            "expected {} to be absent",
            relative
        );
    }
}
