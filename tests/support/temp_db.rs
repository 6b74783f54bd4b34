use std::path::{Path, PathBuf};

use peloton::adapter::outbound::sqlite::{open, SqliteStore};
use tempfile::TempDir;

/// Migrated SQLite database in a temporary directory.
pub struct TempDb {
    _dir: TempDir,
    path: PathBuf,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(format!("{name}.db"));
        open(path.to_str().expect("utf-8 path")).expect("open and migrate sqlite");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> &str {
        self.path.to_str().expect("utf-8 path")
    }

    /// A fresh store with its own pool over the same file.
    pub fn store(&self) -> SqliteStore {
        SqliteStore::new(open(self.url()).expect("open sqlite"))
    }
}
