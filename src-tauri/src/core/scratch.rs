use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Per-job scratch directory.
///
/// Only the files handed out by [`ScratchDir::file`] are deleted on drop,
/// and the directory itself is removed only if `create` made it. A
/// directory that already existed is left in place with whatever else it
/// holds. Removal is best effort and never fails a finished job.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    created: bool,
    files: Vec<PathBuf>,
}

impl ScratchDir {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let created = !path.is_dir();
        if created {
            fs::create_dir_all(path)?;
            debug!(path = %path.display(), "created scratch directory");
        } else {
            debug!(path = %path.display(), "reusing existing scratch directory");
        }
        Ok(Self {
            path: path.to_path_buf(),
            created,
            files: Vec::new(),
        })
    }

    /// Path for a scratch file; it is deleted when the directory is dropped.
    pub fn file(&mut self, name: &str) -> PathBuf {
        let path = self.path.join(name);
        if !self.files.contains(&path) {
            self.files.push(path.clone());
        }
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        for file in &self.files {
            let _ = fs::remove_file(file);
        }
        if !self.created || !self.path.exists() {
            return;
        }
        match fs::remove_dir(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed scratch directory"),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not remove scratch directory")
            }
        }
    }
}
