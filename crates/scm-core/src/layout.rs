//! On-disk layout of the figure folders.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Create `dir` (and parents) unless it already exists as a directory.
/// Anything else in the way, or a real I/O failure, is an error.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// `<plots_dir>/<folder>/` and its `all_variables/` sub-folder.
#[derive(Debug, Clone)]
pub struct PlotFolders {
    pub main: PathBuf,
    pub all_variables: PathBuf,
}

impl PlotFolders {
    pub fn new(plots_dir: &Path, folder: &str) -> Self {
        let main = plots_dir.join(folder);
        let all_variables = main.join("all_variables");
        Self { main, all_variables }
    }

    /// Idempotent: safe to call before every test of a case.
    pub fn prepare(&self, with_all_variables: bool) -> Result<()> {
        ensure_dir(&self.main)?;
        if with_all_variables {
            ensure_dir(&self.all_variables)?;
        }
        Ok(())
    }
}
