//! Harness configuration, read from a JSON file.
//!
//! Every field has a default matching the layout of the model repository
//! (solver one directory up, reference data in `les_data/`, figures in
//! `plots/output/`), so an empty `{}` file is a valid configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::case::Case;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory holding the solver sources and its `main.py`.
    pub solver_dir: PathBuf,
    /// Command run once in `solver_dir` before any case; empty skips the build.
    pub build_command: Vec<String>,
    /// Command running one case; namelist and paramlist paths are appended.
    pub run_command: Vec<String>,
    /// Directory with solver-generated `<case>.in` / `paramlist_<case>.in`
    /// files to start from; the built-in templates are used when unset.
    pub templates_dir: Option<PathBuf>,
    /// Where the solver writes its `Output.*` directories.
    pub output_root: PathBuf,
    /// Local cache of reference LES files.
    pub les_dir: PathBuf,
    /// Root of the per-case figure folders.
    pub plots_dir: PathBuf,
    /// Per-case overrides of the reference download URL, keyed by case name.
    pub reference_urls: BTreeMap<String, String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            solver_dir: PathBuf::from(".."),
            build_command: ["python", "setup.py", "build_ext", "--inplace"]
                .map(String::from)
                .to_vec(),
            run_command: ["python", "main.py"].map(String::from).to_vec(),
            templates_dir: None,
            output_root: PathBuf::from("."),
            les_dir: PathBuf::from("les_data"),
            plots_dir: PathBuf::from("plots/output"),
            reference_urls: BTreeMap::new(),
        }
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Configured override first, then the case's built-in URL.
    pub fn reference_url(&self, case: Case) -> Option<String> {
        self.reference_urls
            .get(case.name())
            .cloned()
            .or_else(|| case.default_les_url().map(String::from))
    }

    pub fn reference_path(&self, case: Case) -> PathBuf {
        self.les_dir.join(case.les_file())
    }
}
