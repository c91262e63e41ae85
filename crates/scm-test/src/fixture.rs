//! One simulation per case, shared by all of that case's tests.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use scm_core::dataset::NcDataset;
use scm_core::layout::ensure_dir;
use scm_core::namelist::{load_templates, setup_from, simulation_setup};
use scm_core::runner::{remove_outputs, ModelRunner};
use scm_core::synthetic::{self, SyntheticGrid};
use scm_core::{Case, Result};

use crate::scenarios::ScenarioPlan;

/// Where the model output comes from.
#[derive(Clone, Copy)]
pub enum RunMode<'a> {
    Solver(&'a ModelRunner),
    /// Generated output of the right schema; no solver involved.
    Synthetic,
}

/// Removes every `Output.*` directory under `root` when dropped.
struct OutputCleanup {
    root: PathBuf,
}

impl Drop for OutputCleanup {
    fn drop(&mut self) {
        match remove_outputs(&self.root) {
            Ok(n) => debug!(removed = n, "simulation output cleaned up"),
            Err(e) => warn!(error = %e, root = %self.root.display(), "could not remove simulation output"),
        }
    }
}

pub struct SimulationFixture {
    case: Case,
    outfile: PathBuf,
    model: NcDataset,
    // Declared last: the dataset closes before its directory is removed.
    _cleanup: OutputCleanup,
}

impl SimulationFixture {
    /// Clear leftovers of earlier runs, apply the plan's namelist overrides
    /// and produce the model output. Templates come from `templates_dir`
    /// when given. Output is removed again on drop, or right away if this
    /// fails.
    pub fn start(
        plan: &ScenarioPlan,
        output_root: &Path,
        templates_dir: Option<&Path>,
        mode: RunMode<'_>,
    ) -> Result<Self> {
        remove_outputs(output_root)?;
        let cleanup = OutputCleanup { root: output_root.to_path_buf() };

        let mut setup = match templates_dir {
            Some(dir) => {
                let (namelist, paramlist) = load_templates(plan.case, dir)?;
                setup_from(plan.case, namelist, paramlist, output_root)?
            }
            None => simulation_setup(plan.case, output_root)?,
        };
        for (path, value) in &plan.overrides {
            setup.namelist.set(path, value.clone())?;
        }

        let outfile = match mode {
            RunMode::Solver(runner) => runner.run(&setup)?,
            RunMode::Synthetic => {
                if let Some(dir) = setup.outfile.parent() {
                    ensure_dir(dir)?;
                }
                let grid = SyntheticGrid::for_case(plan.case);
                synthetic::write_dataset(&setup.outfile, &synthetic::model_schema(plan.case), &grid)?;
                info!(case = %plan.case, "generated synthetic model output");
                setup.outfile.clone()
            }
        };
        let model = NcDataset::open(&outfile)?;
        Ok(Self { case: plan.case, outfile, model, _cleanup: cleanup })
    }

    pub fn model(&self) -> &NcDataset {
        &self.model
    }

    pub fn outfile(&self) -> &Path {
        &self.outfile
    }

    /// Generate reference data next to the model output, so it is cleaned
    /// up with it.
    pub fn synthetic_reference(&self) -> Result<PathBuf> {
        let path = self.outfile.with_file_name(format!("Reference.{}.nc", self.case.name()));
        let grid = SyntheticGrid::for_case(self.case);
        synthetic::write_dataset(&path, &synthetic::reference_schema(self.case), &grid)?;
        Ok(path)
    }
}
