//! External solver invocation.
//!
//! The solver is a separate program: the runner writes the namelist and
//! paramlist as JSON files next to it, calls it synchronously and checks
//! that the expected stats file appeared.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::error::{Result, ScmError};
use crate::namelist::{Namelist, SimulationSetup};

#[derive(Debug, Clone)]
pub struct ModelRunner {
    solver_dir: PathBuf,
    build_command: Vec<String>,
    run_command: Vec<String>,
}

impl ModelRunner {
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            solver_dir: config.solver_dir.clone(),
            build_command: config.build_command.clone(),
            run_command: config.run_command.clone(),
        }
    }

    /// Compile the solver's extension modules. No-op without a build command.
    pub fn build(&self) -> Result<()> {
        let Some((program, args)) = self.build_command.split_first() else {
            debug!("no build command configured, skipping build");
            return Ok(());
        };
        info!(dir = %self.solver_dir.display(), "building solver");
        self.execute(program, args.iter().map(String::as_str))
    }

    /// Run `setup` to completion and return the stats file it produced.
    pub fn run(&self, setup: &SimulationSetup) -> Result<PathBuf> {
        let namelist_path = self.solver_dir.join(format!("{}.in", setup.case.name()));
        let paramlist_path = self.solver_dir.join(format!("paramlist_{}.in", setup.case.name()));
        write_json(&namelist_path, &setup.namelist)?;
        write_json(&paramlist_path, &setup.paramlist)?;

        let Some((program, args)) = self.run_command.split_first() else {
            return Err(ScmError::SolverFailed { command: String::new(), status: None });
        };
        // The solver runs inside `solver_dir`, so bare file names resolve.
        let namelist_arg = file_name(&namelist_path);
        let paramlist_arg = file_name(&paramlist_path);
        let args = args
            .iter()
            .map(String::as_str)
            .chain([namelist_arg.as_str(), paramlist_arg.as_str()]);

        info!(case = %setup.case, "running solver");
        self.execute(program, args)?;

        if !setup.outfile.is_file() {
            return Err(ScmError::MissingOutput(setup.outfile.clone()));
        }
        info!(outfile = %setup.outfile.display(), "solver finished");
        Ok(setup.outfile.clone())
    }

    fn execute<'a>(&self, program: &str, args: impl Iterator<Item = &'a str>) -> Result<()> {
        let args: Vec<&str> = args.collect();
        let command = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
        debug!(%command, "spawning");
        let status = Command::new(program).args(&args).current_dir(&self.solver_dir).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(ScmError::SolverFailed { command, status: status.code() })
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned())
}

fn write_json(path: &Path, document: &Namelist) -> Result<()> {
    let text = serde_json::to_string_pretty(document)?;
    fs::write(path, text)?;
    Ok(())
}

/// Delete every `Output.*` directory under `output_root`.
/// A missing root means there is nothing to clean.
pub fn remove_outputs(output_root: &Path) -> Result<usize> {
    let entries = match fs::read_dir(output_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let is_output = entry.file_name().to_string_lossy().starts_with("Output.");
        if is_output && entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!(removed, root = %output_root.display(), "removed simulation output");
    }
    Ok(removed)
}
