//! Named-variable access to netCDF datasets.
//!
//! Readers only need "give me the values and shape of `group/name`", so that
//! is the whole trait. `NcDataset` serves files; `MemoryDataset` serves
//! values built in code.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScmError};

/// Values of one variable, row-major in its netCDF dimension order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariable {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl RawVariable {
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        Self { shape, values }
    }
}

pub trait Dataset {
    /// Short description used in error messages.
    fn describe(&self) -> String;

    /// Read `path`, either `group/name` or a bare root-level name.
    fn read(&self, path: &str) -> Result<RawVariable>;
}

/// A netCDF file opened read-only.
pub struct NcDataset {
    file: netcdf::File,
    path: PathBuf,
}

impl NcDataset {
    pub fn open(path: &Path) -> Result<Self> {
        let file = netcdf::open(path)?;
        Ok(Self { file, path: path.to_path_buf() })
    }

    fn missing(&self, path: &str) -> ScmError {
        ScmError::MissingVariable { path: path.to_string(), dataset: self.describe() }
    }
}

impl Dataset for NcDataset {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self, path: &str) -> Result<RawVariable> {
        let var = match path.split_once('/') {
            Some((group, name)) => {
                let group = self.file.group(group)?.ok_or_else(|| self.missing(path))?;
                let var = group.variable(name).ok_or_else(|| self.missing(path))?;
                read_variable(&var)?
            }
            None => {
                let var = self.file.variable(path).ok_or_else(|| self.missing(path))?;
                read_variable(&var)?
            }
        };
        Ok(var)
    }
}

fn read_variable(var: &netcdf::Variable) -> Result<RawVariable> {
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let values = var.get_values::<f64, _>(..)?;
    Ok(RawVariable { shape, values })
}

/// In-memory dataset keyed by full variable path.
#[derive(Debug, Default, Clone)]
pub struct MemoryDataset {
    name: String,
    variables: HashMap<String, RawVariable>,
}

impl MemoryDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), variables: HashMap::new() }
    }

    pub fn insert(&mut self, path: impl Into<String>, var: RawVariable) {
        self.variables.insert(path.into(), var);
    }

    pub fn remove(&mut self, path: &str) -> Option<RawVariable> {
        self.variables.remove(path)
    }
}

impl Dataset for MemoryDataset {
    fn describe(&self) -> String {
        format!("in-memory dataset `{}`", self.name)
    }

    fn read(&self, path: &str) -> Result<RawVariable> {
        self.variables.get(path).cloned().ok_or_else(|| ScmError::MissingVariable {
            path: path.to_string(),
            dataset: self.describe(),
        })
    }
}
