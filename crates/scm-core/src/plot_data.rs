use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::error::{Result, ScmError};

/// One entry of a plot dictionary.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    /// Axes (`t`, `z_half`) and timeseries.
    Vector(Array1<f64>),
    /// Profiles over time, indexed `[z, t]`.
    Matrix(Array2<f64>),
}

/// Variable name -> values, ready for plotting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotData {
    entries: BTreeMap<String, Series>,
}

impl PlotData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, series: Series) {
        self.entries.insert(key.into(), series);
    }

    pub fn get(&self, key: &str) -> Result<&Series> {
        self.entries.get(key).ok_or_else(|| ScmError::MissingKey(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn vector(&self, key: &str) -> Result<&Array1<f64>> {
        match self.get(key)? {
            Series::Vector(v) => Ok(v),
            Series::Matrix(m) => Err(ScmError::Shape {
                key: key.to_string(),
                expected: "a 1-D series",
                found: m.shape().to_vec(),
            }),
        }
    }

    pub fn matrix(&self, key: &str) -> Result<&Array2<f64>> {
        match self.get(key)? {
            Series::Matrix(m) => Ok(m),
            Series::Vector(v) => Err(ScmError::Shape {
                key: key.to_string(),
                expected: "a [z, t] profile",
                found: vec![v.len()],
            }),
        }
    }
}
