//! Comparison figures of model output against reference LES data.
//!
//! `figure` lays out and renders panels, `pdf` turns the rendering into a
//! file, and `catalog` holds the fixed set of figures the test suites draw.

pub mod catalog;
pub mod figure;
pub mod pdf;

use ndarray::{Array1, Array2, Axis};

use crate::error::{Result, ScmError};
use crate::plot_data::PlotData;

pub use catalog::*;

/// Averaging period (and optional height range) for profile figures.
/// Times and heights are in the units of the plot data, hours and km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotWindow {
    pub t0: f64,
    pub t1: f64,
    pub z: Option<(f64, f64)>,
}

impl PlotWindow {
    pub fn hours(t0: f64, t1: f64) -> Self {
        Self { t0, t1, z: None }
    }

    pub fn with_heights(mut self, zmin: f64, zmax: f64) -> Self {
        self.z = Some((zmin, zmax));
        self
    }

    pub fn contains_time(&self, t: f64) -> bool {
        self.t0 <= t && t <= self.t1
    }
}

/// True when `z` lies inside the optional `(zmin, zmax)` range.
pub fn in_heights(range: Option<(f64, f64)>, z: f64) -> bool {
    range.map_or(true, |(lo, hi)| lo <= z && z <= hi)
}

/// Fixed colour scale of a contour panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBounds {
    pub min: f64,
    pub max: f64,
}

impl ColorBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Model output and reference data for the same case.
#[derive(Debug, Clone, Copy)]
pub struct Comparison<'a> {
    pub model: &'a PlotData,
    pub reference: &'a PlotData,
}

impl<'a> Comparison<'a> {
    pub fn new(model: &'a PlotData, reference: &'a PlotData) -> Self {
        Self { model, reference }
    }
}

/// Mean over the samples of a `[z, t]` profile with `t0 <= t <= t1`.
pub fn time_mean(key: &str, profile: &Array2<f64>, t: &Array1<f64>, window: &PlotWindow) -> Result<Array1<f64>> {
    if profile.ncols() != t.len() {
        return Err(ScmError::Shape {
            key: key.to_string(),
            expected: "one column per output time",
            found: profile.shape().to_vec(),
        });
    }
    let columns: Vec<usize> = t
        .iter()
        .enumerate()
        .filter(|&(_, &v)| window.contains_time(v))
        .map(|(i, _)| i)
        .collect();
    profile
        .select(Axis(1), &columns)
        .mean_axis(Axis(1))
        .ok_or(ScmError::EmptyWindow { t0: window.t0, t1: window.t1 })
}
