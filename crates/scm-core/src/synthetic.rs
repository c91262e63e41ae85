//! Generated netCDF files with the schema the readers expect.
//!
//! Used to exercise the read/plot chain without running the solver or
//! downloading reference data. Values are smooth and finite but carry no
//! physical meaning.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::case::Case;
use crate::error::Result;
use crate::readers::{self, Field, Kind};

/// Sampling of a generated dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticGrid {
    pub nt: usize,
    pub nz: usize,
    /// Last output time in seconds.
    pub t_end: f64,
    /// Highest level in metres.
    pub z_top: f64,
}

impl SyntheticGrid {
    /// Covers the full simulated period and column of `case`.
    pub fn for_case(case: Case) -> Self {
        match case {
            Case::DycomsRf01 => Self { nt: 25, nz: 60, t_end: 4.0 * 3600.0, z_top: 1500.0 },
            Case::DryBubble => Self { nt: 21, nz: 80, t_end: 1000.0, z_top: 10_000.0 },
            Case::Gabls => Self { nt: 49, nz: 40, t_end: 12.0 * 3600.0, z_top: 400.0 },
            Case::Rico => Self { nt: 49, nz: 75, t_end: 24.0 * 3600.0, z_top: 6000.0 },
        }
    }

    fn times(&self) -> Vec<f64> {
        linspace(0.0, self.t_end, self.nt)
    }

    fn heights(&self) -> Vec<f64> {
        let dz = self.z_top / self.nz as f64;
        (0..self.nz).map(|k| (k as f64 + 0.5) * dz).collect()
    }
}

/// Field lists found in the solver's stats file for `case`.
pub fn model_schema(case: Case) -> Vec<&'static [Field]> {
    match case {
        Case::DryBubble => vec![readers::SCM_BUBBLE],
        _ => vec![readers::SCM_SERIES, readers::SCM_TIMESERIES],
    }
}

/// Field lists found in the reference LES file for `case`.
pub fn reference_schema(case: Case) -> Vec<&'static [Field]> {
    match case {
        Case::DryBubble => vec![readers::LES_BUBBLE],
        _ => vec![readers::LES_SERIES, readers::LES_TIMESERIES],
    }
}

/// Write every variable named by `schema` to a new netCDF file at `path`.
/// Each group (the root included) gets its own `t` and `z` dimensions.
pub fn write_dataset(path: &Path, schema: &[&[Field]], grid: &SyntheticGrid) -> Result<()> {
    let mut groups: BTreeMap<&str, BTreeMap<&str, Field>> = BTreeMap::new();
    for field in schema.iter().flat_map(|fields| fields.iter()) {
        groups.entry(field.group).or_default().insert(field.name, *field);
    }

    let mut file = netcdf::create(path)?;
    for (ordinal, (group_name, fields)) in groups.iter().enumerate() {
        let mut group = if group_name.is_empty() {
            file.root_mut()
                .ok_or_else(|| io::Error::other("netCDF file has no root group"))?
        } else {
            file.add_group(group_name)?
        };
        group.add_dimension("t", grid.nt)?;
        group.add_dimension("z", grid.nz)?;

        for (index, field) in fields.values().enumerate() {
            let phase = (ordinal * 31 + index) as f64 * 0.37;
            let (dims, values): (&[&str], Vec<f64>) = match field.kind {
                Kind::TimeAxis => (&["t"][..], grid.times()),
                Kind::HeightAxis if field.name.starts_with("rho") => {
                    (&["z"][..], grid.heights().iter().map(|z| 1.2 * (-z / 8000.0).exp()).collect())
                }
                Kind::HeightAxis => (&["z"][..], grid.heights()),
                Kind::Series => (&["t"][..], series_values(grid, phase)),
                Kind::Profile => (&["t", "z"][..], profile_values(grid, phase)),
            };
            let mut var = group.add_variable::<f64>(field.name, dims)?;
            var.put_values(&values, ..)?;
        }
    }
    debug!(path = %path.display(), groups = groups.len(), "wrote synthetic dataset");
    Ok(())
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n).map(|i| start + (end - start) * i as f64 / (n - 1) as f64).collect(),
    }
}

fn series_values(grid: &SyntheticGrid, phase: f64) -> Vec<f64> {
    (0..grid.nt)
        .map(|i| {
            let tf = i as f64 / grid.nt.max(2).saturating_sub(1) as f64;
            1.0 + 0.5 * (2.0 * PI * tf + phase).sin()
        })
        .collect()
}

/// Row-major `[t, z]`.
fn profile_values(grid: &SyntheticGrid, phase: f64) -> Vec<f64> {
    let mut values = Vec::with_capacity(grid.nt * grid.nz);
    for i in 0..grid.nt {
        let tf = i as f64 / grid.nt.max(2).saturating_sub(1) as f64;
        for k in 0..grid.nz {
            let zf = (k as f64 + 0.5) / grid.nz as f64;
            values.push((1.0 + 0.5 * (PI * zf + phase).sin()) * (0.5 + 0.5 * tf));
        }
    }
    values
}
