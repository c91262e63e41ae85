//! Namelist / paramlist templates and the per-case simulation setup.
//!
//! Both documents are nested JSON objects consumed unchanged by the solver.
//! The built-in templates cover the sections the suites touch; the files the
//! solver's own generator writes can be loaded instead with
//! [`load_templates`].
//! Tests tweak them through `/`-separated key paths, e.g.
//! `setup.namelist.set("microphysics/rain_model", json!(true))`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::case::Case;
use crate::error::{Result, ScmError};

/// A nested JSON configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namelist(Value);

impl Namelist {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('/').try_fold(&self.0, |node, key| node.get(key))
    }

    /// Set `path` to `value`, creating missing intermediate objects.
    /// Fails when an existing intermediate node is not an object.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let mut keys: Vec<&str> = path.split('/').collect();
        let last = keys.pop().filter(|k| !k.is_empty());
        let Some(last) = last else {
            return Err(ScmError::NamelistPath(path.to_string()));
        };
        let mut node = &mut self.0;
        for key in keys {
            let obj = node
                .as_object_mut()
                .ok_or_else(|| ScmError::NamelistPath(path.to_string()))?;
            node = obj.entry(key).or_insert_with(|| Value::Object(Map::new()));
        }
        let obj = node
            .as_object_mut()
            .ok_or_else(|| ScmError::NamelistPath(path.to_string()))?;
        obj.insert(last.to_string(), value);
        Ok(())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Everything the runner needs for one case.
#[derive(Debug, Clone)]
pub struct SimulationSetup {
    pub case: Case,
    pub namelist: Namelist,
    pub paramlist: Namelist,
    /// Stats file the solver is expected to write.
    pub outfile: PathBuf,
}

/// Build the namelist and paramlist for `case` from the built-in templates,
/// writing under `output_root`.
pub fn simulation_setup(case: Case, output_root: &Path) -> Result<SimulationSetup> {
    setup_from(case, namelist_template(case), paramlist_template(case), output_root)
}

/// Read `<case>.in` and `paramlist_<case>.in` from `dir`.
pub fn load_templates(case: Case, dir: &Path) -> Result<(Namelist, Namelist)> {
    let read = |name: String| -> Result<Namelist> {
        let text = fs::read_to_string(dir.join(name))?;
        Ok(serde_json::from_str(&text)?)
    };
    Ok((read(format!("{}.in", case.name()))?, read(format!("paramlist_{}.in", case.name()))?))
}

/// Point given templates at `output_root` and fix the run's uuid.
pub fn setup_from(
    case: Case,
    mut namelist: Namelist,
    paramlist: Namelist,
    output_root: &Path,
) -> Result<SimulationSetup> {
    let uuid = case.name();
    namelist.set("meta/uuid", json!(uuid))?;
    namelist.set("output/output_root", json!(format!("{}/", output_root.display())))?;

    Ok(SimulationSetup {
        case,
        namelist,
        paramlist,
        outfile: outfile_path(case, uuid, output_root),
    })
}

/// `<root>/Output.<case>.<uuid tail>/stats/Stats.<case>.nc`
pub fn outfile_path(case: Case, uuid: &str, output_root: &Path) -> PathBuf {
    let tail_start = uuid.char_indices().rev().nth(4).map_or(0, |(i, _)| i);
    output_root
        .join(format!("Output.{}.{}", case.name(), &uuid[tail_start..]))
        .join("stats")
        .join(format!("Stats.{}.nc", case.name()))
}

struct GridSpec {
    nz: u32,
    dz: f64,
    dt: f64,
    t_max: f64,
}

fn grid_spec(case: Case) -> GridSpec {
    match case {
        Case::DycomsRf01 => GridSpec { nz: 150, dz: 10.0, dt: 2.0, t_max: 4.0 * 3600.0 },
        Case::DryBubble => GridSpec { nz: 200, dz: 50.0, dt: 0.5, t_max: 1000.0 },
        Case::Gabls => GridSpec { nz: 80, dz: 5.0, dt: 1.0, t_max: 12.0 * 3600.0 },
        Case::Rico => GridSpec { nz: 150, dz: 40.0, dt: 2.0, t_max: 24.0 * 3600.0 },
    }
}

fn namelist_template(case: Case) -> Namelist {
    let g = grid_spec(case);
    let stats_frequency = if case == Case::DryBubble { 10.0 } else { 60.0 };
    Namelist(json!({
        "meta": {
            "simname": case.name(),
            "casename": case.name(),
        },
        "grid": {
            "dims": 1,
            "gw": 2,
            "nz": g.nz,
            "dz": g.dz,
        },
        "time_stepping": {
            "dt": g.dt,
            "t_max": g.t_max,
        },
        "thermodynamics": {
            "thermal_variable": "thetal",
            "sgs": "mean",
            "quadrature_type": "log-normal",
            "quadrature_order": 3,
        },
        "microphysics": {
            "rain_model": false,
            "max_supersaturation": 0.1,
        },
        "turbulence": {
            "scheme": "EDMF_PrognosticTKE",
            "EDMF_PrognosticTKE": {
                "updraft_number": 1,
                "entrainment": "moisture_deficit",
                "extrapolate_buoyancy": true,
                "use_steady_updrafts": false,
                "use_local_micro": true,
                "use_damping": true,
                "constant_area": false,
                "calculate_tke": true,
                "calc_scalar_var": false,
                "mixing_length": "sbtd_eq",
            },
        },
        "stats_io": {
            "stats_dir": "stats",
            "frequency": stats_frequency,
        },
        "output": {
            "output_root": "./",
        },
    }))
}

fn paramlist_template(case: Case) -> Namelist {
    // The stable boundary layer wants a stricter bulk Richardson threshold.
    let ri_bulk_crit = if case == Case::Gabls { 0.05 } else { 0.2 };
    Namelist(json!({
        "meta": {
            "casename": case.name(),
        },
        "turbulence": {
            "prandtl_number": 1.0,
            "Ri_bulk_crit": ri_bulk_crit,
            "EDMF_PrognosticTKE": {
                "surface_area": 0.1,
                "tke_ed_coeff": 0.16,
                "tke_diss_coeff": 0.35,
                "max_area_factor": 9.9,
                "entrainment_factor": 0.03,
                "detrainment_factor": 3.0,
                "turbulent_entrainment_factor": 0.05,
                "pressure_buoy_coeff": 1.0 / 3.0,
                "pressure_drag_coeff": 0.375,
                "pressure_plume_spacing": 500.0,
            },
        },
    }))
}
