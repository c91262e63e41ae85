//! Dataset -> plot dictionary conversions.
//!
//! Each reader is a fixed field list. Reference (LES) readers map the LES
//! variable names onto the model's keys so both dictionaries can be plotted
//! against each other. A missing variable fails the whole read.

use ndarray::{Array1, Array2};

use crate::dataset::{Dataset, RawVariable};
use crate::error::{Result, ScmError};
use crate::plot_data::{PlotData, Series};

const KM: f64 = 1.0e-3;
const HOURS: f64 = 1.0 / 3600.0;
const G_PER_KG: f64 = 1.0e3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    TimeAxis,
    HeightAxis,
    /// 2-D `[t, z]` on disk, stored `[z, t]`.
    Profile,
    /// 1-D over time.
    Series,
}

/// One variable a reader extracts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub key: &'static str,
    /// Group holding the variable; empty for root-level variables.
    pub group: &'static str,
    pub name: &'static str,
    pub kind: Kind,
    pub scale: f64,
}

impl Field {
    const fn new(kind: Kind, group: &'static str, key: &'static str) -> Self {
        Self { key, group, name: key, kind, scale: 1.0 }
    }

    const fn time(group: &'static str, name: &'static str) -> Self {
        Self::new(Kind::TimeAxis, group, "t").named(name)
    }

    const fn height(group: &'static str, name: &'static str) -> Self {
        Self::new(Kind::HeightAxis, group, "z_half").named(name)
    }

    const fn profile(key: &'static str) -> Self {
        Self::new(Kind::Profile, "profiles", key)
    }

    const fn series(key: &'static str) -> Self {
        Self::new(Kind::Series, "timeseries", key)
    }

    const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    const fn in_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    const fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn path(&self) -> String {
        if self.group.is_empty() {
            self.name.to_string()
        } else {
            format!("{}/{}", self.group, self.name)
        }
    }
}

// ── Model output ─────────────────────────────────────────────────────────────

pub const SCM_SERIES: &[Field] = &[
    Field::height("profiles", "z_half").scaled(KM),
    Field::time("profiles", "t").scaled(HOURS),
    Field::new(Kind::HeightAxis, "reference", "rho_half").named("rho0_half"),
    Field::profile("thetal_mean"),
    Field::profile("temperature_mean"),
    Field::profile("qt_mean").scaled(G_PER_KG),
    Field::profile("ql_mean").scaled(G_PER_KG),
    Field::profile("qr_mean").scaled(G_PER_KG),
    Field::profile("buoyancy_mean"),
    Field::profile("u_mean"),
    Field::profile("v_mean"),
    Field::profile("tke_mean"),
    Field::profile("cloud_fraction"),
    Field::profile("updraft_area"),
    Field::profile("updraft_w"),
    Field::profile("updraft_qt").scaled(G_PER_KG),
    Field::profile("updraft_ql").scaled(G_PER_KG),
    Field::profile("updraft_qr").scaled(G_PER_KG),
    Field::profile("updraft_thetal"),
    Field::profile("updraft_buoyancy"),
    Field::profile("env_w"),
    Field::profile("env_qt").scaled(G_PER_KG),
    Field::profile("env_ql").scaled(G_PER_KG),
    Field::profile("env_qr").scaled(G_PER_KG),
    Field::profile("env_thetal"),
    Field::profile("massflux"),
    Field::profile("massflux_h"),
    Field::profile("massflux_qt").scaled(G_PER_KG),
    Field::profile("diffusive_flux_h"),
    Field::profile("diffusive_flux_qt").scaled(G_PER_KG),
    Field::profile("total_flux_h"),
    Field::profile("total_flux_qt").scaled(G_PER_KG),
    Field::profile("eddy_viscosity"),
    Field::profile("eddy_diffusivity"),
    Field::profile("mixing_length"),
    Field::profile("entrainment_sc"),
    Field::profile("detrainment_sc"),
    Field::profile("nh_pressure"),
    Field::profile("Hvar_mean"),
    Field::profile("QTvar_mean"),
    Field::profile("HQTcov_mean"),
    Field::profile("env_Hvar"),
    Field::profile("env_QTvar"),
    Field::profile("env_HQTcov"),
    Field::profile("Hvar_dissipation"),
    Field::profile("QTvar_dissipation"),
    Field::profile("HQTcov_dissipation"),
    Field::profile("Hvar_entr_gain"),
    Field::profile("QTvar_entr_gain"),
    Field::profile("HQTcov_entr_gain"),
    Field::profile("Hvar_detr_loss"),
    Field::profile("QTvar_detr_loss"),
    Field::profile("HQTcov_detr_loss"),
    Field::profile("Hvar_shear"),
    Field::profile("QTvar_shear"),
    Field::profile("HQTcov_shear"),
    Field::profile("Hvar_rain"),
    Field::profile("QTvar_rain"),
    Field::profile("HQTcov_rain"),
    Field::profile("tke_entr_gain"),
    Field::profile("tke_detr_loss"),
    Field::profile("tke_advection"),
    Field::profile("tke_buoy"),
    Field::profile("tke_dissipation"),
    Field::profile("tke_pressure"),
    Field::profile("tke_transport"),
    Field::profile("tke_shear"),
];

pub const SCM_TIMESERIES: &[Field] = &[
    Field::time("timeseries", "t").scaled(HOURS),
    Field::series("lwp_mean"),
    Field::series("rwp_mean"),
    Field::series("cloud_cover_mean"),
    Field::series("cloud_top_mean").scaled(KM),
    Field::series("cloud_base_mean").scaled(KM),
    Field::series("updraft_cloud_cover"),
    Field::series("updraft_cloud_top").scaled(KM),
    Field::series("updraft_cloud_base").scaled(KM),
    Field::series("ustar"),
    Field::series("shf"),
    Field::series("lhf"),
    Field::series("Tsurface"),
];

/// Bubble fields keep seconds and metres.
pub const SCM_BUBBLE: &[Field] = &[
    Field::height("profiles", "z_half"),
    Field::time("profiles", "t"),
    Field::profile("updraft_area"),
    Field::profile("updraft_w"),
    Field::profile("updraft_thetal"),
    Field::profile("updraft_buoyancy"),
    Field::profile("thetal_mean"),
];

// ── Reference LES ────────────────────────────────────────────────────────────

pub const LES_SERIES: &[Field] = &[
    Field::height("profiles", "z_half").scaled(KM),
    Field::time("profiles", "t").scaled(HOURS),
    Field::profile("thetal_mean").named("thetali_mean"),
    Field::profile("temperature_mean"),
    Field::profile("qt_mean").scaled(G_PER_KG),
    Field::profile("ql_mean").scaled(G_PER_KG),
    Field::profile("qr_mean").scaled(G_PER_KG),
    Field::profile("buoyancy_mean"),
    Field::profile("u_mean"),
    Field::profile("v_mean"),
    Field::profile("tke_mean"),
    Field::profile("cloud_fraction"),
    Field::profile("updraft_area").named("updraft_fraction"),
    Field::profile("updraft_w"),
    Field::profile("updraft_qt").scaled(G_PER_KG),
    Field::profile("updraft_ql").scaled(G_PER_KG),
    Field::profile("updraft_qr").scaled(G_PER_KG),
    Field::profile("updraft_thetal").named("updraft_thetali"),
    Field::profile("updraft_buoyancy"),
    Field::profile("env_w"),
    Field::profile("env_qt").scaled(G_PER_KG),
    Field::profile("env_ql").scaled(G_PER_KG),
    Field::profile("env_qr").scaled(G_PER_KG),
    Field::profile("env_thetal").named("env_thetali"),
    Field::profile("massflux"),
    Field::profile("massflux_h").named("massflux_thetali"),
    Field::profile("massflux_qt").scaled(G_PER_KG),
    Field::profile("total_flux_h").named("resolved_z_flux_thetali"),
    Field::profile("total_flux_qt").named("resolved_z_flux_qt").scaled(G_PER_KG),
    Field::profile("Hvar_mean").named("thetali_mean2"),
    Field::profile("QTvar_mean").named("qt_mean2"),
    Field::profile("HQTcov_mean").named("qt_thetali_mean"),
    Field::profile("env_Hvar").named("env_thetali2"),
    Field::profile("env_QTvar").named("env_qt2"),
    Field::profile("env_HQTcov").named("env_qt_thetali"),
];

pub const LES_TIMESERIES: &[Field] = &[
    Field::time("timeseries", "t").scaled(HOURS),
    Field::series("lwp_mean").named("lwp"),
    Field::series("rwp_mean").named("rwp"),
    Field::series("cloud_cover_mean").named("cloud_fraction"),
    Field::series("cloud_top_mean").named("cloud_top").scaled(KM),
    Field::series("cloud_base_mean").named("cloud_base").scaled(KM),
    Field::series("ustar").named("friction_velocity_mean"),
    Field::series("shf").named("shf_surface_mean"),
    Field::series("lhf").named("lhf_surface_mean"),
    Field::series("Tsurface").named("surface_temperature"),
];

/// LES bubble output is flat: every variable lives at the root.
pub const LES_BUBBLE: &[Field] = &[
    Field::height("", "z"),
    Field::time("", "t"),
    Field::profile("updraft_area").named("updraft_fraction").in_group(""),
    Field::profile("updraft_w").in_group(""),
    Field::profile("updraft_thetal").named("updraft_thetali").in_group(""),
    Field::profile("updraft_buoyancy").in_group(""),
    Field::profile("thetal_mean").named("thetali_mean").in_group(""),
];

// ── Readers ──────────────────────────────────────────────────────────────────

pub fn read_data_srs(ds: &dyn Dataset) -> Result<PlotData> {
    read_fields(ds, SCM_SERIES)
}

pub fn read_les_data_srs(ds: &dyn Dataset) -> Result<PlotData> {
    read_fields(ds, LES_SERIES)
}

pub fn read_data_timeseries(ds: &dyn Dataset) -> Result<PlotData> {
    read_fields(ds, SCM_TIMESERIES)
}

pub fn read_les_data_timeseries(ds: &dyn Dataset) -> Result<PlotData> {
    read_fields(ds, LES_TIMESERIES)
}

pub fn read_scm_bubble(ds: &dyn Dataset) -> Result<PlotData> {
    read_fields(ds, SCM_BUBBLE)
}

pub fn read_les_bubble(ds: &dyn Dataset) -> Result<PlotData> {
    read_fields(ds, LES_BUBBLE)
}

/// Keys a reader built from `fields` produces.
pub fn expected_keys(fields: &[Field]) -> Vec<&'static str> {
    fields.iter().map(|f| f.key).collect()
}

pub fn read_fields(ds: &dyn Dataset, fields: &[Field]) -> Result<PlotData> {
    let mut data = PlotData::new();
    for field in fields {
        let raw = ds.read(&field.path())?;
        data.insert(field.key, convert(field, raw)?);
    }
    Ok(data)
}

fn convert(field: &Field, raw: RawVariable) -> Result<Series> {
    let shape_error = |expected: &'static str| ScmError::Shape {
        key: field.key.to_string(),
        expected,
        found: raw.shape.clone(),
    };
    let scale = field.scale;
    match field.kind {
        Kind::TimeAxis | Kind::HeightAxis | Kind::Series => {
            if raw.shape.len() != 1 {
                return Err(shape_error("a 1-D variable"));
            }
            Ok(Series::Vector(Array1::from_iter(raw.values.iter().map(|v| v * scale))))
        }
        Kind::Profile => {
            let &[nt, nz] = raw.shape.as_slice() else {
                return Err(shape_error("a [t, z] variable"));
            };
            let tz = Array2::from_shape_vec((nt, nz), raw.values.clone())
                .map_err(|_| shape_error("a [t, z] variable"))?;
            Ok(Series::Matrix(tz.reversed_axes().mapv(|v| v * scale)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use approx::assert_relative_eq;

    use super::*;
    use crate::dataset::MemoryDataset;

    /// Populate every field of `fields` on a `nt` x `nz` grid.
    fn complete(fields: &[Field], nt: usize, nz: usize) -> MemoryDataset {
        let mut ds = MemoryDataset::new("complete");
        for f in fields {
            let var = match f.kind {
                Kind::TimeAxis => RawVariable::new(vec![nt], (0..nt).map(|i| i as f64 * 3600.0).collect()),
                Kind::HeightAxis => RawVariable::new(vec![nz], (0..nz).map(|i| i as f64 * 500.0).collect()),
                Kind::Series => RawVariable::new(vec![nt], vec![0.002; nt]),
                Kind::Profile => RawVariable::new(
                    vec![nt, nz],
                    (0..nt * nz).map(|i| i as f64).collect(),
                ),
            };
            ds.insert(f.path(), var);
        }
        ds
    }

    type Reader = fn(&dyn Dataset) -> Result<PlotData>;

    fn all_readers() -> Vec<(&'static str, Reader, &'static [Field])> {
        vec![
            ("read_data_srs", read_data_srs as Reader, SCM_SERIES),
            ("read_les_data_srs", read_les_data_srs as Reader, LES_SERIES),
            ("read_data_timeseries", read_data_timeseries as Reader, SCM_TIMESERIES),
            ("read_les_data_timeseries", read_les_data_timeseries as Reader, LES_TIMESERIES),
            ("read_scm_bubble", read_scm_bubble as Reader, SCM_BUBBLE),
            ("read_les_bubble", read_les_bubble as Reader, LES_BUBBLE),
        ]
    }

    #[test]
    fn key_set_matches_field_list_exactly() {
        for (name, reader, fields) in all_readers() {
            let data = reader(&complete(fields, 4, 3)).unwrap();
            let got: BTreeSet<&str> = data.keys().collect();
            let want: BTreeSet<&str> = expected_keys(fields).into_iter().collect();
            assert_eq!(got, want, "{name}");
            assert_eq!(data.len(), fields.len(), "{name} has duplicate keys");
        }
    }

    #[test]
    fn any_missing_variable_fails_the_read() {
        for (name, reader, fields) in all_readers() {
            for dropped in fields {
                let mut ds = complete(fields, 2, 2);
                ds.remove(&dropped.path());
                match reader(&ds) {
                    Err(ScmError::MissingVariable { path, .. }) => assert_eq!(path, dropped.path()),
                    other => panic!("{name} without {}: {other:?}", dropped.path()),
                }
            }
        }
    }

    #[test]
    fn profiles_are_transposed_and_scaled() {
        let data = read_data_srs(&complete(SCM_SERIES, 2, 3)).unwrap();
        // On disk qt_mean[t][z] = t*3 + z (kg/kg); in memory [z, t] in g/kg.
        let qt = data.matrix("qt_mean").unwrap();
        assert_eq!(qt.shape(), &[3, 2]);
        assert_relative_eq!(qt[[2, 1]], 5.0 * 1000.0);
        assert_relative_eq!(qt[[1, 0]], 1.0 * 1000.0);
        let theta = data.matrix("thetal_mean").unwrap();
        assert_relative_eq!(theta[[2, 1]], 5.0);
    }

    #[test]
    fn axes_are_converted_to_hours_and_km() {
        let data = read_data_srs(&complete(SCM_SERIES, 3, 3)).unwrap();
        assert_eq!(data.vector("t").unwrap().to_vec(), vec![0.0, 1.0, 2.0]);
        let z = data.vector("z_half").unwrap();
        assert_relative_eq!(z[2], 1.0);
        // Density is not a length.
        assert_relative_eq!(data.vector("rho_half").unwrap()[2], 1000.0);
    }

    #[test]
    fn bubble_readers_keep_si_units() {
        let data = read_les_bubble(&complete(LES_BUBBLE, 3, 3)).unwrap();
        assert_relative_eq!(data.vector("t").unwrap()[2], 7200.0);
        assert_relative_eq!(data.vector("z_half").unwrap()[1], 500.0);
    }

    #[test]
    fn les_names_map_onto_model_keys() {
        let f = LES_SERIES.iter().find(|f| f.key == "updraft_area").unwrap();
        assert_eq!(f.path(), "profiles/updraft_fraction");
        let b = LES_BUBBLE.iter().find(|f| f.key == "thetal_mean").unwrap();
        assert_eq!(b.path(), "thetali_mean");
    }

    #[test]
    fn wrong_rank_is_a_shape_error() {
        let mut ds = complete(SCM_TIMESERIES, 3, 3);
        ds.insert("timeseries/lwp_mean", RawVariable::new(vec![3, 1], vec![0.0; 3]));
        assert!(matches!(read_data_timeseries(&ds), Err(ScmError::Shape { .. })));

        let mut ds = complete(SCM_BUBBLE, 3, 3);
        ds.insert("profiles/updraft_w", RawVariable::new(vec![9], vec![0.0; 9]));
        assert!(matches!(read_scm_bubble(&ds), Err(ScmError::Shape { .. })));
    }
}
