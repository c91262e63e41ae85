//! The fixed set of comparison figures.
//!
//! Profile figures average each variable over a [`PlotWindow`] and plot it
//! against height; timeseries figures plot against time; contour figures show
//! the full time-height evolution. Every trace names the plot-data key it
//! reads and whether the reference carries that key too, so a missing key is
//! a lookup error rather than a silently empty panel.

use std::path::Path;

use ndarray::Axis;
use plotters::style::{RGBColor, BLACK, BLUE, CYAN, GREEN, MAGENTA, RED};
use tracing::info;

use super::figure::{data_bounds, ContourPanel, Curve, Figure, LinePanel};
use super::pdf::save_figure;
use super::{in_heights, time_mean, ColorBounds, Comparison, PlotWindow};
use crate::error::{Result, ScmError};
use crate::plot_data::PlotData;

// ── Panel catalog ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Model and reference.
    Both,
    ModelOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct Trace {
    pub key: &'static str,
    pub source: Source,
}

const fn both(key: &'static str) -> Trace {
    Trace { key, source: Source::Both }
}

const fn model(key: &'static str) -> Trace {
    Trace { key, source: Source::ModelOnly }
}

#[derive(Debug, Clone, Copy)]
pub struct PanelSpec {
    pub title: &'static str,
    pub traces: &'static [Trace],
}

const fn panel(title: &'static str, traces: &'static [Trace]) -> PanelSpec {
    PanelSpec { title, traces }
}

/// One file per variable in `plot_mean`.
pub const MEAN_VARIABLES: &[&str] = &[
    "thetal_mean",
    "temperature_mean",
    "qt_mean",
    "ql_mean",
    "qr_mean",
    "buoyancy_mean",
    "u_mean",
    "v_mean",
    "tke_mean",
    "cloud_fraction",
    "updraft_area",
    "updraft_w",
    "updraft_qt",
    "updraft_ql",
    "updraft_thetal",
    "updraft_buoyancy",
    "env_w",
    "env_qt",
    "env_ql",
    "env_thetal",
    "massflux",
    "total_flux_h",
    "total_flux_qt",
    "Hvar_mean",
    "QTvar_mean",
    "HQTcov_mean",
];

pub const CLOSURE_PANELS: &[PanelSpec] = &[
    panel("eddy viscosity", &[model("eddy_viscosity")]),
    panel("eddy diffusivity", &[model("eddy_diffusivity")]),
    panel("mixing length", &[model("mixing_length")]),
    panel("entrainment / detrainment", &[model("entrainment_sc"), model("detrainment_sc")]),
    panel("nonhydrostatic pressure", &[model("nh_pressure")]),
    panel("mass flux", &[both("massflux")]),
];

pub const HUMIDITY_PANELS: &[PanelSpec] = &[
    panel("qt [g/kg]", &[both("qt_mean")]),
    panel("ql [g/kg]", &[both("ql_mean")]),
    panel("qr [g/kg]", &[both("qr_mean")]),
    panel("updraft / env qt [g/kg]", &[both("updraft_qt"), both("env_qt")]),
    panel("updraft / env ql [g/kg]", &[both("updraft_ql"), both("env_ql")]),
    panel("updraft / env qr [g/kg]", &[both("updraft_qr"), both("env_qr")]),
];

pub const UPDRAFT_PANELS: &[PanelSpec] = &[
    panel("updraft area", &[both("updraft_area")]),
    panel("updraft w [m/s]", &[both("updraft_w")]),
    panel("updraft qt [g/kg]", &[both("updraft_qt")]),
    panel("updraft ql [g/kg]", &[both("updraft_ql")]),
    panel("updraft thetal [K]", &[both("updraft_thetal")]),
    panel("updraft buoyancy", &[both("updraft_buoyancy")]),
];

pub const FLUX_PANELS: &[PanelSpec] = &[
    panel("thetal flux", &[both("total_flux_h"), both("massflux_h"), model("diffusive_flux_h")]),
    panel("qt flux", &[both("total_flux_qt"), both("massflux_qt"), model("diffusive_flux_qt")]),
    panel("mass flux", &[both("massflux")]),
];

pub const TKE_COMPONENT_PANELS: &[PanelSpec] = &[
    panel("entrainment gain", &[model("tke_entr_gain")]),
    panel("detrainment loss", &[model("tke_detr_loss")]),
    panel("advection", &[model("tke_advection")]),
    panel("buoyancy", &[model("tke_buoy")]),
    panel("dissipation", &[model("tke_dissipation")]),
    panel("pressure", &[model("tke_pressure")]),
    panel("transport", &[model("tke_transport")]),
    panel("shear", &[model("tke_shear")]),
];

pub const TKE_BREAKDOWN_PANELS: &[PanelSpec] = &[
    panel("tke [m2/s2]", &[both("tke_mean")]),
    panel(
        "tke budget",
        &[
            model("tke_entr_gain"),
            model("tke_detr_loss"),
            model("tke_advection"),
            model("tke_buoy"),
            model("tke_dissipation"),
            model("tke_pressure"),
            model("tke_transport"),
            model("tke_shear"),
        ],
    ),
];

pub const VAR_COVAR_MEAN_PANELS: &[PanelSpec] = &[
    panel("thetal variance", &[both("Hvar_mean"), both("env_Hvar")]),
    panel("qt variance", &[both("QTvar_mean"), both("env_QTvar")]),
    panel("thetal-qt covariance", &[both("HQTcov_mean"), both("env_HQTcov")]),
];

pub const VAR_COVAR_COMPONENT_PANELS: &[PanelSpec] = &[
    panel(
        "thetal variance budget",
        &[
            model("Hvar_dissipation"),
            model("Hvar_entr_gain"),
            model("Hvar_detr_loss"),
            model("Hvar_shear"),
            model("Hvar_rain"),
        ],
    ),
    panel(
        "qt variance budget",
        &[
            model("QTvar_dissipation"),
            model("QTvar_entr_gain"),
            model("QTvar_detr_loss"),
            model("QTvar_shear"),
            model("QTvar_rain"),
        ],
    ),
    panel(
        "thetal-qt covariance budget",
        &[
            model("HQTcov_dissipation"),
            model("HQTcov_entr_gain"),
            model("HQTcov_detr_loss"),
            model("HQTcov_shear"),
            model("HQTcov_rain"),
        ],
    ),
];

/// Time-height contours drawn by `plot_timeseries`, in bounds-list order.
pub const CONTOUR_VARIABLES: &[&str] = &[
    "thetal_mean",
    "env_thetal",
    "updraft_thetal",
    "ql_mean",
    "qr_mean",
    "updraft_ql",
    "env_ql",
    "env_qr",
    "cloud_fraction",
    "updraft_w",
    "updraft_qr",
    "env_qt",
    "updraft_qt",
    "qt_mean",
    "buoyancy_mean",
    "tke_mean",
    "u_mean",
    "v_mean",
    "updraft_area",
    "env_w",
    "massflux",
    "massflux_h",
    "massflux_qt",
    "total_flux_h",
    "total_flux_qt",
    "updraft_buoyancy",
    "HQTcov_mean",
];

/// One file per panel in `plot_timeseries_1d`, named after the first trace.
pub const TIMESERIES_PANELS: &[PanelSpec] = &[
    panel("liquid water path", &[both("lwp_mean")]),
    panel("rain water path", &[both("rwp_mean")]),
    panel("cloud cover", &[both("cloud_cover_mean"), model("updraft_cloud_cover")]),
    panel("cloud top [km]", &[both("cloud_top_mean"), model("updraft_cloud_top")]),
    panel("cloud base [km]", &[both("cloud_base_mean"), model("updraft_cloud_base")]),
    panel("friction velocity [m/s]", &[both("ustar")]),
    panel("sensible heat flux", &[both("shf")]),
    panel("latent heat flux", &[both("lhf")]),
    panel("surface temperature [K]", &[both("Tsurface")]),
];

/// Contours of `plot_main_timeseries`, in bounds order.
pub const MAIN_CONTOURS: [&str; 2] = ["ql_mean", "tke_mean"];

/// Bottom row of `plot_main_timeseries`.
pub const MAIN_LINES: [PanelSpec; 2] = [
    panel("liquid water path", &[both("lwp_mean")]),
    panel("cloud cover", &[both("cloud_cover_mean")]),
];

pub const BUBBLE_VARIABLES: &[&str] =
    &["updraft_area", "updraft_w", "updraft_thetal", "updraft_buoyancy", "thetal_mean"];

// ── Profile figures ──────────────────────────────────────────────────────────

pub fn plot_mean(data: Comparison<'_>, window: &PlotWindow, folder: &Path) -> Result<()> {
    for &key in MEAN_VARIABLES {
        let mut figure = Figure::new(1, 1);
        figure.push(profile_panel(data.model, Some(data.reference), key, &[both(key)], window)?);
        save_figure(&figure, folder, &format!("mean_{key}.pdf"))?;
    }
    info!(folder = %folder.display(), count = MEAN_VARIABLES.len(), "mean profiles written");
    Ok(())
}

pub fn plot_closures(data: Comparison<'_>, window: &PlotWindow, file: &str, folder: &Path) -> Result<()> {
    profile_figure(data.model, Some(data.reference), CLOSURE_PANELS, 3, window, file, folder)
}

pub fn plot_humidities(data: Comparison<'_>, window: &PlotWindow, file: &str, folder: &Path) -> Result<()> {
    profile_figure(data.model, Some(data.reference), HUMIDITY_PANELS, 3, window, file, folder)
}

pub fn plot_updraft_properties(data: Comparison<'_>, window: &PlotWindow, file: &str, folder: &Path) -> Result<()> {
    profile_figure(data.model, Some(data.reference), UPDRAFT_PANELS, 3, window, file, folder)
}

pub fn plot_fluxes(data: Comparison<'_>, window: &PlotWindow, file: &str, folder: &Path) -> Result<()> {
    profile_figure(data.model, Some(data.reference), FLUX_PANELS, 3, window, file, folder)
}

pub fn plot_tke_components(data: Comparison<'_>, window: &PlotWindow, file: &str, folder: &Path) -> Result<()> {
    profile_figure(data.model, Some(data.reference), TKE_COMPONENT_PANELS, 4, window, file, folder)
}

pub fn plot_tke_breakdown(data: Comparison<'_>, window: &PlotWindow, file: &str, folder: &Path) -> Result<()> {
    profile_figure(data.model, Some(data.reference), TKE_BREAKDOWN_PANELS, 2, window, file, folder)
}

pub fn plot_var_covar_mean(data: Comparison<'_>, window: &PlotWindow, file: &str, folder: &Path) -> Result<()> {
    profile_figure(data.model, Some(data.reference), VAR_COVAR_MEAN_PANELS, 3, window, file, folder)
}

/// Model only: the reference has no variance budgets.
pub fn plot_var_covar_components(model: &PlotData, window: &PlotWindow, file: &str, folder: &Path) -> Result<()> {
    profile_figure(model, None, VAR_COVAR_COMPONENT_PANELS, 3, window, file, folder)
}

fn profile_figure(
    model: &PlotData,
    reference: Option<&PlotData>,
    panels: &[PanelSpec],
    cols: usize,
    window: &PlotWindow,
    file: &str,
    folder: &Path,
) -> Result<()> {
    let mut figure = Figure::for_panels(panels.len(), cols);
    for spec in panels {
        figure.push(profile_panel(model, reference, spec.title, spec.traces, window)?);
    }
    save_figure(&figure, folder, file)?;
    Ok(())
}

fn profile_panel(
    model: &PlotData,
    reference: Option<&PlotData>,
    title: &str,
    traces: &[Trace],
    window: &PlotWindow,
) -> Result<LinePanel> {
    let mut curves = Vec::new();
    for (n, trace) in traces.iter().enumerate() {
        if let (Source::Both, Some(reference)) = (trace.source, reference) {
            curves.push(Curve {
                label: format!("LES {}", trace.key),
                color: REFERENCE_COLORS[n % REFERENCE_COLORS.len()],
                points: profile_points(reference, trace.key, window)?,
            });
        }
        curves.push(Curve {
            label: format!("SCM {}", trace.key),
            color: MODEL_COLORS[n % MODEL_COLORS.len()],
            points: profile_points(model, trace.key, window)?,
        });
    }
    Ok(LinePanel {
        title: title.to_string(),
        x_desc: title.to_string(),
        y_desc: "height [km]".to_string(),
        curves,
    })
}

/// `(time-mean value, height)` pairs inside the window's height range.
fn profile_points(data: &PlotData, key: &str, window: &PlotWindow) -> Result<Vec<(f64, f64)>> {
    let t = data.vector("t")?;
    let z = data.vector("z_half")?;
    let mean = time_mean(key, data.matrix(key)?, t, window)?;
    Ok(mean
        .iter()
        .zip(z.iter())
        .filter(|&(_, &zk)| in_heights(window.z, zk))
        .map(|(&v, &zk)| (v, zk))
        .collect())
}

const MODEL_COLORS: [RGBColor; 5] = [RED, BLUE, GREEN, MAGENTA, CYAN];
const REFERENCE_COLORS: [RGBColor; 3] = [BLACK, RGBColor(110, 110, 110), RGBColor(170, 170, 170)];

// ── Timeseries figures ───────────────────────────────────────────────────────

/// Time-height contours, one file `contour_<key>.pdf` per variable with the
/// reference next to the model. `bounds`, when given, pairs up with
/// [`CONTOUR_VARIABLES`]; otherwise both panels share their joint data range.
pub fn plot_timeseries(
    data: Comparison<'_>,
    bounds: Option<&[ColorBounds]>,
    heights: Option<(f64, f64)>,
    folder: &Path,
) -> Result<()> {
    if let Some(bounds) = bounds {
        if bounds.len() != CONTOUR_VARIABLES.len() {
            return Err(ScmError::BoundsMismatch { count: bounds.len(), expected: CONTOUR_VARIABLES.len() });
        }
    }
    for (i, &key) in CONTOUR_VARIABLES.iter().enumerate() {
        let fixed = bounds.map(|b| b[i]);
        let figure = contour_pair(data, key, fixed, heights, AxisUnits::HOURS_KM)?;
        save_figure(&figure, folder, &format!("contour_{key}.pdf"))?;
    }
    info!(folder = %folder.display(), count = CONTOUR_VARIABLES.len(), "contours written");
    Ok(())
}

/// One file `<prefix>timeseries_<key>.pdf` per entry of [`TIMESERIES_PANELS`].
pub fn plot_timeseries_1d(data: Comparison<'_>, prefix: &str, folder: &Path) -> Result<()> {
    for spec in TIMESERIES_PANELS {
        let mut figure = Figure::new(1, 1);
        figure.push(timeseries_panel(data, spec)?);
        let stem = spec.traces.first().map_or(spec.title, |t| t.key);
        save_figure(&figure, folder, &format!("{prefix}timeseries_{stem}.pdf"))?;
    }
    Ok(())
}

/// Contours of [`MAIN_CONTOURS`] above liquid water path and cloud cover.
/// `bounds` fixes the two contour scales.
pub fn plot_main_timeseries(
    timeseries: Comparison<'_>,
    profiles: Comparison<'_>,
    file: &str,
    bounds: Option<[ColorBounds; 2]>,
    heights: Option<(f64, f64)>,
    folder: &Path,
) -> Result<()> {
    let mut figure = Figure::new(MAIN_CONTOURS.len() + 1, 2);
    for (i, key) in MAIN_CONTOURS.into_iter().enumerate() {
        let fixed = bounds.map(|b| b[i]);
        let pair = contour_pair(profiles, key, fixed, heights, AxisUnits::HOURS_KM)?;
        for panel in pair.panels() {
            figure.push(panel.clone());
        }
    }
    for spec in &MAIN_LINES {
        figure.push(timeseries_panel(timeseries, spec)?);
    }
    save_figure(&figure, folder, file)?;
    Ok(())
}

fn timeseries_panel(data: Comparison<'_>, spec: &PanelSpec) -> Result<LinePanel> {
    let mut curves = Vec::new();
    for (n, trace) in spec.traces.iter().enumerate() {
        if trace.source == Source::Both {
            curves.push(Curve {
                label: format!("LES {}", trace.key),
                color: REFERENCE_COLORS[n % REFERENCE_COLORS.len()],
                points: timeseries_points(data.reference, trace.key)?,
            });
        }
        curves.push(Curve {
            label: format!("SCM {}", trace.key),
            color: MODEL_COLORS[n % MODEL_COLORS.len()],
            points: timeseries_points(data.model, trace.key)?,
        });
    }
    Ok(LinePanel {
        title: spec.title.to_string(),
        x_desc: "time [h]".to_string(),
        y_desc: spec.title.to_string(),
        curves,
    })
}

fn timeseries_points(data: &PlotData, key: &str) -> Result<Vec<(f64, f64)>> {
    let t = data.vector("t")?;
    let v = data.vector(key)?;
    Ok(t.iter().copied().zip(v.iter().copied()).collect())
}

// ── Bubble ───────────────────────────────────────────────────────────────────

/// Bubble contours, one file `bubble_<key>.pdf` per [`BUBBLE_VARIABLES`]
/// entry, in seconds and metres.
pub fn plot_bubble(data: Comparison<'_>, folder: &Path) -> Result<()> {
    for &key in BUBBLE_VARIABLES {
        let figure = contour_pair(data, key, None, None, AxisUnits::SECONDS_M)?;
        save_figure(&figure, folder, &format!("bubble_{key}.pdf"))?;
    }
    info!(folder = %folder.display(), "bubble figures written");
    Ok(())
}

// ── Contours ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct AxisUnits {
    time: &'static str,
    height: &'static str,
}

impl AxisUnits {
    const HOURS_KM: Self = Self { time: "time [h]", height: "height [km]" };
    const SECONDS_M: Self = Self { time: "time [s]", height: "height [m]" };
}

/// Reference and model contours of `key` side by side on one colour scale.
fn contour_pair(
    data: Comparison<'_>,
    key: &str,
    bounds: Option<ColorBounds>,
    heights: Option<(f64, f64)>,
    units: AxisUnits,
) -> Result<Figure> {
    let reference = contour_panel(data.reference, key, "LES", heights, units)?;
    let model = contour_panel(data.model, key, "SCM", heights, units)?;
    let shared = bounds.unwrap_or_else(|| {
        data_bounds(reference.values.iter().chain(model.values.iter()).copied())
    });

    let mut figure = Figure::new(1, 2);
    for mut panel in [reference, model] {
        panel.bounds = Some(shared);
        figure.push(panel);
    }
    Ok(figure)
}

fn contour_panel(
    data: &PlotData,
    key: &str,
    label: &str,
    heights: Option<(f64, f64)>,
    units: AxisUnits,
) -> Result<ContourPanel> {
    let t = data.vector("t")?;
    let z = data.vector("z_half")?;
    let values = data.matrix(key)?;
    if values.dim() != (z.len(), t.len()) {
        return Err(ScmError::Shape {
            key: key.to_string(),
            expected: "a [z, t] profile matching the axes",
            found: values.shape().to_vec(),
        });
    }
    let rows: Vec<usize> = (0..z.len()).filter(|&k| in_heights(heights, z[k])).collect();
    Ok(ContourPanel {
        title: format!("{label} {key}"),
        x_desc: units.time.to_string(),
        y_desc: units.height.to_string(),
        x: t.to_vec(),
        y: rows.iter().map(|&k| z[k]).collect(),
        values: values.select(Axis(0), &rows),
        bounds: None,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::dataset::{MemoryDataset, RawVariable};
    use crate::readers::{self, Field, Kind};

    const NT: usize = 7;
    const NZ: usize = 6;

    /// Dataset holding every field of `fields`: hourly output, 200 m levels.
    fn dataset(fields: &[Field]) -> MemoryDataset {
        let mut ds = MemoryDataset::new("plot fixture");
        for f in fields {
            let var = match f.kind {
                Kind::TimeAxis => RawVariable::new(vec![NT], (0..NT).map(|i| i as f64 * 3600.0).collect()),
                Kind::HeightAxis => RawVariable::new(vec![NZ], (0..NZ).map(|k| 100.0 + k as f64 * 200.0).collect()),
                Kind::Series => RawVariable::new(vec![NT], (0..NT).map(|i| (i as f64).sin()).collect()),
                Kind::Profile => RawVariable::new(
                    vec![NT, NZ],
                    (0..NT * NZ).map(|i| 1.0 + 0.01 * i as f64).collect(),
                ),
            };
            ds.insert(f.path(), var);
        }
        ds
    }

    fn read(fields: &[Field], reader: fn(&dyn crate::dataset::Dataset) -> Result<PlotData>) -> PlotData {
        reader(&dataset(fields)).unwrap()
    }

    fn non_empty_pdf(path: &Path) -> bool {
        fs::read(path).map(|b| b.starts_with(b"%PDF")).unwrap_or(false)
    }

    #[test]
    fn profile_figures_render() {
        let dir = tempfile::tempdir().unwrap();
        let scm = read(readers::SCM_SERIES, readers::read_data_srs);
        let les = read(readers::LES_SERIES, readers::read_les_data_srs);
        let data = Comparison::new(&scm, &les);
        let window = PlotWindow::hours(3.0, 6.0).with_heights(0.0, 0.8);

        plot_closures(data, &window, "closures.pdf", dir.path()).unwrap();
        plot_humidities(data, &window, "humidities.pdf", dir.path()).unwrap();
        plot_updraft_properties(data, &window, "updraft.pdf", dir.path()).unwrap();
        plot_fluxes(data, &window, "fluxes.pdf", dir.path()).unwrap();
        plot_tke_components(data, &window, "tke_components.pdf", dir.path()).unwrap();
        plot_tke_breakdown(data, &window, "tke_breakdown.pdf", dir.path()).unwrap();
        plot_var_covar_mean(data, &window, "var_covar_mean.pdf", dir.path()).unwrap();
        plot_var_covar_components(&scm, &window, "var_covar_components.pdf", dir.path()).unwrap();
        plot_mean(data, &window, dir.path()).unwrap();

        for name in ["closures.pdf", "tke_breakdown.pdf", "var_covar_components.pdf", "mean_qt_mean.pdf"] {
            assert!(non_empty_pdf(&dir.path().join(name)), "{name}");
        }
    }

    #[test]
    fn contours_render_with_and_without_fixed_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let scm = read(readers::SCM_SERIES, readers::read_data_srs);
        let les = read(readers::LES_SERIES, readers::read_les_data_srs);
        let data = Comparison::new(&scm, &les);

        plot_timeseries(data, None, None, dir.path()).unwrap();
        assert!(non_empty_pdf(&dir.path().join("contour_ql_mean.pdf")));

        let bounds = vec![ColorBounds::new(0.0, 2.0); CONTOUR_VARIABLES.len()];
        plot_timeseries(data, Some(&bounds), Some((0.0, 0.5)), dir.path()).unwrap();
    }

    #[test]
    fn bounds_list_must_match_variable_list() {
        let dir = tempfile::tempdir().unwrap();
        let scm = read(readers::SCM_SERIES, readers::read_data_srs);
        let les = read(readers::LES_SERIES, readers::read_les_data_srs);
        let err = plot_timeseries(Comparison::new(&scm, &les), Some(&[ColorBounds::new(0.0, 1.0)]), None, dir.path())
            .unwrap_err();
        assert!(matches!(err, ScmError::BoundsMismatch { count: 1, .. }));
    }

    #[test]
    fn timeseries_and_main_figures_render() {
        let dir = tempfile::tempdir().unwrap();
        let scm = read(readers::SCM_SERIES, readers::read_data_srs);
        let les = read(readers::LES_SERIES, readers::read_les_data_srs);
        let scm_t = read(readers::SCM_TIMESERIES, readers::read_data_timeseries);
        let les_t = read(readers::LES_TIMESERIES, readers::read_les_data_timeseries);

        plot_timeseries_1d(Comparison::new(&scm_t, &les_t), "Rico_", dir.path()).unwrap();
        assert!(non_empty_pdf(&dir.path().join("Rico_timeseries_lwp_mean.pdf")));

        plot_main_timeseries(
            Comparison::new(&scm_t, &les_t),
            Comparison::new(&scm, &les),
            "main.pdf",
            Some([ColorBounds::new(0.0, 0.05), ColorBounds::new(0.0, 5.0)]),
            Some((0.0, 4.0)),
            dir.path(),
        )
        .unwrap();
        assert!(non_empty_pdf(&dir.path().join("main.pdf")));
    }

    #[test]
    fn bubble_figures_render() {
        let dir = tempfile::tempdir().unwrap();
        let scm = read(readers::SCM_BUBBLE, readers::read_scm_bubble);
        let les = read(readers::LES_BUBBLE, readers::read_les_bubble);
        plot_bubble(Comparison::new(&scm, &les), dir.path()).unwrap();
        assert!(non_empty_pdf(&dir.path().join("bubble_updraft_w.pdf")));
    }

    #[test]
    fn missing_key_fails_the_figure() {
        let dir = tempfile::tempdir().unwrap();
        let scm = read(readers::SCM_SERIES, readers::read_data_srs);
        // Reference timeseries lack every profile key.
        let les = read(readers::LES_TIMESERIES, readers::read_les_data_timeseries);
        let err = plot_humidities(Comparison::new(&scm, &les), &PlotWindow::hours(0.0, 6.0), "h.pdf", dir.path())
            .unwrap_err();
        assert!(matches!(err, ScmError::MissingKey(_)));
        assert!(!dir.path().join("h.pdf").exists());
    }

    #[test]
    fn window_outside_the_run_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let scm = read(readers::SCM_SERIES, readers::read_data_srs);
        let les = read(readers::LES_SERIES, readers::read_les_data_srs);
        let err = plot_fluxes(Comparison::new(&scm, &les), &PlotWindow::hours(22.0, 24.0), "f.pdf", dir.path())
            .unwrap_err();
        assert!(matches!(err, ScmError::EmptyWindow { .. }));
    }
}
