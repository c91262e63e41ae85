//! Per-case test plans: what to change in the namelist, which window to
//! average over and which figures each test draws where.

use serde_json::{json, Value};

use scm_core::plot::{ColorBounds, PlotWindow};
use scm_core::Case;

/// Figure-drawing call of the plot catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureKind {
    Mean,
    Closures,
    Humidities,
    UpdraftProperties,
    Fluxes,
    TkeComponents,
    TkeBreakdown,
    VarCovarMean,
    VarCovarComponents,
    Contours,
    Timeseries1d,
    MainTimeseries,
    Bubble,
}

/// Sub-folder of the case's figure folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Main,
    AllVariables,
}

#[derive(Debug, Clone, Copy)]
pub struct PlotJob {
    pub kind: FigureKind,
    /// File name, or file-name prefix for figures writing one file per variable.
    pub file: &'static str,
    pub folder: Folder,
}

const fn job(kind: FigureKind, file: &'static str, folder: Folder) -> PlotJob {
    PlotJob { kind, file, folder }
}

#[derive(Debug, Clone)]
pub struct ScenarioTest {
    pub name: &'static str,
    pub jobs: Vec<PlotJob>,
}

impl ScenarioTest {
    pub fn uses_all_variables(&self) -> bool {
        self.jobs.iter().any(|j| j.folder == Folder::AllVariables)
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub case: Case,
    /// Figure folder under the plots directory.
    pub folder: &'static str,
    /// Namelist changes applied on top of the case defaults.
    pub overrides: Vec<(&'static str, Value)>,
    pub window: PlotWindow,
    /// Fixed scales for `Contours`, one per contour variable.
    pub contour_bounds: Option<&'static [ColorBounds]>,
    /// Fixed scales for the two `MainTimeseries` contours.
    pub main_bounds: Option<[ColorBounds; 2]>,
    pub tests: Vec<ScenarioTest>,
}

pub fn plan(case: Case) -> ScenarioPlan {
    match case {
        Case::DycomsRf01 => dycoms_rf01_drizzle(),
        Case::DryBubble => dry_bubble(),
        Case::Gabls => gabls(),
        Case::Rico => rico(),
    }
}

fn dycoms_rf01_drizzle() -> ScenarioPlan {
    use FigureKind::*;
    use Folder::*;
    ScenarioPlan {
        case: Case::DycomsRf01,
        folder: "DYCOMS_RF01_drizzle",
        overrides: vec![
            ("thermodynamics/sgs", json!("quadrature")),
            ("microphysics/rain_model", json!(true)),
            ("microphysics/max_supersaturation", json!(0.05)),
        ],
        window: PlotWindow::hours(3.0, 4.0),
        contour_bounds: None,
        main_bounds: None,
        tests: vec![
            ScenarioTest {
                name: "plot_timeseries_DYCOMS_RF01",
                jobs: vec![
                    job(Closures, "drizzle_DYCOMS_RF01_closures.pdf", Main),
                    job(Humidities, "drizzle_DYCOMS_RF01_humidities.pdf", Main),
                    job(UpdraftProperties, "drizzle_DYCOMS_RF01_updraft_properties.pdf", Main),
                    job(TkeComponents, "drizzle_DYCOMS_RF01_tke_components.pdf", Main),
                    job(Contours, "", AllVariables),
                    job(Mean, "", AllVariables),
                    job(VarCovarMean, "drizzle_DYCOMS_RF01_var_covar_mean.pdf", AllVariables),
                    job(VarCovarComponents, "drizzle_DYCOMS_RF01_var_covar_components.pdf", AllVariables),
                    job(TkeBreakdown, "drizzle_DYCOMS_RF01_tke_breakdown.pdf", AllVariables),
                ],
            },
            ScenarioTest {
                name: "plot_timeseries_1D_DYCOMS_RF01",
                jobs: vec![
                    job(MainTimeseries, "DYCOMS_RF01_drizzle_main_timeseries.pdf", Main),
                    job(Timeseries1d, "", AllVariables),
                ],
            },
        ],
    }
}

fn dry_bubble() -> ScenarioPlan {
    ScenarioPlan {
        case: Case::DryBubble,
        folder: "DryBubble",
        overrides: Vec::new(),
        // Bubble figures show the whole run.
        window: PlotWindow::hours(0.0, f64::INFINITY),
        contour_bounds: None,
        main_bounds: None,
        tests: vec![ScenarioTest {
            name: "plot_DryBubble",
            jobs: vec![job(FigureKind::Bubble, "", Folder::Main)],
        }],
    }
}

fn gabls() -> ScenarioPlan {
    use FigureKind::*;
    use Folder::*;
    ScenarioPlan {
        case: Case::Gabls,
        folder: "Gabls",
        overrides: vec![("turbulence/EDMF_PrognosticTKE/calc_scalar_var", json!(true))],
        window: PlotWindow::hours(10.0, 12.0),
        contour_bounds: None,
        main_bounds: None,
        tests: vec![
            ScenarioTest {
                name: "plot_timeseries_Gabls",
                jobs: vec![
                    job(Contours, "", Main),
                    job(Mean, "", Main),
                    job(Closures, "Gabls_closures.pdf", Main),
                    job(VarCovarMean, "Gabls_var_covar_mean.pdf", Main),
                    job(VarCovarComponents, "Gabls_var_covar_components.pdf", Main),
                    job(TkeComponents, "Gabls_tke_components.pdf", Main),
                    job(TkeBreakdown, "Gabls_tke_breakdown.pdf", Main),
                ],
            },
            ScenarioTest {
                name: "plot_timeseries_1D_Gabls",
                jobs: vec![job(Timeseries1d, "", Main)],
            },
        ],
    }
}

/// Fixed contour scales for Rico, paired with `CONTOUR_VARIABLES`.
pub const RICO_CONTOUR_BOUNDS: &[ColorBounds] = &[
    ColorBounds::new(296.0, 330.0),
    ColorBounds::new(296.0, 330.0),
    ColorBounds::new(297.0, 308.0),
    ColorBounds::new(0.0, 0.04),
    ColorBounds::new(0.0, 0.02),
    ColorBounds::new(0.0, 1.5),
    ColorBounds::new(0.0, 0.05),
    ColorBounds::new(0.0, 0.03),
    ColorBounds::new(0.0, 100.0),
    ColorBounds::new(0.0, 3.0),
    ColorBounds::new(9.0, 100.0),
    ColorBounds::new(0.0, 18.0),
    ColorBounds::new(0.0, 18.0),
    ColorBounds::new(9.0, 18.0),
    ColorBounds::new(-0.2, 0.0),
    ColorBounds::new(0.0, 4.0),
    ColorBounds::new(-10.0, 3.0),
    ColorBounds::new(-7.0, -3.0),
    ColorBounds::new(0.0, 0.24),
    ColorBounds::new(-0.05, 0.03),
    ColorBounds::new(0.0, 1.5),
    ColorBounds::new(-0.2, 0.04),
    ColorBounds::new(-0.05, 0.05),
    ColorBounds::new(-0.2, 0.04),
    ColorBounds::new(0.0, 0.3),
    ColorBounds::new(-0.3, 0.05),
    ColorBounds::new(-1.0e-4, 4.0e-4),
];

fn rico() -> ScenarioPlan {
    use FigureKind::*;
    use Folder::*;
    ScenarioPlan {
        case: Case::Rico,
        folder: "Rico",
        overrides: Vec::new(),
        window: PlotWindow::hours(22.0, 24.0).with_heights(0.0, 4.0),
        contour_bounds: Some(RICO_CONTOUR_BOUNDS),
        main_bounds: Some([ColorBounds::new(0.0, 0.05), ColorBounds::new(0.0, 5.0)]),
        tests: vec![ScenarioTest {
            name: "plot_Rico",
            jobs: vec![
                job(Closures, "Rico_closures.pdf", Main),
                job(Humidities, "Rico_humidities.pdf", Main),
                job(UpdraftProperties, "Rico_updraft_properties.pdf", Main),
                job(Fluxes, "Rico_mean_fluxes.pdf", Main),
                job(TkeComponents, "Rico_tke_components.pdf", Main),
                job(VarCovarMean, "Rico_var_covar_mean.pdf", AllVariables),
                job(VarCovarComponents, "Rico_var_covar_components.pdf", AllVariables),
                job(TkeBreakdown, "Rico_tke_breakdown.pdf", AllVariables),
                job(Contours, "", AllVariables),
                job(Mean, "", AllVariables),
                job(MainTimeseries, "Rico_main_timeseries.pdf", Main),
                job(Timeseries1d, "Rico_", AllVariables),
            ],
        }],
    }
}

#[cfg(test)]
mod tests {
    use scm_core::namelist::simulation_setup;
    use scm_core::plot::CONTOUR_VARIABLES;

    use super::*;

    #[test]
    fn every_case_has_a_plan_with_tests() {
        for case in Case::ALL {
            let plan = plan(case);
            assert_eq!(plan.case, case);
            assert!(!plan.tests.is_empty(), "{case}");
            assert!(plan.tests.iter().all(|t| !t.jobs.is_empty()), "{case}");
        }
    }

    #[test]
    fn fixed_contour_bounds_cover_every_contour_variable() {
        assert_eq!(RICO_CONTOUR_BOUNDS.len(), CONTOUR_VARIABLES.len());
        for b in RICO_CONTOUR_BOUNDS {
            assert!(b.min < b.max, "{b:?}");
        }
    }

    #[test]
    fn rico_scales_sit_on_their_variables() {
        let bounds_of = |key: &str| {
            let i = CONTOUR_VARIABLES.iter().position(|&k| k == key).unwrap();
            RICO_CONTOUR_BOUNDS[i]
        };
        assert_eq!(bounds_of("thetal_mean"), ColorBounds::new(296.0, 330.0));
        assert_eq!(bounds_of("updraft_thetal"), ColorBounds::new(297.0, 308.0));
        assert_eq!(bounds_of("cloud_fraction"), ColorBounds::new(0.0, 100.0));
        assert_eq!(bounds_of("updraft_qr"), ColorBounds::new(9.0, 100.0));
        assert_eq!(bounds_of("qt_mean"), ColorBounds::new(9.0, 18.0));
        assert_eq!(bounds_of("v_mean"), ColorBounds::new(-7.0, -3.0));
        assert_eq!(bounds_of("HQTcov_mean"), ColorBounds::new(-1.0e-4, 4.0e-4));
    }

    #[test]
    fn overrides_land_in_existing_sections() {
        let root = std::path::Path::new("/tmp/scm");
        for case in Case::ALL {
            let plan = plan(case);
            let mut setup = simulation_setup(case, root).unwrap();
            for (path, value) in &plan.overrides {
                let section = path.rsplit_once('/').map(|(s, _)| s).unwrap();
                assert!(setup.namelist.get(section).is_some(), "{path}");
                setup.namelist.set(path, value.clone()).unwrap();
                assert_eq!(setup.namelist.get(path), Some(value));
            }
        }
    }

    #[test]
    fn folders_match_the_figure_layout() {
        assert_eq!(plan(Case::DycomsRf01).folder, "DYCOMS_RF01_drizzle");
        assert!(plan(Case::Rico).tests[0].uses_all_variables());
        assert!(!plan(Case::Gabls).tests.iter().any(ScenarioTest::uses_all_variables));
    }
}
