//! Running a scenario plan: fixture, reference data, figures, report.

use std::cell::OnceCell;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, info_span};

use scm_core::dataset::{Dataset, NcDataset};
use scm_core::fetch::{ReferenceFetcher, Transport};
use scm_core::layout::PlotFolders;
use scm_core::plot::{self, Comparison};
use scm_core::{readers, HarnessConfig, PlotData};

use crate::fixture::{RunMode, SimulationFixture};
use crate::scenarios::{FigureKind, Folder, PlotJob, ScenarioPlan, ScenarioTest};

// ── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Outcome {
    pub test: String,
    /// `None` when the test passed.
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct Report {
    outcomes: Vec<Outcome>,
}

impl Report {
    pub fn record(&mut self, test: &str, result: Result<()>) {
        let error = match result {
            Ok(()) => {
                info!(test, "PASSED");
                None
            }
            Err(e) => {
                let message = format!("{e:#}");
                error!(test, error = %message, "FAILED");
                Some(message)
            }
        };
        self.outcomes.push(Outcome { test: test.to_string(), error });
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }
}

// ── Cases ────────────────────────────────────────────────────────────────────

/// Model and reference data shared by the tests of one case.
struct CaseData {
    // Closed before the fixture removes the output it may live in.
    reference: NcDataset,
    fixture: SimulationFixture,
}

/// Run every test of `plan`, recording each outcome. A failure to produce
/// the shared data fails all of the plan's tests.
pub fn run_case<T: Transport>(
    plan: &ScenarioPlan,
    config: &HarnessConfig,
    mode: RunMode<'_>,
    fetcher: &ReferenceFetcher<T>,
    report: &mut Report,
) {
    let _span = info_span!("case", case = %plan.case).entered();
    let data = match prepare(plan, config, mode, fetcher) {
        Ok(data) => data,
        Err(e) => {
            let message = format!("{e:#}");
            for test in &plan.tests {
                report.record(test.name, Err(anyhow::anyhow!("{message}")));
            }
            return;
        }
    };

    let folders = PlotFolders::new(&config.plots_dir, plan.folder);
    for test in &plan.tests {
        let outcome = run_test(plan, test, data.fixture.model(), &data.reference, &folders);
        report.record(test.name, outcome);
    }
}

fn prepare<T: Transport>(
    plan: &ScenarioPlan,
    config: &HarnessConfig,
    mode: RunMode<'_>,
    fetcher: &ReferenceFetcher<T>,
) -> Result<CaseData> {
    let fixture = SimulationFixture::start(plan, &config.output_root, config.templates_dir.as_deref(), mode)
        .with_context(|| format!("{} simulation failed", plan.case))?;
    let reference_path = match mode {
        RunMode::Synthetic => fixture.synthetic_reference()?,
        RunMode::Solver(_) => fetcher
            .ensure(plan.case, config.reference_url(plan.case).as_deref())
            .with_context(|| format!("no reference data for {}", plan.case))?,
    };
    let reference = NcDataset::open(&reference_path)
        .with_context(|| format!("cannot open {}", reference_path.display()))?;
    Ok(CaseData { reference, fixture })
}

pub fn run_test(
    plan: &ScenarioPlan,
    test: &ScenarioTest,
    model: &dyn Dataset,
    reference: &dyn Dataset,
    folders: &PlotFolders,
) -> Result<()> {
    folders.prepare(test.uses_all_variables())?;
    let inputs = Inputs::new(model, reference);
    for job in &test.jobs {
        draw(plan, job, &inputs, folders).with_context(|| format!("{:?} figure failed", job.kind))?;
    }
    Ok(())
}

fn draw(plan: &ScenarioPlan, job: &PlotJob, inputs: &Inputs<'_>, folders: &PlotFolders) -> scm_core::Result<()> {
    let folder: &Path = match job.folder {
        Folder::Main => &folders.main,
        Folder::AllVariables => &folders.all_variables,
    };
    let window = &plan.window;
    match job.kind {
        FigureKind::Mean => plot::plot_mean(inputs.profiles()?, window, folder),
        FigureKind::Closures => plot::plot_closures(inputs.profiles()?, window, job.file, folder),
        FigureKind::Humidities => plot::plot_humidities(inputs.profiles()?, window, job.file, folder),
        FigureKind::UpdraftProperties => plot::plot_updraft_properties(inputs.profiles()?, window, job.file, folder),
        FigureKind::Fluxes => plot::plot_fluxes(inputs.profiles()?, window, job.file, folder),
        FigureKind::TkeComponents => plot::plot_tke_components(inputs.profiles()?, window, job.file, folder),
        FigureKind::TkeBreakdown => plot::plot_tke_breakdown(inputs.profiles()?, window, job.file, folder),
        FigureKind::VarCovarMean => plot::plot_var_covar_mean(inputs.profiles()?, window, job.file, folder),
        FigureKind::VarCovarComponents => {
            plot::plot_var_covar_components(inputs.profiles()?.model, window, job.file, folder)
        }
        FigureKind::Contours => plot::plot_timeseries(inputs.profiles()?, plan.contour_bounds, window.z, folder),
        FigureKind::Timeseries1d => plot::plot_timeseries_1d(inputs.timeseries()?, job.file, folder),
        FigureKind::MainTimeseries => plot::plot_main_timeseries(
            inputs.timeseries()?,
            inputs.profiles()?,
            job.file,
            plan.main_bounds,
            window.z,
            folder,
        ),
        FigureKind::Bubble => plot::plot_bubble(inputs.bubble()?, folder),
    }
}

// ── Plot inputs ──────────────────────────────────────────────────────────────

type Reader = fn(&dyn Dataset) -> scm_core::Result<PlotData>;

/// Plot dictionaries, read on first use and kept for the rest of the test.
struct Inputs<'a> {
    model: &'a dyn Dataset,
    reference: &'a dyn Dataset,
    profiles: OnceCell<(PlotData, PlotData)>,
    timeseries: OnceCell<(PlotData, PlotData)>,
    bubble: OnceCell<(PlotData, PlotData)>,
}

impl<'a> Inputs<'a> {
    fn new(model: &'a dyn Dataset, reference: &'a dyn Dataset) -> Self {
        Self {
            model,
            reference,
            profiles: OnceCell::new(),
            timeseries: OnceCell::new(),
            bubble: OnceCell::new(),
        }
    }

    fn profiles(&self) -> scm_core::Result<Comparison<'_>> {
        self.load(&self.profiles, readers::read_data_srs, readers::read_les_data_srs)
    }

    fn timeseries(&self) -> scm_core::Result<Comparison<'_>> {
        self.load(&self.timeseries, readers::read_data_timeseries, readers::read_les_data_timeseries)
    }

    fn bubble(&self) -> scm_core::Result<Comparison<'_>> {
        self.load(&self.bubble, readers::read_scm_bubble, readers::read_les_bubble)
    }

    fn load<'s>(
        &self,
        cell: &'s OnceCell<(PlotData, PlotData)>,
        read_model: Reader,
        read_reference: Reader,
    ) -> scm_core::Result<Comparison<'s>> {
        if let Some((model, reference)) = cell.get() {
            return Ok(Comparison::new(model, reference));
        }
        let pair = (read_model(self.model)?, read_reference(self.reference)?);
        let (model, reference) = cell.get_or_init(|| pair);
        Ok(Comparison::new(model, reference))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use scm_core::fetch::HttpTransport;
    use scm_core::runner::ModelRunner;
    use scm_core::synthetic::{self, SyntheticGrid};
    use scm_core::Case;

    use super::*;
    use crate::scenarios::plan;

    /// Transport for tests whose reference file is already on disk.
    struct Offline;

    impl Transport for Offline {
        fn fetch(&self, url: &str, _sink: &mut dyn std::io::Write) -> scm_core::Result<u64> {
            Err(scm_core::ScmError::Download { url: url.to_string(), reason: "offline".into() })
        }
    }

    fn config_in(dir: &Path) -> HarnessConfig {
        HarnessConfig {
            solver_dir: dir.join("solver"),
            build_command: Vec::new(),
            output_root: dir.join("output"),
            les_dir: dir.join("les_data"),
            plots_dir: dir.join("plots/output"),
            ..HarnessConfig::default()
        }
    }

    fn pdfs_in(folder: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(folder)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".pdf"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn synthetic_gabls_passes_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let fetcher = ReferenceFetcher::new(Offline, &config.les_dir);
        let mut report = Report::default();

        run_case(&plan(Case::Gabls), &config, RunMode::Synthetic, &fetcher, &mut report);

        assert_eq!(report.failed(), 0, "{:?}", report.outcomes());
        assert_eq!(report.passed(), 2);
        let pdfs = pdfs_in(&config.plots_dir.join("Gabls"));
        assert!(pdfs.contains(&"Gabls_closures.pdf".to_string()));
        assert!(pdfs.contains(&"contour_ql_mean.pdf".to_string()));
        assert!(pdfs.contains(&"timeseries_lwp_mean.pdf".to_string()));
        assert!(!config.output_root.join("Output.GABLS.GABLS").exists());
    }

    #[test]
    fn synthetic_bubble_and_rico_pass() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let fetcher = ReferenceFetcher::new(Offline, &config.les_dir);
        let mut report = Report::default();

        run_case(&plan(Case::DryBubble), &config, RunMode::Synthetic, &fetcher, &mut report);
        run_case(&plan(Case::Rico), &config, RunMode::Synthetic, &fetcher, &mut report);

        assert_eq!(report.failed(), 0, "{:?}", report.outcomes());
        assert!(config.plots_dir.join("DryBubble/bubble_updraft_w.pdf").is_file());
        assert!(config.plots_dir.join("Rico/all_variables/Rico_timeseries_lwp_mean.pdf").is_file());
        assert!(config.plots_dir.join("Rico/Rico_main_timeseries.pdf").is_file());
    }

    /// Fake solver copying a pre-written stats file into place, reference
    /// data already cached locally.
    #[cfg(unix)]
    #[test]
    fn gabls_end_to_end_with_fake_solver() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.solver_dir).unwrap();
        fs::create_dir_all(&config.les_dir).unwrap();

        let grid = SyntheticGrid::for_case(Case::Gabls);
        let staged = dir.path().join("staged.nc");
        synthetic::write_dataset(&staged, &synthetic::model_schema(Case::Gabls), &grid).unwrap();
        synthetic::write_dataset(
            &config.les_dir.join("Gabls.nc"),
            &synthetic::reference_schema(Case::Gabls),
            &grid,
        )
        .unwrap();

        let stats = config.output_root.join("Output.GABLS.GABLS/stats");
        let script = format!(
            "mkdir -p '{0}' && cp '{1}' '{0}/Stats.GABLS.nc'",
            stats.display(),
            staged.display()
        );
        let config = HarnessConfig {
            run_command: vec!["sh".into(), "-c".into(), script, "fake-solver".into()],
            ..config
        };
        let runner = ModelRunner::from_config(&config);
        let fetcher = ReferenceFetcher::new(Offline, &config.les_dir);
        let mut report = Report::default();

        run_case(&plan(Case::Gabls), &config, RunMode::Solver(&runner), &fetcher, &mut report);

        assert_eq!(report.failed(), 0, "{:?}", report.outcomes());
        let contour = config.plots_dir.join("Gabls/contour_thetal_mean.pdf");
        assert!(fs::metadata(&contour).unwrap().len() > 0);
        assert!(!stats.exists());
        assert!(config.solver_dir.join("GABLS.in").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn failed_simulation_fails_every_test_of_the_case() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig { run_command: vec!["true".into()], ..config_in(dir.path()) };
        fs::create_dir_all(&config.solver_dir).unwrap();
        let runner = ModelRunner::from_config(&config);
        let fetcher = ReferenceFetcher::new(Offline, &config.les_dir);
        let mut report = Report::default();

        run_case(&plan(Case::Gabls), &config, RunMode::Solver(&runner), &fetcher, &mut report);
        assert_eq!(report.failed(), plan(Case::Gabls).tests.len());
        assert_eq!(report.passed(), 0);
    }

    #[test]
    #[ignore = "needs the SCAMPy solver one directory up and network access"]
    fn gabls_against_the_real_solver() {
        let mut config = HarnessConfig::default();
        config.output_root = std::path::absolute(&config.output_root).unwrap();
        let runner = ModelRunner::from_config(&config);
        runner.build().unwrap();
        let fetcher = ReferenceFetcher::new(HttpTransport::new(), &config.les_dir);
        let mut report = Report::default();
        run_case(&plan(Case::Gabls), &config, RunMode::Solver(&runner), &fetcher, &mut report);
        assert_eq!(report.failed(), 0, "{:?}", report.outcomes());
    }
}
