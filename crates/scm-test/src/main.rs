//! Regression and plotting suite for the SCAMPy single-column model.
//!
//! Runs the solver once per case, compares its output with reference LES
//! data and writes the comparison figures under `plots/output/<case>/`.
//! Exits non-zero when any test fails.

mod fixture;
mod scenarios;
mod suite;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scm_core::fetch::{HttpTransport, ReferenceFetcher};
use scm_core::runner::ModelRunner;
use scm_core::{Case, HarnessConfig};

use fixture::RunMode;
use suite::Report;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "scm-test", about = "SCAMPy regression and plotting suite")]
struct Args {
    /// Harness configuration (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run only this case (repeatable): DYCOMS_RF01, DryBubble, GABLS, Rico
    #[arg(long = "case")]
    cases: Vec<String>,

    /// Do not rebuild the solver before running
    #[arg(long)]
    skip_build: bool,

    /// Replace solver runs and reference downloads with generated data
    #[arg(long)]
    synthetic: bool,
}

fn select_cases(names: &[String]) -> Result<Vec<Case>> {
    if names.is_empty() {
        return Ok(Case::ALL.to_vec());
    }
    names.iter().map(|n| n.parse::<Case>().map_err(Into::into)).collect()
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("Cannot load configuration {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    // The solver runs in its own directory; its output root must not be relative.
    config.output_root = std::path::absolute(&config.output_root)
        .with_context(|| format!("Cannot resolve {}", config.output_root.display()))?;
    let cases = select_cases(&args.cases)?;

    let runner = ModelRunner::from_config(&config);
    let mode = if args.synthetic {
        RunMode::Synthetic
    } else {
        if !args.skip_build {
            runner.build().context("Solver build failed")?;
        }
        RunMode::Solver(&runner)
    };
    let fetcher = ReferenceFetcher::new(HttpTransport::new(), &config.les_dir);

    let mut report = Report::default();
    for case in cases {
        suite::run_case(&scenarios::plan(case), &config, mode, &fetcher, &mut report);
    }

    for outcome in report.outcomes() {
        match &outcome.error {
            None => eprintln!("  PASS  {}", outcome.test),
            Some(e) => eprintln!("  FAIL  {}: {e}", outcome.test),
        }
    }
    info!(passed = report.passed(), failed = report.failed(), "suite finished");
    if report.failed() > 0 {
        bail!("{} of {} tests failed", report.failed(), report.outcomes().len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_cases_run_by_default() {
        assert_eq!(select_cases(&[]).unwrap(), Case::ALL.to_vec());
    }

    #[test]
    fn case_names_are_checked() {
        let picked = select_cases(&["gabls".to_string(), "Rico".to_string()]).unwrap();
        assert_eq!(picked, vec![Case::Gabls, Case::Rico]);
        assert!(select_cases(&["BOMEX".to_string()]).is_err());
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from(["scm-test", "--case", "GABLS", "--synthetic"]).unwrap();
        assert_eq!(args.cases, vec!["GABLS"]);
        assert!(args.synthetic && !args.skip_build);
        assert!(args.config.is_none());
    }
}
