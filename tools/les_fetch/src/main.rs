//! les_fetch: download reference LES data ahead of a suite run.
//!
//! Files already present in the LES directory are left alone, so this can be
//! re-run safely. Cases without a configured or built-in URL are reported and
//! skipped.
//!
//! Usage:
//!   les_fetch [--config harness.json] [--case Rico ...]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scm_core::fetch::{HttpTransport, ReferenceFetcher};
use scm_core::{Case, HarnessConfig};

#[derive(Parser, Debug)]
#[command(name = "les_fetch", about = "Download reference LES data for the SCAMPy suite")]
struct Args {
    /// Harness configuration (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch only this case (repeatable); all cases when omitted
    #[arg(long = "case")]
    cases: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("Cannot load configuration {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    let cases = if args.cases.is_empty() {
        Case::ALL.to_vec()
    } else {
        args.cases
            .iter()
            .map(|name| name.parse::<Case>().with_context(|| format!("Bad --case {name}")))
            .collect::<Result<Vec<_>>>()?
    };

    let fetcher = ReferenceFetcher::new(HttpTransport::new(), &config.les_dir);
    let mut missing = 0usize;
    for case in cases {
        match fetcher.ensure(case, config.reference_url(case).as_deref()) {
            Ok(path) => info!(%case, path = %path.display(), "reference available"),
            Err(e) => {
                error!(%case, error = %e, "reference unavailable");
                missing += 1;
            }
        }
    }
    if missing > 0 {
        bail!("{missing} reference file(s) could not be obtained");
    }
    Ok(())
}
