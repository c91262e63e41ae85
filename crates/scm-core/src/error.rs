use std::path::PathBuf;

use thiserror::Error;

/// Everything the harness can fail with.
#[derive(Debug, Error)]
pub enum ScmError {
    #[error("unknown case `{0}`")]
    UnknownCase(String),

    #[error("variable `{path}` not found in {dataset}")]
    MissingVariable { path: String, dataset: String },

    #[error("key `{0}` missing from plot data")]
    MissingKey(String),

    #[error("`{key}`: expected {expected}, found shape {found:?}")]
    Shape {
        key: String,
        expected: &'static str,
        found: Vec<usize>,
    },

    #[error("no samples with {t0} <= t <= {t1}")]
    EmptyWindow { t0: f64, t1: f64 },

    #[error("namelist path `{0}` does not lead to an object")]
    NamelistPath(String),

    #[error("`{command}` failed ({})", exit_description(.status))]
    SolverFailed { command: String, status: Option<i32> },

    #[error("solver finished but {} was not written", .0.display())]
    MissingOutput(PathBuf),

    #[error("no reference URL configured for {0}")]
    NoReferenceUrl(String),

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("{count} colour bounds given for {expected} variables")]
    BoundsMismatch { count: usize, expected: usize },

    #[error("render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    NetCdf(#[from] netcdf::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn exit_description(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ScmError>;
