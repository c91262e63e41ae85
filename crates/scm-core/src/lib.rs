//! Regression and plotting harness for the SCAMPy single-column model.
//!
//! Pipeline per case: setup -> run -> read -> fetch reference -> read
//! reference -> plot. Every stage is synchronous and runs once per case.

pub mod case;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod namelist;
pub mod plot;
pub mod plot_data;
pub mod readers;
pub mod runner;
pub mod synthetic;

pub use case::Case;
pub use config::HarnessConfig;
pub use error::{Result, ScmError};
pub use plot_data::{PlotData, Series};
