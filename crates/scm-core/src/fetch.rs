//! Reference LES data: use the local copy, download it when absent.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::info;

use crate::case::Case;
use crate::error::{Result, ScmError};

/// Where downloaded bytes come from.
pub trait Transport {
    /// Stream the body at `url` into `sink`.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;
}

/// Blocking HTTP GET.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { agent: ureq::AgentBuilder::new().build() }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let download_error = |reason: String| ScmError::Download { url: url.to_string(), reason };
        let response = self.agent.get(url).call().map_err(|e| download_error(e.to_string()))?;
        let mut body = response.into_reader();
        io::copy(&mut body, sink).map_err(|e| download_error(e.to_string()))
    }
}

/// Dropbox share links serve an HTML preview unless `dl=1` is requested.
pub fn direct_download_url(url: &str) -> String {
    if url.contains("dropbox.com") {
        url.replace("dl=0", "dl=1")
    } else {
        url.to_string()
    }
}

pub struct ReferenceFetcher<T> {
    transport: T,
    les_dir: PathBuf,
}

impl<T: Transport> ReferenceFetcher<T> {
    pub fn new(transport: T, les_dir: impl Into<PathBuf>) -> Self {
        Self { transport, les_dir: les_dir.into() }
    }

    /// Path of `case`'s reference file, downloading it from `url` first if
    /// it is not on disk. A present file is never re-fetched or verified.
    pub fn ensure(&self, case: Case, url: Option<&str>) -> Result<PathBuf> {
        let target = self.les_dir.join(case.les_file());
        if target.exists() {
            return Ok(target);
        }
        let url = url.ok_or_else(|| ScmError::NoReferenceUrl(case.name().to_string()))?;
        let url = direct_download_url(url);

        fs::create_dir_all(&self.les_dir)?;
        let partial = target.with_extension("nc.part");
        info!(%url, target = %target.display(), "fetching reference LES data");
        let written = {
            let mut file = fs::File::create(&partial)?;
            let n = self.transport.fetch(&url, &mut file);
            if n.is_err() {
                drop(file);
                let _ = fs::remove_file(&partial);
            }
            n?
        };
        fs::rename(&partial, &target)?;
        info!(bytes = written, "reference data stored");
        Ok(target)
    }
}
