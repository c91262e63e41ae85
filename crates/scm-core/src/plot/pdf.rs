//! SVG -> PDF conversion and figure files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use svg2pdf::usvg;
use tracing::debug;

use super::figure::Figure;
use crate::error::{Result, ScmError};

/// System fonts, scanned once per process.
fn fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb = fonts();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| ScmError::Render(e.to_string()))?;
    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), svg2pdf::PageOptions::default())
        .map_err(|e| ScmError::Render(format!("PDF conversion: {e:?}")))
}

/// Render `figure` to `<folder>/<file_name>`. `folder` must already exist.
pub fn save_figure(figure: &Figure, folder: &Path, file_name: &str) -> Result<PathBuf> {
    let pdf = svg_to_pdf(&figure.to_svg()?)?;
    let path = folder.join(file_name);
    fs::write(&path, &pdf)?;
    debug!(path = %path.display(), bytes = pdf.len(), "figure written");
    Ok(path)
}
