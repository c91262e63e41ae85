//! Panel grid rendered to SVG with `plotters`.

use std::ops::Range;

use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::ColorBounds;
use crate::error::{Result, ScmError};

const PANEL_WIDTH: u32 = 420;
const PANEL_HEIGHT: u32 = 360;
const LINE_WIDTH: u32 = 2;
/// Contour grids are thinned to at most this many cells per axis.
const MAX_CELLS: usize = 160;

// ── Panels ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Curve {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct LinePanel {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub curves: Vec<Curve>,
}

/// Filled time-height plot. `values` is indexed `[y, x]`.
#[derive(Debug, Clone)]
pub struct ContourPanel {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub values: Array2<f64>,
    /// Data range when absent.
    pub bounds: Option<ColorBounds>,
}

#[derive(Debug, Clone)]
pub enum Panel {
    Line(LinePanel),
    Contour(ContourPanel),
}

impl From<LinePanel> for Panel {
    fn from(panel: LinePanel) -> Self {
        Panel::Line(panel)
    }
}

impl From<ContourPanel> for Panel {
    fn from(panel: ContourPanel) -> Self {
        Panel::Contour(panel)
    }
}

/// Panels laid out row by row on a `rows` x `cols` grid.
#[derive(Debug, Clone)]
pub struct Figure {
    rows: usize,
    cols: usize,
    panels: Vec<Panel>,
}

impl Figure {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows: rows.max(1), cols: cols.max(1), panels: Vec::new() }
    }

    /// Smallest grid `cols` wide that holds `n` panels.
    pub fn for_panels(n: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        Self::new(n.div_ceil(cols), cols)
    }

    pub fn push(&mut self, panel: impl Into<Panel>) {
        self.panels.push(panel.into());
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn to_svg(&self) -> Result<String> {
        let size = (PANEL_WIDTH * self.cols as u32, PANEL_HEIGHT * self.rows as u32);
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;
            let areas = root.split_evenly((self.rows, self.cols));
            for (area, panel) in areas.iter().zip(&self.panels) {
                match panel {
                    Panel::Line(p) => draw_lines(area, p)?,
                    Panel::Contour(p) => draw_contour(area, p)?,
                }
            }
            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }
}

fn render_error(e: impl std::fmt::Display) -> ScmError {
    ScmError::Render(e.to_string())
}

// ── Drawing ──────────────────────────────────────────────────────────────────

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

fn draw_lines(area: &Area<'_>, panel: &LinePanel) -> Result<()> {
    let finite: Vec<Vec<(f64, f64)>> = panel
        .curves
        .iter()
        .map(|c| c.points.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite()).collect())
        .collect();
    let x_range = padded_range(finite.iter().flatten().map(|p| p.0));
    let y_range = padded_range(finite.iter().flatten().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .x_desc(panel.x_desc.as_str())
        .y_desc(panel.y_desc.as_str())
        .x_labels(5)
        .draw()
        .map_err(render_error)?;

    for (curve, points) in panel.curves.iter().zip(finite) {
        let color = curve.color;
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(LINE_WIDTH)))
            .map_err(render_error)?
            .label(curve.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH)));
    }
    if !panel.curves.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_contour(area: &Area<'_>, panel: &ContourPanel) -> Result<()> {
    let (ny, nx) = panel.values.dim();
    if ny != panel.y.len() || nx != panel.x.len() {
        return Err(ScmError::Shape {
            key: panel.title.clone(),
            expected: "values matching both contour axes",
            found: vec![ny, nx],
        });
    }
    let xi = thin(nx);
    let yi = thin(ny);
    let x_edges = cell_edges(&xi.iter().map(|&i| panel.x[i]).collect::<Vec<_>>());
    let y_edges = cell_edges(&yi.iter().map(|&j| panel.y[j]).collect::<Vec<_>>());

    let bounds = panel.bounds.unwrap_or_else(|| data_bounds(panel.values.iter().copied()));
    let span = bounds.max - bounds.min;
    let caption = format!("{} [{:.3}, {:.3}]", panel.title, bounds.min, bounds.max);

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(edge_range(&x_edges), edge_range(&y_edges))
        .map_err(render_error)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(panel.x_desc.as_str())
        .y_desc(panel.y_desc.as_str())
        .x_labels(5)
        .draw()
        .map_err(render_error)?;

    let mut cells = Vec::with_capacity(xi.len() * yi.len());
    for (row, &j) in yi.iter().enumerate() {
        for (col, &i) in xi.iter().enumerate() {
            let v = panel.values[[j, i]];
            if !v.is_finite() {
                continue;
            }
            let frac = if span > 0.0 { (v - bounds.min) / span } else { 0.5 };
            cells.push(Rectangle::new(
                [(x_edges[col], y_edges[row]), (x_edges[col + 1], y_edges[row + 1])],
                colormap(frac).filled(),
            ));
        }
    }
    chart.draw_series(cells).map_err(render_error)?;
    Ok(())
}

// ── Ranges and colours ───────────────────────────────────────────────────────

/// Finite min/max of `values`, widened when degenerate.
pub fn data_bounds(values: impl Iterator<Item = f64>) -> ColorBounds {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return ColorBounds::new(0.0, 1.0);
    }
    if hi - lo <= f64::EPSILON * lo.abs().max(1.0) {
        let pad = if lo == 0.0 { 1.0 } else { 0.1 * lo.abs() };
        return ColorBounds::new(lo - pad, hi + pad);
    }
    ColorBounds::new(lo, hi)
}

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let b = data_bounds(values);
    let pad = 0.05 * (b.max - b.min);
    (b.min - pad)..(b.max + pad)
}

fn edge_range(edges: &[f64]) -> Range<f64> {
    match (edges.first(), edges.last()) {
        (Some(&a), Some(&b)) if a < b => a..b,
        (Some(&a), Some(&b)) if b < a => b..a,
        _ => 0.0..1.0,
    }
}

/// Every `stride`-th index so that at most `MAX_CELLS` remain.
fn thin(n: usize) -> Vec<usize> {
    let stride = n.div_ceil(MAX_CELLS).max(1);
    (0..n).step_by(stride).collect()
}

/// Cell boundaries around `centers`, midway between neighbours.
fn cell_edges(centers: &[f64]) -> Vec<f64> {
    match centers {
        [] => Vec::new(),
        [c] => vec![c - 0.5, c + 0.5],
        _ => {
            let n = centers.len();
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centers[0] - 0.5 * (centers[1] - centers[0]));
            edges.extend(centers.windows(2).map(|w| 0.5 * (w[0] + w[1])));
            edges.push(centers[n - 1] + 0.5 * (centers[n - 1] - centers[n - 2]));
            edges
        }
    }
}

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// `frac` in [0, 1] -> viridis-like colour; out-of-range values saturate.
fn colormap(frac: f64) -> RGBColor {
    let f = frac.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
    let i = (f.floor() as usize).min(VIRIDIS.len() - 2);
    let w = f - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let mix = |p: u8, q: u8| (p as f64 + w * (q as f64 - p as f64)).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn edges_sit_between_centres() {
        assert_eq!(cell_edges(&[1.0, 2.0, 4.0]), vec![0.5, 1.5, 3.0, 5.0]);
        assert_eq!(cell_edges(&[3.0]), vec![2.5, 3.5]);
        assert!(cell_edges(&[]).is_empty());
    }

    #[test]
    fn thinning_caps_the_cell_count() {
        assert_eq!(thin(10), (0..10).collect::<Vec<_>>());
        let many = thin(1441);
        assert!(many.len() <= MAX_CELLS);
        assert_eq!(many[0], 0);
    }

    #[test]
    fn bounds_ignore_non_finite_and_widen_constants() {
        let b = data_bounds([1.0, f64::NAN, 3.0, f64::INFINITY].into_iter());
        assert_eq!(b, ColorBounds::new(1.0, 3.0));
        let flat = data_bounds([2.0, 2.0].into_iter());
        assert!(flat.min < 2.0 && flat.max > 2.0);
        assert_eq!(data_bounds(std::iter::empty()), ColorBounds::new(0.0, 1.0));
    }

    #[test]
    fn colormap_saturates_at_both_ends() {
        assert_eq!(colormap(-1.0), RGBColor(68, 1, 84));
        assert_eq!(colormap(2.0), RGBColor(253, 231, 37));
        assert_eq!(colormap(0.5), RGBColor(33, 145, 140));
    }

    #[test]
    fn figure_renders_lines_and_contours() {
        let mut figure = Figure::new(1, 2);
        figure.push(LinePanel {
            title: "qt_mean".into(),
            x_desc: "qt [g/kg]".into(),
            y_desc: "height [km]".into(),
            curves: vec![Curve {
                label: "SCM".into(),
                color: RED,
                points: vec![(1.0, 0.0), (f64::NAN, 0.5), (2.0, 1.0)],
            }],
        });
        figure.push(ContourPanel {
            title: "ql_mean".into(),
            x_desc: "time [h]".into(),
            y_desc: "height [km]".into(),
            x: vec![0.0, 1.0, 2.0],
            y: vec![0.1, 0.3],
            values: array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]],
            bounds: None,
        });
        let svg = figure.to_svg().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn contour_shape_is_checked() {
        let mut figure = Figure::new(1, 1);
        figure.push(ContourPanel {
            title: "tke_mean".into(),
            x_desc: String::new(),
            y_desc: String::new(),
            x: vec![0.0],
            y: vec![0.0, 1.0],
            values: array![[1.0, 2.0]],
            bounds: Some(ColorBounds::new(0.0, 5.0)),
        });
        assert!(matches!(figure.to_svg(), Err(ScmError::Shape { .. })));
    }

    #[test]
    fn grid_grows_to_fit_panels() {
        let f = Figure::for_panels(7, 3);
        assert_eq!((f.rows, f.cols), (3, 3));
        assert_relative_eq!(padded_range([0.0, 10.0].into_iter()).start, -0.5);
    }
}
