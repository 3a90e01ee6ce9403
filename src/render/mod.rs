pub mod colors;
pub mod comparison;
pub mod distribution;
pub mod export;
pub mod viewer;

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::input::TableError;
use crate::stats::StatsError;

pub use viewer::{FigureViewer, HeadlessViewer, SystemViewer};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("TIFF encoding failed: {0}")]
    Tiff(#[from] tiff::TiffError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid colour: {0}")]
    Color(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(value: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(value.to_string())
    }
}

/// Styling shared by every figure. Passed explicitly to each render call.
#[derive(Debug, Clone)]
pub struct FigureStyle {
    pub font_family: String,
    pub dpi: u32,
    pub background: RGBColor,
    pub text_color: RGBColor,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            font_family: "serif".to_string(),
            dpi: 300,
            background: WHITE,
            text_color: BLACK,
        }
    }
}

impl FigureStyle {
    pub fn pt_to_px(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.0
    }

    pub fn inches_to_px(&self, inches: f64) -> u32 {
        (inches * self.dpi as f64).round().max(1.0) as u32
    }

    pub fn font(&self, pt: f64) -> TextStyle<'_> {
        (self.font_family.as_str(), self.pt_to_px(pt))
            .into_font()
            .color(&self.text_color)
    }

    /// Blank titles keep their layout but are painted in the background
    /// colour, so the tight crop trims them without moving the axes.
    pub fn title_font(&self, pt: f64, mode: TitleMode) -> TextStyle<'_> {
        let color = match mode {
            TitleMode::Shown => &self.text_color,
            TitleMode::Blank => &self.background,
        };
        (self.font_family.as_str(), self.pt_to_px(pt))
            .into_font()
            .color(color)
    }
}

/// Whether titles are visible. Saved TIFFs use `Blank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleMode {
    Shown,
    Blank,
}

/// A rasterised figure: tightly packed RGB8 rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFigure {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub dpi: u32,
}

impl RenderedFigure {
    pub fn blank(width: u32, height: u32, dpi: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 3],
            dpi,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Crops to the non-background extent plus `pad` pixels on each side.
    pub fn crop_tight(self, background: RGBColor, pad: u32) -> Self {
        let bg = [background.0, background.1, background.2];
        let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y) != bg {
                    x0 = x0.min(x);
                    y0 = y0.min(y);
                    x1 = x1.max(x);
                    y1 = y1.max(y);
                }
            }
        }
        if x0 == u32::MAX {
            return self;
        }
        let x0 = x0.saturating_sub(pad);
        let y0 = y0.saturating_sub(pad);
        let x1 = (x1 + pad).min(self.width - 1);
        let y1 = (y1 + pad).min(self.height - 1);
        let width = x1 - x0 + 1;
        let height = y1 - y0 + 1;
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for y in y0..=y1 {
            let start = (y as usize * self.width as usize + x0 as usize) * 3;
            pixels.extend_from_slice(&self.pixels[start..start + width as usize * 3]);
        }
        Self {
            width,
            height,
            pixels,
            dpi: self.dpi,
        }
    }
}

/// Paths written by a save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedFigure {
    pub tiff: PathBuf,
    pub png: PathBuf,
}

/// Writes the title-free TIFF and the titled PNG next to each other.
pub fn save_pair(
    save_path: &Path,
    untitled: &RenderedFigure,
    titled: &RenderedFigure,
) -> Result<SavedFigure, RenderError> {
    let tiff = with_suffix(save_path, "tiff");
    let png = with_suffix(save_path, "png");
    export::write_tiff_lzw(&tiff, untitled)?;
    export::write_png(&png, titled)?;
    tracing::info!(tiff = %tiff.display(), png = %png.display(), "saved figure");
    Ok(SavedFigure { tiff, png })
}

/// Appends an extension without replacing dots already in the stem.
pub fn with_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Padding around a tight bounding box (0.1 inch).
pub fn tight_pad(style: &FigureStyle) -> u32 {
    style.dpi / 10
}

pub const Y_TICK_HINT: usize = 6;
pub const X_TICK_HINT: usize = 6;

pub fn key_points(range: Range<f64>, hint: usize) -> Vec<f64> {
    RangedCoordf64::from(range).key_points(hint)
}

pub fn format_tick(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let rounded = v.round();
    if (v - rounded).abs() < 1e-9 * v.abs().max(1.0) {
        return format!("{}", rounded as i64);
    }
    let s = format!("{v:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Horizontal dashed line segments in data coordinates.
pub fn dashed_hline(
    y: f64,
    x: Range<f64>,
    plot_width_px: i32,
    dash_px: f64,
    gap_px: f64,
    style: ShapeStyle,
) -> Vec<PathElement<(f64, f64)>> {
    let per_px = (x.end - x.start) / plot_width_px.max(1) as f64;
    let dash = dash_px * per_px;
    let step = (dash_px + gap_px) * per_px;
    let mut out = Vec::new();
    if step <= 0.0 {
        return out;
    }
    let mut start = x.start;
    while start < x.end {
        let end = (start + dash).min(x.end);
        out.push(PathElement::new(vec![(start, y), (end, y)], style));
        start += step;
    }
    out
}

/// Matplotlib's default grid colour at 0.7 alpha.
pub fn grid_style(style: &FigureStyle) -> ShapeStyle {
    RGBColor(0xb0, 0xb0, 0xb0)
        .mix(0.7)
        .stroke_width(((style.dpi as f64) / 100.0).round().max(1.0) as u32)
}

/// Width of the widest rendered label.
pub fn max_text_width<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    labels: &[String],
    font: &TextStyle,
) -> Result<u32, RenderError>
where
    DB::ErrorType: Send + Sync,
{
    let mut max = 0u32;
    for label in labels {
        let (w, _) = area.estimate_text_size(label, font)?;
        max = max.max(w);
    }
    Ok(max)
}

#[cfg(test)]
#[path = "../../tests/src_inline/render/mod.rs"]
mod tests;
