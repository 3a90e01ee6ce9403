use std::path::PathBuf;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;

use crate::input::Table;
use crate::metric::TMB_COLUMN;
use crate::render::colors::STEELBLUE;
use crate::render::{
    FigureStyle, FigureViewer, RenderError, RenderedFigure, SavedFigure, TitleMode, X_TICK_HINT,
    Y_TICK_HINT, dashed_hline, format_tick, grid_style, key_points, max_text_width, save_pair,
    tight_pad,
};
use crate::stats::{HistogramBins, finite_values, histogram_bins};

#[derive(Debug, Clone)]
pub struct DistributionConfig {
    pub column: String,
    pub bins: usize,
    pub color: RGBColor,
    pub alpha: f64,
    pub ylabel: String,
    /// `None` gives "Distribution of {column} (n={count})".
    pub title: Option<String>,
    pub title_size: f64,
    pub xlabel_size: f64,
    pub ylabel_size: f64,
    pub xticks_size: f64,
    pub yticks_size: f64,
    pub grid: bool,
    /// Width and height in inches.
    pub figsize: (f64, f64),
    /// Written as `{save_path}.tiff` and `{save_path}.png`.
    pub save_path: Option<PathBuf>,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            column: TMB_COLUMN.to_string(),
            bins: 30,
            color: STEELBLUE,
            alpha: 0.6,
            ylabel: "Frequency".to_string(),
            title: None,
            title_size: 22.0,
            xlabel_size: 20.0,
            ylabel_size: 20.0,
            xticks_size: 18.0,
            yticks_size: 18.0,
            grid: true,
            figsize: (5.0, 4.0),
            save_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionOutcome {
    pub column: String,
    pub title: String,
    pub n: usize,
    pub bins: HistogramBins,
    pub saved: Option<SavedFigure>,
}

pub fn default_title(column: &str, n: usize) -> String {
    format!("Distribution of {column} (n={n})")
}

/// Everything the histogram needs, computed once and drawn for both exports.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionData {
    pub title: String,
    pub n: usize,
    pub bins: HistogramBins,
}

pub fn prepare_distribution(
    table: &Table,
    cfg: &DistributionConfig,
) -> Result<DistributionData, RenderError> {
    let values = table.numeric(&cfg.column)?;
    let n = table.non_missing_count(&cfg.column)?;
    let title = cfg
        .title
        .clone()
        .unwrap_or_else(|| default_title(&cfg.column, n));
    let bins = histogram_bins(&finite_values(values), cfg.bins)?;
    Ok(DistributionData { title, n, bins })
}

/// Histogram of one numeric column. The titled figure is always shown; when
/// `save_path` is set a title-free TIFF and a titled PNG are written first.
pub fn plot_distribution(
    table: &Table,
    cfg: &DistributionConfig,
    style: &FigureStyle,
    viewer: &mut dyn FigureViewer,
) -> Result<DistributionOutcome, RenderError> {
    let data = prepare_distribution(table, cfg)?;

    let titled = draw_histogram(&data, cfg, style, TitleMode::Shown)?;
    let saved = match &cfg.save_path {
        Some(path) => {
            let untitled = draw_histogram(&data, cfg, style, TitleMode::Blank)?;
            Some(save_pair(path, &untitled, &titled)?)
        }
        None => None,
    };
    viewer.show(&titled)?;
    drop(titled);

    tracing::info!(column = %cfg.column, n = data.n, bins = cfg.bins, "distribution plotted");
    Ok(DistributionOutcome {
        column: cfg.column.clone(),
        title: data.title,
        n: data.n,
        bins: data.bins,
        saved,
    })
}

fn draw_histogram(
    data: &DistributionData,
    cfg: &DistributionConfig,
    style: &FigureStyle,
    mode: TitleMode,
) -> Result<RenderedFigure, RenderError> {
    let bins = &data.bins;
    let width = style.inches_to_px(cfg.figsize.0);
    let height = style.inches_to_px(cfg.figsize.1);
    let mut figure = RenderedFigure::blank(width, height, style.dpi);
    {
        let root = BitMapBackend::with_buffer(&mut figure.pixels, (width, height))
            .into_drawing_area();
        root.fill(&style.background)?;

        let x_lo = bins.edges[0];
        let x_hi = bins.edges[bins.edges.len() - 1];
        let x_pad = (x_hi - x_lo) * 0.05;
        let x_range = (x_lo - x_pad)..(x_hi + x_pad);
        let y_range = 0.0..(bins.max_count() as f64 * 1.05).max(1.0);

        let xtick_font = style.font(cfg.xticks_size);
        let ytick_font = style.font(cfg.yticks_size);
        let xlabel_font = style.font(cfg.xlabel_size);
        let ylabel_font = style.font(cfg.ylabel_size);

        let tick_len = style.pt_to_px(3.5).round() as u32;
        let gap = style.pt_to_px(3.5).round() as u32;
        let y_tick_labels: Vec<String> = key_points(y_range.clone(), Y_TICK_HINT)
            .into_iter()
            .map(format_tick)
            .collect();
        let y_tick_w = max_text_width(&root, &y_tick_labels, &ytick_font)?;
        let (_, x_tick_h) = root.estimate_text_size("0", &xtick_font)?;
        let (_, x_desc_h) = root.estimate_text_size(&cfg.column, &xlabel_font)?;
        let y_area = y_tick_w + tick_len + 2 * gap + style.pt_to_px(cfg.ylabel_size).round() as u32;
        let x_area = x_tick_h + tick_len + 2 * gap + x_desc_h;

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(style.pt_to_px(12.0).round() as u32)
            .x_label_area_size(x_area)
            .y_label_area_size(y_area);
        builder.caption(&data.title, style.title_font(cfg.title_size, mode));
        let mut chart = builder.build_cartesian_2d(x_range.clone(), y_range.clone())?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(X_TICK_HINT)
            .y_labels(Y_TICK_HINT)
            .x_label_formatter(&|v| format_tick(*v))
            .y_label_formatter(&|v| format_tick(*v))
            .x_label_style(xtick_font.clone())
            .y_label_style(ytick_font.clone())
            .y_desc(cfg.ylabel.as_str())
            .axis_desc_style(ylabel_font)
            .set_all_tick_mark_size(tick_len)
            .draw()?;

        let fill = cfg.color.mix(cfg.alpha).filled();
        let edge = style.background.stroke_width(1);
        let edges = &bins.edges;
        chart.draw_series(bins.counts.iter().enumerate().map(|(i, &count)| {
            Rectangle::new([(edges[i], 0.0), (edges[i + 1], count as f64)], fill)
        }))?;
        chart.draw_series(
            bins.counts
                .iter()
                .enumerate()
                .filter(|(_, count)| **count > 0)
                .map(|(i, &count)| {
                    Rectangle::new([(edges[i], 0.0), (edges[i + 1], count as f64)], edge)
                }),
        )?;

        let (px_range, py_range) = chart.plotting_area().get_pixel_range();
        if cfg.grid {
            let plot_w = px_range.end - px_range.start;
            for y in key_points(y_range.clone(), Y_TICK_HINT) {
                chart.draw_series(dashed_hline(
                    y,
                    x_range.clone(),
                    plot_w,
                    style.pt_to_px(3.7),
                    style.pt_to_px(1.6),
                    grid_style(style),
                ))?;
            }
        }
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x_range.start, y_range.start), (x_range.end, y_range.end)],
            style.text_color.stroke_width(2),
        )))?;

        let cx = (px_range.start + px_range.end) / 2;
        let desc_y = py_range.end + (tick_len + gap + x_tick_h + gap) as i32;
        root.draw(&Text::new(
            cfg.column.clone(),
            (cx, desc_y),
            xlabel_font.pos(Pos::new(HPos::Center, VPos::Top)),
        ))?;

        root.present()?;
    }
    Ok(figure.crop_tight(style.background, tight_pad(style)))
}

#[cfg(test)]
#[path = "../../tests/src_inline/render/distribution.rs"]
mod tests;
