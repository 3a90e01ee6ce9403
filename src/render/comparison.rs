use std::path::PathBuf;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;

use crate::input::{ColumnData, Table};
use crate::render::colors::{Palette, auto_palette, desaturate, group_color, to_hex};
use crate::render::{
    FigureStyle, FigureViewer, RenderError, RenderedFigure, SavedFigure, TitleMode, Y_TICK_HINT,
    dashed_hline, format_tick, grid_style, key_points, max_text_width, save_pair, tight_pad,
};
use crate::stats::{BoxStats, MannWhitney, StatsError, finite_values, mann_whitney_u, star_label};

/// Edge colour for boxes, whiskers and medians.
const LINE_COLOR: RGBColor = RGBColor(63, 63, 63);
const BOX_WIDTH: f64 = 0.8;
const SATURATION: f64 = 0.75;
/// Bracket offset above the data and bracket leg height, as fractions of the data span.
const ANNOT_OFFSET: f64 = 0.05;
const ANNOT_HEIGHT: f64 = 0.02;
const ANNOT_TEXT_ROOM: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    pub column: String,
    pub ylabel: String,
    pub title0: String,
    pub title1: String,
    pub log_transform: bool,
    /// Width and height in inches.
    pub figsize: (f64, f64),
    pub title_size: f64,
    pub ylabel_size: f64,
    pub xticks_size: f64,
    pub yticks_size: f64,
    pub annotation_size: f64,
    pub palette0: Option<Palette>,
    pub palette1: Option<Palette>,
    pub group_column: String,
    pub group_order: Option<Vec<String>>,
    pub save_path: Option<PathBuf>,
}

impl ComparisonConfig {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ylabel: "Value".to_string(),
            title0: "Group 1".to_string(),
            title1: "Group 2".to_string(),
            log_transform: false,
            figsize: (6.0, 4.0),
            title_size: 22.0,
            ylabel_size: 20.0,
            xticks_size: 18.0,
            yticks_size: 18.0,
            annotation_size: 12.0,
            palette0: None,
            palette1: None,
            group_column: "group".to_string(),
            group_order: None,
            save_path: None,
        }
    }

    fn title(&self, panel: usize) -> &str {
        if panel == 0 { &self.title0 } else { &self.title1 }
    }

    fn palette(&self, panel: usize) -> Option<&Palette> {
        if panel == 0 {
            self.palette0.as_ref()
        } else {
            self.palette1.as_ref()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupBox {
    pub group: String,
    pub color: String,
    /// `None` when the cohort has no values for this group.
    pub stats: Option<BoxStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub pair: (String, String),
    pub test: MannWhitney,
    pub label: String,
    /// Data-space height of the bracket base.
    pub bracket_y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelOutcome {
    pub title: String,
    pub boxes: Vec<GroupBox>,
    pub annotation: Option<Annotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonOutcome {
    pub column: String,
    pub group_column: String,
    pub log_transform: bool,
    pub group_order: Vec<String>,
    pub panels: Vec<PanelOutcome>,
    pub y_range: (f64, f64),
    pub saved: Option<SavedFigure>,
}

struct Panel {
    title: String,
    colors: Vec<RGBColor>,
    outcome: PanelOutcome,
}

/// Resolved panels and the shared y range; drawn once per export.
pub struct ComparisonData {
    pub group_order: Vec<String>,
    panels: Vec<Panel>,
    pub y_range: (f64, f64),
    span: f64,
}

impl ComparisonData {
    pub fn panels(&self) -> impl Iterator<Item = &PanelOutcome> {
        self.panels.iter().map(|p| &p.outcome)
    }
}

/// Sorted union of the non-missing group labels. Numeric group columns sort by value.
pub fn resolve_group_order(
    cohorts: &[Table],
    group_column: &str,
) -> Result<Vec<String>, RenderError> {
    let mut numeric = true;
    let mut labels: Vec<String> = Vec::new();
    for cohort in cohorts {
        let col = cohort.column(group_column)?;
        numeric &= matches!(col.data, ColumnData::Numeric(_));
        for row in 0..cohort.n_rows() {
            if let Some(label) = col.data.label(row) {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }
    }
    if numeric {
        labels.sort_by(|a, b| {
            let a = a.parse::<f64>().unwrap_or(f64::NAN);
            let b = b.parse::<f64>().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        });
    } else {
        labels.sort();
    }
    Ok(labels)
}

/// Copies the cohorts, applies the optional log1p transform, resolves group
/// order and palettes, and computes box statistics and the rank test.
pub fn prepare_comparison(
    cohort0: &Table,
    cohort1: Option<&Table>,
    cfg: &ComparisonConfig,
) -> Result<ComparisonData, RenderError> {
    let mut cohorts: Vec<Table> = std::iter::once(cohort0).chain(cohort1).cloned().collect();

    if cfg.log_transform {
        for cohort in &mut cohorts {
            let logged = cohort
                .numeric(&cfg.column)?
                .iter()
                .map(|v| v.map(f64::ln_1p))
                .collect();
            cohort.set_numeric(&cfg.column, logged)?;
        }
    }

    let group_order = match &cfg.group_order {
        Some(order) => order.clone(),
        None => resolve_group_order(&cohorts, &cfg.group_column)?,
    };

    let mut panels = Vec::with_capacity(cohorts.len());
    for (idx, cohort) in cohorts.iter().enumerate() {
        let palette = cfg
            .palette(idx)
            .cloned()
            .or_else(|| auto_palette(&group_order, idx));
        panels.push(build_panel(cohort, cfg, idx, &group_order, palette.as_ref())?);
    }

    let (lo, hi) = data_extent(&panels)?;
    let span = if hi > lo { hi - lo } else { 1.0 };
    let mut top = hi + ANNOT_OFFSET * span;
    for panel in &mut panels {
        if let Some(ann) = &mut panel.outcome.annotation {
            let pair_max = panel
                .outcome
                .boxes
                .iter()
                .take(2)
                .filter_map(|b| b.stats.as_ref().map(|s| s.max))
                .fold(f64::NEG_INFINITY, f64::max);
            ann.bracket_y = pair_max + ANNOT_OFFSET * span;
            top = top.max(ann.bracket_y + (ANNOT_HEIGHT + ANNOT_TEXT_ROOM) * span);
        }
    }

    Ok(ComparisonData {
        group_order,
        panels,
        y_range: (lo - ANNOT_OFFSET * span, top),
        span,
    })
}

fn build_panel(
    cohort: &Table,
    cfg: &ComparisonConfig,
    idx: usize,
    group_order: &[String],
    palette: Option<&Palette>,
) -> Result<Panel, RenderError> {
    let values = cohort.numeric(&cfg.column)?;
    let groups = &cohort.column(&cfg.group_column)?.data;

    let mut per_group: Vec<Vec<f64>> = vec![Vec::new(); group_order.len()];
    for (row, value) in values.iter().enumerate() {
        let Some(label) = groups.label(row) else {
            continue;
        };
        if let Some(pos) = group_order.iter().position(|g| *g == label) {
            per_group[pos].extend(finite_values(std::slice::from_ref(value)));
        }
    }

    let mut boxes = Vec::with_capacity(group_order.len());
    let mut colors = Vec::with_capacity(group_order.len());
    for (i, (group, vals)) in group_order.iter().zip(&per_group).enumerate() {
        let color = group_color(palette, group, i);
        let stats = if vals.is_empty() {
            None
        } else {
            Some(BoxStats::from_values(vals)?)
        };
        colors.push(color);
        boxes.push(GroupBox {
            group: group.clone(),
            color: to_hex(color),
            stats,
        });
    }

    let annotation = if group_order.len() == 2 {
        for (group, vals) in group_order.iter().zip(&per_group) {
            if vals.is_empty() {
                return Err(StatsError::EmptySample(group.clone()).into());
            }
        }
        let test = mann_whitney_u(&per_group[0], &per_group[1])?;
        tracing::debug!(
            panel = idx,
            p_value = test.p_value,
            u = test.u1,
            "Mann-Whitney {} vs {}",
            group_order[0],
            group_order[1]
        );
        Some(Annotation {
            pair: (group_order[0].clone(), group_order[1].clone()),
            label: star_label(test.p_value).to_string(),
            test,
            bracket_y: f64::NAN,
        })
    } else {
        if group_order.len() > 2 {
            tracing::debug!(
                panel = idx,
                groups = group_order.len(),
                "significance annotation skipped"
            );
        }
        None
    };

    let title = cfg.title(idx).to_string();
    Ok(Panel {
        title: title.clone(),
        colors,
        outcome: PanelOutcome {
            title,
            boxes,
            annotation,
        },
    })
}

fn data_extent(panels: &[Panel]) -> Result<(f64, f64), RenderError> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for stats in panels
        .iter()
        .flat_map(|p| p.outcome.boxes.iter())
        .filter_map(|b| b.stats.as_ref())
    {
        lo = lo.min(stats.min);
        hi = hi.max(stats.max);
    }
    if lo > hi {
        return Err(StatsError::NoFiniteValues.into());
    }
    Ok((lo, hi))
}

/// Boxplots of one or two cohorts by group, with a rank-test annotation when
/// exactly two groups are compared. The callers' tables are not modified.
pub fn plot_group_comparison(
    cohort0: &Table,
    cohort1: Option<&Table>,
    cfg: &ComparisonConfig,
    style: &FigureStyle,
    viewer: &mut dyn FigureViewer,
) -> Result<ComparisonOutcome, RenderError> {
    let data = prepare_comparison(cohort0, cohort1, cfg)?;

    let titled = draw_comparison(&data, cfg, style, TitleMode::Shown)?;
    let saved = match &cfg.save_path {
        Some(path) => {
            let untitled = draw_comparison(&data, cfg, style, TitleMode::Blank)?;
            Some(save_pair(path, &untitled, &titled)?)
        }
        None => None,
    };
    viewer.show(&titled)?;
    drop(titled);

    tracing::info!(
        column = %cfg.column,
        panels = data.panels.len(),
        groups = data.group_order.len(),
        "group comparison plotted"
    );
    Ok(ComparisonOutcome {
        column: cfg.column.clone(),
        group_column: cfg.group_column.clone(),
        log_transform: cfg.log_transform,
        group_order: data.group_order,
        y_range: data.y_range,
        panels: data.panels.into_iter().map(|p| p.outcome).collect(),
        saved,
    })
}

fn draw_comparison(
    data: &ComparisonData,
    cfg: &ComparisonConfig,
    style: &FigureStyle,
    mode: TitleMode,
) -> Result<RenderedFigure, RenderError> {
    let width = style.inches_to_px(cfg.figsize.0);
    let height = style.inches_to_px(cfg.figsize.1);
    let mut figure = RenderedFigure::blank(width, height, style.dpi);
    {
        let root = BitMapBackend::with_buffer(&mut figure.pixels, (width, height))
            .into_drawing_area();
        root.fill(&style.background)?;

        let n_groups = data.group_order.len().max(1);
        let x_range = -0.5..(n_groups as f64 - 0.5);
        let y_range = data.y_range.0..data.y_range.1;

        let xtick_font = style.font(cfg.xticks_size);
        let ytick_font = style.font(cfg.yticks_size);
        let ylabel_font = style.font(cfg.ylabel_size);
        let annot_font = style.font(cfg.annotation_size);
        let lw = style.pt_to_px(1.0).round().max(1.0) as u32;
        let tick_len = style.pt_to_px(3.5).round() as u32;
        let gap = style.pt_to_px(3.5).round() as u32;

        let y_tick_labels: Vec<String> = key_points(y_range.clone(), Y_TICK_HINT)
            .into_iter()
            .map(format_tick)
            .collect();
        let y_tick_w = max_text_width(&root, &y_tick_labels, &ytick_font)?;
        let (_, x_tick_h) = root.estimate_text_size("Ag", &xtick_font)?;
        let ylabel_px = style.pt_to_px(cfg.ylabel_size).round() as u32;

        let areas = root.split_evenly((1, data.panels.len()));
        for (idx, (area, panel)) in areas.iter().zip(&data.panels).enumerate() {
            // Shared y axis: only the first panel carries tick labels.
            let show_y_ticks = idx == 0;
            let tick_w = if show_y_ticks { y_tick_w } else { 0 };
            let y_area = tick_w + tick_len + 2 * gap + ylabel_px;

            let mut builder = ChartBuilder::on(area);
            builder
                .margin(style.pt_to_px(12.0).round() as u32)
                .x_label_area_size(x_tick_h + tick_len + 2 * gap)
                .y_label_area_size(y_area);
            builder.caption(&panel.title, style.title_font(cfg.title_size, mode));
            let mut chart = builder.build_cartesian_2d(x_range.clone(), y_range.clone())?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(n_groups)
                .x_label_formatter(&|_| String::new())
                .set_tick_mark_size(LabelAreaPosition::Bottom, 0)
                .y_labels(Y_TICK_HINT)
                .y_label_formatter(&|v| {
                    if show_y_ticks {
                        format_tick(*v)
                    } else {
                        String::new()
                    }
                })
                .y_label_style(ytick_font.clone())
                .y_desc(cfg.ylabel.as_str())
                .axis_desc_style(ylabel_font.clone())
                .set_tick_mark_size(LabelAreaPosition::Left, tick_len)
                .draw()?;

            let half = BOX_WIDTH / 2.0;
            let boxes = &panel.outcome.boxes;
            chart.draw_series(boxes.iter().enumerate().filter_map(|(i, b)| {
                b.stats.as_ref().map(|s| {
                    let x = i as f64;
                    Rectangle::new(
                        [(x - half, s.q1), (x + half, s.q3)],
                        desaturate(panel.colors[i], SATURATION).filled(),
                    )
                })
            }))?;

            let (px_range, _) = chart.plotting_area().get_pixel_range();
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

            let line = LINE_COLOR.stroke_width(lw);
            for (i, b) in boxes.iter().enumerate() {
                let Some(s) = &b.stats else {
                    continue;
                };
                let x = i as f64;
                let cap = half / 2.0;
                chart.draw_series([
                    PathElement::new(vec![(x - half, s.q1), (x + half, s.q1)], line),
                    PathElement::new(vec![(x - half, s.q3), (x + half, s.q3)], line),
                    PathElement::new(vec![(x - half, s.q1), (x - half, s.q3)], line),
                    PathElement::new(vec![(x + half, s.q1), (x + half, s.q3)], line),
                    PathElement::new(vec![(x - half, s.median), (x + half, s.median)], line),
                    PathElement::new(vec![(x, s.q3), (x, s.whisker_hi)], line),
                    PathElement::new(vec![(x, s.q1), (x, s.whisker_lo)], line),
                    PathElement::new(vec![(x - cap, s.whisker_hi), (x + cap, s.whisker_hi)], line),
                    PathElement::new(vec![(x - cap, s.whisker_lo), (x + cap, s.whisker_lo)], line),
                ])?;
                chart.draw_series(
                    s.outliers
                        .iter()
                        .map(|&v| Circle::new((x, v), 2 * lw, LINE_COLOR.stroke_width(lw))),
                )?;
            }

            if let Some(ann) = &panel.outcome.annotation {
                let y0 = ann.bracket_y;
                let y1 = y0 + ANNOT_HEIGHT * data.span;
                chart.draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, y0), (0.0, y1), (1.0, y1), (1.0, y0)],
                    style.text_color.stroke_width(lw),
                )))?;
                chart.draw_series(std::iter::once(Text::new(
                    ann.label.clone(),
                    (0.5, y1),
                    annot_font.clone().pos(Pos::new(HPos::Center, VPos::Bottom)),
                )))?;
            }

            chart.draw_series(std::iter::once(Rectangle::new(
                [(x_range.start, y_range.start), (x_range.end, y_range.end)],
                style.text_color.stroke_width(2),
            )))?;

            for (i, group) in data.group_order.iter().enumerate() {
                let (px, py) = chart.backend_coord(&(i as f64, y_range.start));
                root.draw(&PathElement::new(
                    vec![(px, py), (px, py + tick_len as i32)],
                    style.text_color.stroke_width(lw),
                ))?;
                root.draw(&Text::new(
                    group.clone(),
                    (px, py + (tick_len + gap) as i32),
                    xtick_font.clone().pos(Pos::new(HPos::Center, VPos::Top)),
                ))?;
            }
        }

        root.present()?;
    }
    Ok(figure.crop_tight(style.background, tight_pad(style)))
}

#[cfg(test)]
#[path = "../../tests/src_inline/render/comparison.rs"]
mod tests;
