use std::fmt::Write;

use crate::input::Table;
use crate::metric::TMB_COLUMN;
use crate::render::comparison::ComparisonOutcome;
use crate::render::distribution::DistributionOutcome;
use crate::report::{format_f64_4, format_p_value};

pub fn render_tmb_text(table: &Table) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\t{TMB_COLUMN}", table.id_column);
    if let Ok(values) = table.numeric(TMB_COLUMN) {
        for (id, v) in table.row_ids.iter().zip(values) {
            let cell = v.map(format_f64_4).unwrap_or_else(|| "NA".to_string());
            let _ = writeln!(out, "{id}\t{cell}");
        }
    }
    out
}

pub fn render_distribution_text(outcome: &DistributionOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", outcome.title);
    let _ = writeln!(
        out,
        "bins: {}  range: {}..{}",
        outcome.bins.counts.len(),
        format_f64_4(outcome.bins.edges[0]),
        format_f64_4(outcome.bins.edges[outcome.bins.edges.len() - 1])
    );
    push_saved(&mut out, outcome.saved.as_ref());
    out
}

pub fn render_comparison_text(outcome: &ComparisonOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} by {}{}",
        outcome.column,
        outcome.group_column,
        if outcome.log_transform { " (log1p)" } else { "" }
    );
    let _ = writeln!(out, "group order: {}", outcome.group_order.join(", "));
    for panel in &outcome.panels {
        let _ = writeln!(out, "[{}]", panel.title);
        for b in &panel.boxes {
            match &b.stats {
                Some(s) => {
                    let _ = writeln!(
                        out,
                        "  {}\tn={}\tmedian={}\tIQR={}..{}",
                        b.group,
                        s.n,
                        format_f64_4(s.median),
                        format_f64_4(s.q1),
                        format_f64_4(s.q3)
                    );
                }
                None => {
                    let _ = writeln!(out, "  {}\tn=0", b.group);
                }
            }
        }
        if let Some(ann) = &panel.annotation {
            let _ = writeln!(
                out,
                "  Mann-Whitney {} vs {}: U={} p={} {}",
                ann.pair.0,
                ann.pair.1,
                format_f64_4(ann.test.u1),
                format_p_value(ann.test.p_value),
                ann.label
            );
        }
    }
    push_saved(&mut out, outcome.saved.as_ref());
    out
}

fn push_saved(out: &mut String, saved: Option<&crate::render::SavedFigure>) {
    if let Some(saved) = saved {
        let _ = writeln!(out, "saved: {} {}", saved.tiff.display(), saved.png.display());
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
