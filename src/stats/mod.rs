pub mod boxplot;
pub mod histogram;
pub mod mann_whitney;

use thiserror::Error;

pub use boxplot::BoxStats;
pub use histogram::{HistogramBins, histogram_bins};
pub use mann_whitney::{MannWhitney, mann_whitney_u, star_label};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("sample '{0}' has no observations")]
    EmptySample(String),
    #[error("histogram needs at least one bin")]
    ZeroBins,
    #[error("no finite values to summarise")]
    NoFiniteValues,
}

/// Drops missing and non-finite entries.
pub fn finite_values(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect()
}

/// Linear-interpolated percentile of an ascending slice, `p` in 0..=1.
pub fn quantile_linear(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn median(sorted: &[f64]) -> f64 {
    quantile_linear(sorted, 0.5)
}

pub fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}
