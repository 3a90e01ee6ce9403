use serde::Serialize;

use crate::stats::{StatsError, quantile_linear, sort_values};

/// Tukey box summary with whiskers at 1.5 x IQR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub n: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_lo: f64,
    pub whisker_hi: f64,
    pub outliers: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

const WHISKER_IQR: f64 = 1.5;

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Result<Self, StatsError> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Err(StatsError::NoFiniteValues);
        }
        sort_values(&mut sorted);

        let q1 = quantile_linear(&sorted, 0.25);
        let median = quantile_linear(&sorted, 0.5);
        let q3 = quantile_linear(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - WHISKER_IQR * iqr;
        let hi_fence = q3 + WHISKER_IQR * iqr;

        // Whiskers stop at the furthest observation inside the fences, never inside the box.
        let whisker_lo = sorted
            .iter()
            .copied()
            .find(|&v| v >= lo_fence)
            .map_or(q1, |v| v.min(q1));
        let whisker_hi = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= hi_fence)
            .map_or(q3, |v| v.max(q3));
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < whisker_lo || v > whisker_hi)
            .collect();

        Ok(Self {
            n: sorted.len(),
            q1,
            median,
            q3,
            whisker_lo,
            whisker_hi,
            outliers,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/boxplot.rs"]
mod tests;
