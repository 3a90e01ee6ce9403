use serde::Serialize;

use crate::stats::StatsError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBins {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl HistogramBins {
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Equal-width bins over `min..=max`. The last bin includes its right edge.
pub fn histogram_bins(values: &[f64], bins: usize) -> Result<HistogramBins, StatsError> {
    if bins == 0 {
        return Err(StatsError::ZeroBins);
    }
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(StatsError::NoFiniteValues);
    }
    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();
    let mut counts = vec![0u64; bins];
    for v in finite {
        let mut idx = ((v - lo) / width) as usize;
        if idx >= bins {
            idx = bins - 1;
        }
        // Float rounding can land a value one bin off its edges.
        if v < edges[idx] && idx > 0 {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }
    Ok(HistogramBins { edges, counts })
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/histogram.rs"]
mod tests;
