use serde::Serialize;
use statrs::function::erf::erfc;

use crate::stats::StatsError;

/// Largest sample size for which the exact null distribution is used (ties aside).
const EXACT_MAX_N: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    Exact,
    Asymptotic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MannWhitney {
    /// U statistic of the first sample.
    pub u1: f64,
    pub p_value: f64,
    pub method: PValueMethod,
    pub n1: usize,
    pub n2: usize,
}

/// Two-sided Mann-Whitney rank-sum test of `x` against `y`.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<MannWhitney, StatsError> {
    if x.is_empty() {
        return Err(StatsError::EmptySample("x".to_string()));
    }
    if y.is_empty() {
        return Err(StatsError::EmptySample("y".to_string()));
    }
    let n1 = x.len();
    let n2 = y.len();

    let mut pooled: Vec<(f64, bool)> = x
        .iter()
        .map(|&v| (v, true))
        .chain(y.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (ranks, tie_term) = average_ranks(&pooled);
    let r1: f64 = ranks
        .iter()
        .zip(&pooled)
        .filter(|(_, (_, first))| *first)
        .map(|(r, _)| *r)
        .sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let has_ties = tie_term > 0.0;
    let (p, method) = if (n1 <= EXACT_MAX_N || n2 <= EXACT_MAX_N) && !has_ties {
        (exact_p_two_sided(u, n1, n2), PValueMethod::Exact)
    } else {
        (asymptotic_p_two_sided(u, n1, n2, tie_term), PValueMethod::Asymptotic)
    };

    Ok(MannWhitney {
        u1,
        p_value: p.clamp(0.0, 1.0),
        method,
        n1,
        n2,
    })
}

/// Ranks of an ascending slice with ties averaged, plus `sum(t^3 - t)` over tie groups.
fn average_ranks(sorted: &[(f64, bool)]) -> (Vec<f64>, f64) {
    let mut ranks = vec![0.0; sorted.len()];
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j].0 == sorted[i].0 {
            j += 1;
        }
        let avg = (i + 1 + j) as f64 / 2.0;
        for r in &mut ranks[i..j] {
            *r = avg;
        }
        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }
    (ranks, tie_term)
}

fn asymptotic_p_two_sided(u: f64, n1: usize, n2: usize, tie_term: f64) -> f64 {
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let n = n1f + n2f;
    let mu = n1f * n2f / 2.0;
    let var = n1f * n2f / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if var <= 0.0 {
        return 1.0;
    }
    let z = (u - mu - 0.5) / var.sqrt();
    2.0 * normal_sf(z)
}

fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// `2 * P(U >= u)` under the no-ties null, from the count of rank subsets per U value.
fn exact_p_two_sided(u: f64, n1: usize, n2: usize) -> f64 {
    let dist = u_distribution(n1, n2);
    let total: f64 = dist.iter().sum();
    let start = u.ceil().max(0.0) as usize;
    let upper: f64 = dist.iter().skip(start).sum();
    2.0 * upper / total
}

/// Number of arrangements giving each U in `0..=m*n`.
fn u_distribution(m: usize, n: usize) -> Vec<f64> {
    let (small, large) = if m <= n { (m, n) } else { (n, m) };
    let max_u = small * large;
    // ways[k][u]: choose k of the first `seen` pooled positions with statistic u.
    let mut ways = vec![vec![0.0f64; max_u + 1]; small + 1];
    ways[0][0] = 1.0;
    for seen in 0..(small + large) {
        for k in (1..=small.min(seen + 1)).rev() {
            // Placing the k-th chosen element at pooled position `seen` adds the
            // number of unchosen elements before it.
            let before = seen + 1 - k;
            if before > large {
                continue;
            }
            for u in (before..=max_u).rev() {
                let add = ways[k - 1][u - before];
                if add != 0.0 {
                    ways[k][u] += add;
                }
            }
        }
    }
    ways.swap_remove(small)
}

pub fn star_label(p: f64) -> &'static str {
    if p <= 1e-4 {
        "****"
    } else if p <= 1e-3 {
        "***"
    } else if p <= 1e-2 {
        "**"
    } else if p <= 0.05 {
        "*"
    } else {
        "ns"
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/mann_whitney.rs"]
mod tests;
