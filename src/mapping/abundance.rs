//! Abundance aggregation policies
//!
//! Input is the quantitative values of one accession's localized records
//! that carry a value. Only HighestSupport looks at the candidate scores;
//! the other policies give every candidate of the accession the same value.

use super::config::AbundancePolicy;

const TIE_EPSILON: f64 = 1e-9;

/// One quantified, localized peptide and its score against one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measured {
    pub value: f64,
    pub score: f64,
}

/// Reduce measured values to one abundance; None when nothing was measured
pub fn aggregate(policy: AbundancePolicy, measured: &[Measured]) -> Option<f64> {
    if measured.is_empty() {
        return None;
    }
    match policy {
        AbundancePolicy::HighestSupport => highest_support(measured),
        AbundancePolicy::Max => max(values(measured)),
        AbundancePolicy::Mean => mean(values(measured)),
        AbundancePolicy::Median => median(values(measured)),
        AbundancePolicy::Extreme => extreme(values(measured)),
    }
}

fn values(measured: &[Measured]) -> impl Iterator<Item = f64> + '_ {
    measured.iter().map(|m| m.value)
}

/// Mean value of the peptides sharing the best score
pub fn highest_support(measured: &[Measured]) -> Option<f64> {
    let best = measured.iter().map(|m| m.score).fold(f64::NEG_INFINITY, f64::max);
    let top = measured
        .iter()
        .filter(|m| (m.score - best).abs() <= TIE_EPSILON)
        .map(|m| m.value);
    mean(top)
}

pub fn max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}

pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Middle value; mean of the two middle values for an even count
pub fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Largest magnitude with its sign; the positive value wins a magnitude tie
pub fn extreme(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc: Option<f64>, v| match acc {
        None => Some(v),
        Some(a) if v.abs() > a.abs() || (v.abs() == a.abs() && v > a) => Some(v),
        keep => keep,
    })
}
