//! Descriptive statistics used for summaries and distribution plots.

use std::f64::consts::PI;

/// Summary of a single non-empty series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl SeriesSummary {
    /// Returns `None` for an empty series.
    pub fn from_values(values: &[f64]) -> Option<SeriesSummary> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(SeriesSummary {
            count: sorted.len(),
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Most extreme values still within 1.5 IQR of the quartiles.
    pub fn whiskers(&self, values: &[f64]) -> (f64, f64) {
        let lower_fence = self.q1 - 1.5 * self.iqr();
        let upper_fence = self.q3 + 1.5 * self.iqr();
        let low = values
            .iter()
            .cloned()
            .filter(|v| *v >= lower_fence)
            .fold(self.q1, f64::min);
        let high = values
            .iter()
            .cloned()
            .filter(|v| *v <= upper_fence)
            .fold(self.q3, f64::max);
        (low, high)
    }

    /// Sample standard deviation, zero for a single value.
    pub fn std_dev(&self, values: &[f64]) -> f64 {
        if self.count < 2 {
            return 0.;
        }
        let var = values
            .iter()
            .map(|v| (v - self.mean).powi(2))
            .sum::<f64>()
            / (self.count - 1) as f64;
        var.sqrt()
    }
}

/// Quantile of an already sorted, non-empty slice, linearly
/// interpolating between the closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.max(0.).min(1.) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Silverman's rule of thumb bandwidth for a gaussian kernel.
///
/// Degenerate series (single value, all values equal) get a bandwidth
/// scaled to the magnitude of the values instead, so that they still
/// produce a visible density.
pub fn silverman_bandwidth(summary: &SeriesSummary, values: &[f64]) -> f64 {
    let spread = summary.std_dev(values).min(summary.iqr() / 1.34);
    let spread = if spread > 0. {
        spread
    } else {
        summary.std_dev(values)
    };
    let bw = 0.9 * spread * (summary.count as f64).powf(-0.2);
    if bw > 0. && bw.is_finite() {
        bw
    } else if summary.median != 0. {
        summary.median.abs() * 0.05
    } else {
        1.
    }
}

/// Gaussian kernel density estimate evaluated at `points` evenly spaced
/// positions covering the data range extended by three bandwidths on
/// each side.
///
/// Returns `(position, density)` pairs, empty for an empty series.
pub fn gaussian_kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    let summary = match SeriesSummary::from_values(values) {
        Some(s) => s,
        None => return Vec::new(),
    };
    let bw = silverman_bandwidth(&summary, values);
    let start = summary.min - 3. * bw;
    let end = summary.max + 3. * bw;
    let points = points.max(2);
    let step = (end - start) / (points - 1) as f64;
    let norm = 1. / (values.len() as f64 * bw * (2. * PI).sqrt());

    (0..points)
        .map(|n| {
            let x = start + step * n as f64;
            let density = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bw).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect()
}
