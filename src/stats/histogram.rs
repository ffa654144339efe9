//! Equal-width histograms and a Gaussian KDE overlay for the distribution plots.

use std::f64::consts::PI;

/// Bin edges (`counts.len() + 1` of them) and per-bin counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `bins` equal-width bins spanning `[min, max]`; the last bin is closed
    /// on the right. A constant sample is spread over `[v - 0.5, v + 0.5]`.
    /// Returns `None` for an empty sample, zero bins or non-finite values.
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 || values.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if (hi - lo).abs() < f64::EPSILON {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Some(Histogram { edges, counts })
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn centers(&self) -> impl Iterator<Item = f64> + '_ {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Scott's rule bandwidth: `σ · n^(-1/5)` with the sample standard deviation.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let sd = var.sqrt();
    if sd < 1e-300 {
        return None;
    }
    Some(sd * (n as f64).powf(-0.2))
}

/// Gaussian kernel density estimate evaluated at each point of `grid`.
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Option<Vec<f64>> {
    let bw = scott_bandwidth(values)?;
    let norm = 1.0 / (values.len() as f64 * bw * (2.0 * PI).sqrt());
    Some(
        grid.iter()
            .map(|&x| {
                values
                    .iter()
                    .map(|&xi| (-0.5 * ((x - xi) / bw).powi(2)).exp())
                    .sum::<f64>()
                    * norm
            })
            .collect(),
    )
}

/// KDE curve over the histogram's span, scaled so it overlays bar counts.
pub fn kde_curve(values: &[f64], hist: &Histogram, points: usize) -> Vec<[f64; 2]> {
    let (lo, hi) = (hist.edges[0], hist.edges[hist.edges.len() - 1]);
    let points = points.max(2);
    let step = (hi - lo) / (points - 1) as f64;
    let grid: Vec<f64> = (0..points).map(|i| lo + step * i as f64).collect();

    let Some(density) = gaussian_kde(values, &grid) else {
        return Vec::new();
    };
    let scale = hist.total() as f64 * hist.bin_width();
    grid.into_iter()
        .zip(density)
        .map(|(x, d)| [x, d * scale])
        .collect()
}
