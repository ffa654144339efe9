use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::AnalysisConfig;
use crate::data::clean::clean;
use crate::data::loader::load_table;
use crate::data::model::{NumericTable, RawTable};
use crate::error::AnalysisError;
use crate::stats::correlation::{CorrelationMatrix, MeanCorrelation};
use crate::stats::regression::{RegressionReport, fit_and_score};

// ---------------------------------------------------------------------------
// Analysis report: everything the presenter needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub source: PathBuf,
    pub raw_rows: usize,
    pub cleaned: NumericTable,
    pub correlation: CorrelationMatrix,
    /// Mean absolute correlation per column, descending.
    pub ranking: Vec<MeanCorrelation>,
    pub regression: RegressionReport,
    pub distribution_column: String,
    /// Cleaned values of `distribution_column`, `None` when it was not kept.
    pub distribution: Option<Vec<f64>>,
    pub histogram_bins: usize,
}

/// Load → clean → correlate → regress, for the file named in `config`.
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
    let raw = load_table(&config.path, &config.sheet)
        .with_context(|| format!("loading {}", config.path.display()))?;
    analyze(&raw, config).with_context(|| format!("analysing {}", config.path.display()))
}

/// The pure part of [`run`]: every stage after loading.
pub fn analyze(raw: &RawTable, config: &AnalysisConfig) -> Result<AnalysisReport, AnalysisError> {
    let cleaned = clean(raw, config.sentinel);

    let correlation = CorrelationMatrix::compute(&cleaned);
    let ranking = correlation.mean_abs_ranking();

    let regression = fit_and_score(&cleaned, &config.target, config.test_fraction, config.seed)?;

    let distribution = cleaned
        .column(&config.distribution_column)
        .map(|col| col.to_vec());
    if distribution.is_none() {
        log::warn!(
            "Column '{}' not found after cleaning; its distribution plot will be empty",
            config.distribution_column
        );
    }

    Ok(AnalysisReport {
        source: config.path.clone(),
        raw_rows: raw.n_rows(),
        cleaned,
        correlation,
        ranking,
        regression,
        distribution_column: config.distribution_column.clone(),
        distribution,
        histogram_bins: config.histogram_bins,
    })
}
