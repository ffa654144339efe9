//! Seeded train/test split, ordinary least squares fit and R² scoring.

use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::data::model::NumericTable;
use crate::error::{AnalysisError, Result};

/// Everything derived from one fit.
#[derive(Debug, Clone)]
pub struct RegressionReport {
    pub target: String,
    pub features: Vec<String>,
    pub intercept: f64,
    /// One coefficient per entry of `features`.
    pub coefficients: Vec<f64>,
    pub n_train: usize,
    pub n_test: usize,
    pub y_test: Vec<f64>,
    pub y_pred: Vec<f64>,
    /// `actual - predicted` on the test split.
    pub residuals: Vec<f64>,
    pub r2: f64,
}

/// Row indices of a shuffled train/test split.
///
/// `n_test = ceil(test_fraction * n)`; the test rows are the first `n_test`
/// entries of a permutation drawn from `StdRng::seed_from_u64(seed)`.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n || !(0.0..1.0).contains(&test_fraction) {
        return Err(AnalysisError::NotEnoughRows {
            rows: n,
            fraction: test_fraction,
        });
    }

    let mut permutation: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(n_test);
    Ok((train, permutation))
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// A constant `y_true` scores 1.0 when predicted exactly and 0.0 otherwise.
/// linfa's `SingleTargetRegression::r2` adds `1e-10` to `SS_tot`, so it
/// drifts on low-variance targets and sends a constant target to a huge
/// negative score; this one is exact.
pub fn r2_score(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return f64::NAN;
    }
    let mean = y_true.sum() / n as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Fit `target ~ every other column` on the training rows and score it on
/// the held-out rows.
pub fn fit_and_score(
    table: &NumericTable,
    target: &str,
    test_fraction: f64,
    seed: u64,
) -> Result<RegressionReport> {
    let target_idx = table
        .column_index(target)
        .ok_or_else(|| AnalysisError::MissingColumn(target.to_string()))?;
    let feature_idx: Vec<usize> = (0..table.n_cols()).filter(|&i| i != target_idx).collect();
    if feature_idx.is_empty() {
        return Err(AnalysisError::NoFeatures(target.to_string()));
    }

    let records: Array2<f64> = table.values.select(Axis(1), &feature_idx);
    let targets: Array1<f64> = table.values.column(target_idx).to_owned();

    let (train, test) = train_test_split(table.n_rows(), test_fraction, seed)?;

    let train_set = Dataset::new(
        records.select(Axis(0), &train),
        targets.select(Axis(0), &train),
    );
    let x_test = records.select(Axis(0), &test);
    let y_test = targets.select(Axis(0), &test);

    let model = LinearRegression::new()
        .fit(&train_set)
        .map_err(|e| AnalysisError::Regression(e.to_string()))?;
    let y_pred: Array1<f64> = model.predict(&x_test);

    let r2 = r2_score(y_test.view(), y_pred.view());
    let residuals = &y_test - &y_pred;

    log::info!(
        "Fitted OLS for '{target}' on {} rows ({} features), R² = {r2:.4} on {} test rows",
        train.len(),
        feature_idx.len(),
        test.len()
    );

    Ok(RegressionReport {
        target: target.to_string(),
        features: feature_idx.iter().map(|&i| table.names[i].clone()).collect(),
        intercept: model.intercept(),
        coefficients: model.params().to_vec(),
        n_train: train.len(),
        n_test: test.len(),
        y_test: y_test.to_vec(),
        y_pred: y_pred.to_vec(),
        residuals: residuals.to_vec(),
        r2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// y = 3 + 2·a − b, with a and b not collinear.
    fn linear_table() -> NumericTable {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let b = [4.0, 1.0, 7.0, 2.0, 9.0, 3.0, 4.5, 8.0, 6.0, 0.5];
        let mut flat = Vec::new();
        for i in 0..a.len() {
            flat.extend([a[i], b[i], 3.0 + 2.0 * a[i] - b[i]]);
        }
        NumericTable {
            names: vec!["a".into(), "b".into(), "y".into()],
            values: Array2::from_shape_vec((a.len(), 3), flat).unwrap(),
        }
    }

    #[test]
    fn split_sizes_follow_ceiling() {
        let (train, test) = train_test_split(8, 0.2, 42).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 6);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        assert_eq!(
            train_test_split(50, 0.2, 42).unwrap(),
            train_test_split(50, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn split_rejects_degenerate_sizes() {
        assert!(matches!(
            train_test_split(1, 0.2, 42),
            Err(AnalysisError::NotEnoughRows { rows: 1, .. })
        ));
        assert!(train_test_split(0, 0.2, 42).is_err());
    }

    #[test]
    fn r2_perfect_and_mean_predictions() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(y.view(), y.view()), 1.0);
        let mean = array![2.5, 2.5, 2.5, 2.5];
        assert!(r2_score(y.view(), mean.view()).abs() < 1e-12);
    }

    #[test]
    fn r2_agrees_with_linfa_on_ordinary_data() {
        use linfa::metrics::SingleTargetRegression;

        let y = array![3.0, -1.0, 2.0, 7.0, 4.5];
        let pred = array![2.5, 0.0, 2.0, 8.0, 4.0];
        let linfa_r2 = pred.r2(&y).unwrap();
        assert!((r2_score(y.view(), pred.view()) - linfa_r2).abs() < 1e-9);
    }

    #[test]
    fn r2_constant_truth() {
        let y = array![2.0, 2.0];
        assert_eq!(r2_score(y.view(), y.view()), 1.0);
        assert_eq!(r2_score(y.view(), array![1.0, 3.0].view()), 0.0);
    }

    #[test]
    fn recovers_exact_linear_relation() {
        let report = fit_and_score(&linear_table(), "y", 0.2, 42).unwrap();

        assert_eq!(report.features, vec!["a", "b"]);
        assert_eq!(report.n_train, 8);
        assert_eq!(report.n_test, 2);
        assert!((report.intercept - 3.0).abs() < 1e-6);
        assert!((report.coefficients[0] - 2.0).abs() < 1e-6);
        assert!((report.coefficients[1] + 1.0).abs() < 1e-6);
        assert!(report.residuals.iter().all(|r| r.abs() < 1e-6));
        assert!((report.r2 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn missing_target_is_an_error() {
        let err = fit_and_score(&linear_table(), "PT08.S2(NMHC)", 0.2, 42).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn(name) if name == "PT08.S2(NMHC)"));
    }

    #[test]
    fn target_alone_has_no_features() {
        let table = NumericTable {
            names: vec!["y".into()],
            values: array![[1.0], [2.0], [3.0]],
        };
        assert!(matches!(
            fit_and_score(&table, "y", 0.2, 42),
            Err(AnalysisError::NoFeatures(_))
        ));
    }
}
