//! Pearson correlation matrix and the mean-absolute-correlation ranking.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1, Axis};

use crate::data::model::NumericTable;

/// Square correlation matrix keyed by column name on both axes.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

/// One entry of the ranking: a column and its mean absolute correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanCorrelation {
    pub variable: String,
    pub value: f64,
}

/// Pearson product-moment correlation.
///
/// Returns NaN when the slices differ in length, have fewer than two
/// elements, or either side has zero variance.
pub fn pearson(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return f64::NAN;
    }

    let mean_x = x.sum() / n as f64;
    let mean_y = y.sum() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < 1e-300 || var_y < 1e-300 {
        return f64::NAN;
    }

    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

impl CorrelationMatrix {
    /// Pairwise Pearson correlation over every column pair (upper triangle
    /// computed, mirrored to the lower one).
    pub fn compute(table: &NumericTable) -> Self {
        let k = table.n_cols();
        let mut values = Array2::from_elem((k, k), f64::NAN);

        for i in 0..k {
            let xi = table.values.index_axis(Axis(1), i);
            for j in i..k {
                let r = if i == j {
                    // Constant columns keep NaN on the diagonal.
                    let self_r = pearson(xi, xi);
                    if self_r.is_nan() { f64::NAN } else { 1.0 }
                } else {
                    pearson(xi, table.values.index_axis(Axis(1), j))
                };
                values[[i, j]] = r;
                values[[j, i]] = r;
            }
        }

        log::info!("Computed {k}x{k} correlation matrix");
        CorrelationMatrix {
            names: table.names.clone(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Mean of the absolute values of each row (diagonal included, NaN
    /// skipped), sorted descending with NaN last.
    pub fn mean_abs_ranking(&self) -> Vec<MeanCorrelation> {
        let mut ranking: Vec<MeanCorrelation> = self
            .names
            .iter()
            .zip(self.values.axis_iter(Axis(0)))
            .map(|(name, row)| {
                let finite: Vec<f64> = row.iter().filter(|v| !v.is_nan()).map(|v| v.abs()).collect();
                let value = if finite.is_empty() {
                    f64::NAN
                } else {
                    finite.iter().sum::<f64>() / finite.len() as f64
                };
                MeanCorrelation {
                    variable: name.clone(),
                    value,
                }
            })
            .collect();

        ranking.sort_by(|a, b| descending_nan_last(a.value, b.value));
        ranking
    }
}

/// Descending order on `f64` with NaN sorted after every number.
pub fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn table(names: &[&str], values: Array2<f64>) -> NumericTable {
        NumericTable {
            names: names.iter().map(|n| n.to_string()).collect(),
            values,
        }
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let x = Array1::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = x.mapv(|v| 2.0 * v + 1.0);
        let z = x.mapv(|v| -v);
        assert!((pearson(x.view(), y.view()) - 1.0).abs() < 1e-12);
        assert!((pearson(x.view(), z.view()) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_zero_variance_is_nan() {
        let x = Array1::from(vec![1.0, 2.0, 3.0]);
        let c = Array1::from(vec![5.0, 5.0, 5.0]);
        assert!(pearson(x.view(), c.view()).is_nan());
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let t = table(
            &["a", "b", "c"],
            array![
                [1.0, 9.0, 2.0],
                [2.0, 7.0, 1.0],
                [3.0, 8.0, 4.0],
                [4.0, 3.0, 3.0],
                [5.0, 1.0, 6.0]
            ],
        );

        let m = CorrelationMatrix::compute(&t);

        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m.values[[i, i]], 1.0);
            for j in 0..3 {
                assert_eq!(m.values[[i, j]], m.values[[j, i]]);
                assert!(m.values[[i, j]].abs() <= 1.0);
            }
        }
    }

    #[test]
    fn ranking_is_sorted_descending() {
        let t = table(
            &["a", "b", "c", "d"],
            array![
                [1.0, 2.0, 5.0, 0.3],
                [2.0, 4.1, 3.0, 0.1],
                [3.0, 5.9, 4.0, 0.4],
                [4.0, 8.2, 1.0, 0.1],
                [5.0, 9.9, 2.0, 0.5]
            ],
        );

        let ranking = CorrelationMatrix::compute(&t).mean_abs_ranking();

        assert_eq!(ranking.len(), 4);
        for pair in ranking.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }
        assert!(ranking.iter().all(|r| r.value > 0.0 && r.value <= 1.0));
    }

    #[test]
    fn mean_includes_diagonal() {
        let t = table(&["a", "b"], array![[1.0, 3.0], [2.0, 1.0], [3.0, 2.0]]);
        let m = CorrelationMatrix::compute(&t);
        let r = m.values[[0, 1]].abs();

        let ranking = m.mean_abs_ranking();

        assert!((ranking[0].value - (1.0 + r) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_sorts_last() {
        let t = table(
            &["k", "a", "b"],
            array![[5.0, 1.0, 2.0], [5.0, 2.0, 1.0], [5.0, 3.0, 3.5]],
        );

        let ranking = CorrelationMatrix::compute(&t).mean_abs_ranking();

        assert_eq!(ranking.last().unwrap().variable, "k");
        assert!(ranking.last().unwrap().value.is_nan());
    }
}
