use ndarray::Array2;

use super::model::{NumericTable, RawTable};

/// Dataset convention for an invalid sensor reading.
pub const SENTINEL: f64 = -200.0;

/// Keep the numeric columns, treat `sentinel` and empty cells as missing and
/// drop every row that has a missing value in any kept column.
pub fn clean(raw: &RawTable, sentinel: f64) -> NumericTable {
    let numeric: Vec<_> = raw.columns.iter().filter(|c| c.is_numeric()).collect();
    let names: Vec<String> = numeric.iter().map(|c| c.name.clone()).collect();

    let dropped: Vec<&str> = raw
        .columns
        .iter()
        .filter(|c| !c.is_numeric())
        .map(|c| c.name.as_str())
        .collect();
    if !dropped.is_empty() {
        log::debug!("Skipping non-numeric columns {dropped:?}");
    }

    let mut flat = Vec::with_capacity(raw.n_rows() * names.len());
    let mut kept_rows = 0;
    for row in 0..raw.n_rows() {
        let values: Option<Vec<f64>> = numeric
            .iter()
            .map(|col| {
                col.cells[row]
                    .as_f64()
                    .filter(|v| *v != sentinel && !v.is_nan())
            })
            .collect();
        if let Some(values) = values {
            flat.extend(values);
            kept_rows += 1;
        }
    }

    log::info!(
        "Cleaned table: {kept_rows} of {} rows kept, {} numeric columns",
        raw.n_rows(),
        names.len()
    );

    let values = Array2::from_shape_vec((kept_rows, names.len()), flat)
        .expect("one value per kept row and numeric column");
    NumericTable { names, values }
}
