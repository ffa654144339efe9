use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawColumn, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – the sheet named `sheet`
/// * `.csv`     – header row, `;` or `,` separated (sniffed from the header)
/// * `.json`    – `[{ "CO(GT)": 2.6, ... }, ...]`
/// * `.parquet` – flat numeric / text / bool columns
pub fn load_table(path: &Path, sheet: &str) -> Result<RawTable> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_workbook(path, sheet)?,
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    log::debug!("Columns: {:?}", table.column_names());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First row of the sheet is the header; blank header cells get the
/// `Unnamed: {i}` placeholder.
fn load_workbook(path: &Path, sheet: &str) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("reading sheet '{sheet}'"))?;

    let mut rows = range.rows();
    let header_row = rows.next().context("Sheet is empty: no header row")?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("Unnamed: {i}"),
            other => other.to_string(),
        })
        .collect();

    let body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_from_workbook).collect())
        .collect();

    Ok(RawTable::from_rows(headers, body))
}

fn cell_from_workbook(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
        Data::Empty => CellValue::Empty,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names.
///
/// The UCI distribution of this dataset uses `;` as separator and `,` as the
/// decimal mark (`"2,6"`), and pads every line with two empty fields. The
/// separator is sniffed from the header line; decimal commas are only
/// accepted with `;`. Unnamed columns without any value are dropped.
fn load_csv(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading CSV file")?;
    let header_line = text.lines().next().unwrap_or("");
    let delimiter = if header_line.contains(';') { b';' } else { b',' };
    let decimal_comma = delimiter == b';';

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        // Blank lines at the end of the UCI file come through as all-empty records.
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|field| CellValue::guess(field, decimal_comma))
                .collect(),
        );
    }

    let mut table = RawTable::from_rows(headers, rows);
    table
        .columns
        .retain(|col| !col.name.is_empty() || col.cells.iter().any(|c| !c.is_empty()));
    for (i, col) in table.columns.iter_mut().enumerate() {
        if col.name.is_empty() {
            col.name = format!("Unnamed: {i}");
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "CO(GT)": 2.6, "PT08.S1(CO)": 1360, "Date": "2004-03-10" },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; a key missing from a record is empty.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !index.contains_key(key) {
                index.insert(key.clone(), headers.len());
                headers.push(key.clone());
            }
        }
    }

    let rows: Vec<Vec<CellValue>> = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            let mut row = vec![CellValue::Empty; headers.len()];
            for (key, val) in obj {
                row[index[key]] = json_to_cell(val);
            }
            row
        })
        .collect();

    Ok(RawTable::from_rows(headers, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per variable.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); nulls become empty cells.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let mut columns: Vec<RawColumn> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| RawColumn {
            name: f.name().clone(),
            cells: Vec::new(),
        })
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                column.cells.push(extract_cell(array, row));
            }
        }
    }

    Ok(RawTable { columns })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Empty;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map_or(CellValue::Empty, |arr| CellValue::Integer(arr.value(row) as i64)),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(CellValue::Empty, |arr| CellValue::Integer(arr.value(row))),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or(CellValue::Empty, |arr| CellValue::Float(arr.value(row) as f64)),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(CellValue::Empty, |arr| CellValue::Float(arr.value(row))),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map_or(CellValue::Empty, |arr| CellValue::Bool(arr.value(row))),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            CellValue::DateTime(format!("{:?}", col.slice(row, 1)))
        }
        other => CellValue::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_semicolon_with_decimal_comma() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "air.csv",
            "Date;Time;CO(GT);PT08.S1(CO);;\n\
             10/03/2004;18.00.00;2,6;1360;;\n\
             10/03/2004;19.00.00;-200;1292;;\n\
             ;;;;;\n",
        );

        let table = load_table(&path, "ignored").unwrap();

        assert_eq!(table.column_names(), vec!["Date", "Time", "CO(GT)", "PT08.S1(CO)"]);
        assert_eq!(table.n_rows(), 2);
        let co = table.column("CO(GT)").unwrap();
        assert_eq!(co.cells, vec![CellValue::Float(2.6), CellValue::Integer(-200)]);
        assert!(!table.column("Date").unwrap().is_numeric());
    }

    #[test]
    fn csv_comma_separated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "t.csv", "a,b\n1,2.5\n3,\n");

        let table = load_table(&path, "ignored").unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("b").unwrap().cells[1], CellValue::Empty);
    }

    #[test]
    fn json_records_keep_first_seen_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "t.json",
            r#"[{"z": 1, "a": 2.5}, {"a": 3.0, "label": "x"}]"#,
        );

        let table = load_table(&path, "ignored").unwrap();

        assert_eq!(table.column_names(), vec!["z", "a", "label"]);
        assert_eq!(table.column("z").unwrap().cells[1], CellValue::Empty);
        assert_eq!(table.column("a").unwrap().cells[1], CellValue::Float(3.0));
    }

    #[test]
    fn json_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "t.json", r#"{"a": 1}"#);
        assert!(load_table(&path, "ignored").is_err());
    }

    #[test]
    fn parquet_flat_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("CO(GT)", DataType::Float64, true),
            Field::new("PT08.S1(CO)", DataType::Int64, false),
            Field::new("Date", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![Some(2.6), None])),
                Arc::new(Int64Array::from(vec![1360, 1292])),
                Arc::new(StringArray::from(vec!["2004-03-10", "2004-03-10"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path, "ignored").unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(
            table.column("CO(GT)").unwrap().cells,
            vec![CellValue::Float(2.6), CellValue::Empty]
        );
        assert_eq!(table.column("PT08.S1(CO)").unwrap().cells[0], CellValue::Integer(1360));
        assert_eq!(
            table.column("Date").unwrap().cells[0],
            CellValue::Text("2004-03-10".to_string())
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("AirQualityUCI.xlsx"), "AirQualityUCI").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "t.txt", "a\n1\n");
        let err = load_table(&path, "ignored").unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    /// Ten hourly rows in the UCI layout: formatted Date and Time cells,
    /// then five sensor columns with two `-200` readings in `CO(GT)`.
    fn write_air_quality_workbook(path: &Path) {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let headers = ["Date", "Time", "CO(GT)", "PT08.S1(CO)", "C6H6(GT)", "T", "PT08.S2(NMHC)"];
        let co = [2.6, 2.0, -200.0, 2.2, 1.6, 1.2, -200.0, 1.0, 0.9, 0.6];
        let s1 = [1360.0, 1292.0, 1402.0, 1376.0, 1272.0, 1197.0, 1185.0, 1136.0, 1094.0, 1010.0];
        let c6h6 = [11.9, 9.4, 9.0, 9.2, 6.5, 4.7, 3.6, 3.3, 2.3, 1.7];
        let t = [13.6, 13.3, 11.9, 11.0, 11.2, 11.2, 11.3, 10.7, 10.7, 10.3];
        let s2 = [1046.0, 955.0, 939.0, 948.0, 836.0, 750.0, 690.0, 672.0, 609.0, 561.0];

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("AirQualityUCI").unwrap();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let time_format = Format::new().set_num_format("hh:mm:ss");

        for (col, name) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        for i in 0..10 {
            let row = i as u32 + 1;
            let date = ExcelDateTime::from_ymd(2004, 3, 10 + (i as u8 + 18) / 24).unwrap();
            let time = ExcelDateTime::from_hms((18 + i as u16) % 24, 0, 0).unwrap();
            sheet.write_datetime_with_format(row, 0, &date, &date_format).unwrap();
            sheet.write_datetime_with_format(row, 1, &time, &time_format).unwrap();
            for (col, values) in [co, s1, c6h6, t, s2].iter().enumerate() {
                sheet.write_number(row, col as u16 + 2, values[i]).unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn workbook_sheet_with_date_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AirQualityUCI.xlsx");
        write_air_quality_workbook(&path);

        let table = load_table(&path, "AirQualityUCI").unwrap();

        assert_eq!(table.n_rows(), 10);
        assert_eq!(table.n_cols(), 7);
        for name in ["Date", "Time"] {
            let column = table.column(name).unwrap();
            assert!(column.cells.iter().all(|c| matches!(c, CellValue::DateTime(_))));
            assert!(!column.is_numeric());
        }
        assert_eq!(table.column("CO(GT)").unwrap().cells[2], CellValue::Float(-200.0));

        let cleaned = crate::data::clean::clean(&table, crate::data::clean::SENTINEL);

        assert_eq!(
            cleaned.names,
            vec!["CO(GT)", "PT08.S1(CO)", "C6H6(GT)", "T", "PT08.S2(NMHC)"]
        );
        assert_eq!(cleaned.n_rows(), 8);
        assert!(cleaned.values.iter().all(|v| *v != -200.0));
    }

    #[test]
    fn workbook_missing_sheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AirQualityUCI.xlsx");
        write_air_quality_workbook(&path);

        let err = load_table(&path, "Other").unwrap_err();

        assert!(format!("{err:#}").contains("reading sheet 'Other'"));
    }

    #[test]
    fn corrupt_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "t.xlsx", "not a zip archive");
        assert!(load_table(&path, "AirQualityUCI").is_err());
    }
}
