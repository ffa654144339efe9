use std::fmt;

use ndarray::{Array2, ArrayView1, Axis};

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what a spreadsheet reader hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Date / time cells kept as text; they never take part in the analysis.
    DateTime(String),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Text(s) | CellValue::DateTime(s) => write!(f, "{s}"),
            CellValue::Empty => write!(f, "<empty>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Booleans are deliberately not numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Parse a text cell the way a CSV reader would guess its type.
    ///
    /// `decimal_comma` additionally accepts `2,6` as `2.6`.
    pub fn guess(s: &str, decimal_comma: bool) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if decimal_comma && s.matches(',').count() == 1 {
            if let Ok(f) = s.replace(',', ".").parse::<f64>() {
                return CellValue::Float(f);
            }
        }
        match s {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::Text(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – the sheet as read
// ---------------------------------------------------------------------------

/// One named column of raw cells.
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub name: String,
    pub cells: Vec<CellValue>,
}

impl RawColumn {
    /// A column is numeric when every non-empty cell is an integer or float.
    /// A column with no values at all counts as numeric (it is all-missing).
    pub fn is_numeric(&self) -> bool {
        self.cells
            .iter()
            .all(|c| c.is_empty() || c.as_f64().is_some())
    }
}

/// The table exactly as loaded: ordered columns of equal length.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    /// Build from a header and row-major cells. Short rows are padded with
    /// [`CellValue::Empty`], extra cells beyond the header are ignored.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut columns: Vec<RawColumn> = headers
            .into_iter()
            .map(|name| RawColumn {
                name,
                cells: Vec::with_capacity(rows.len()),
            })
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for col in &mut columns {
                col.cells.push(cells.next().unwrap_or(CellValue::Empty));
            }
        }

        RawTable { columns }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// NumericTable – the cleaned, dense table
// ---------------------------------------------------------------------------

/// Dense numeric table: `values` is `rows × names.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

impl NumericTable {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name)
            .map(|idx| self.values.index_axis(Axis(1), idx))
    }
}
