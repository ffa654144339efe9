/// Data layer: core types, loading, and cleaning.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ RawTable  │  named columns of CellValue
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  numeric columns, sentinel → missing, drop rows → NumericTable
///   └──────────┘
/// ```

pub mod clean;
pub mod loader;
pub mod model;
