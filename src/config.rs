use std::path::{Path, PathBuf};

use crate::data::clean::SENTINEL;

pub const DATA_FILE: &str = "AirQualityUCI.xlsx";
pub const SHEET_NAME: &str = "AirQualityUCI";
pub const TARGET_COLUMN: &str = "PT08.S2(NMHC)";
pub const DISTRIBUTION_COLUMN: &str = "C6H6(GT)";

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Inputs of one analysis run. Only [`AnalysisConfig::default`] is used by
/// the application; the fields exist so each literal has one home.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub path: PathBuf,
    pub sheet: String,
    pub sentinel: f64,
    pub target: String,
    pub distribution_column: String,
    pub test_fraction: f64,
    pub seed: u64,
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            sheet: SHEET_NAME.to_string(),
            sentinel: SENTINEL,
            target: TARGET_COLUMN.to_string(),
            distribution_column: DISTRIBUTION_COLUMN.to_string(),
            test_fraction: 0.2,
            seed: 42,
            histogram_bins: 30,
        }
    }
}

impl AnalysisConfig {
    /// Same settings, different input file.
    pub fn with_path(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }
}

/// `AirQualityUCI.xlsx` next to the executable, falling back to the working
/// directory (the usual case under `cargo run`). If neither exists the
/// executable-relative path is returned so the load error names it.
pub fn default_data_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let beside_exe = exe_dir.map(|dir| dir.join(DATA_FILE));
    let in_cwd = PathBuf::from(DATA_FILE);

    match beside_exe {
        Some(path) if path.exists() => path,
        Some(_) if in_cwd.exists() => in_cwd,
        Some(path) => path,
        None => in_cwd,
    }
}
