use thiserror::Error;

/// Failures of the analysis stages (cleaning, correlation, regression).
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("column '{0}' is not among the cleaned numeric columns")]
    MissingColumn(String),

    #[error("no feature columns left besides the target '{0}'")]
    NoFeatures(String),

    #[error("cannot split {rows} rows with test fraction {fraction}")]
    NotEnoughRows { rows: usize, fraction: f64 },

    #[error("linear regression failed: {0}")]
    Regression(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
