use std::path::Path;

use crate::config::AnalysisConfig;
use crate::pipeline::{self, AnalysisReport};
use crate::stats::correlation::{MeanCorrelation, descending_nan_last};

// ---------------------------------------------------------------------------
// Table sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Variable,
    MeanCorrelation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            column: SortColumn::MeanCorrelation,
            descending: true,
        }
    }
}

impl SortOrder {
    /// Header click: same column flips direction, another column starts
    /// ascending for names and descending for values.
    pub fn toggled(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                descending: !self.descending,
            }
        } else {
            Self {
                column,
                descending: column == SortColumn::MeanCorrelation,
            }
        }
    }

    /// NaN values stay at the bottom in both directions.
    pub fn apply(self, rows: &mut [MeanCorrelation]) {
        match self.column {
            SortColumn::Variable => {
                rows.sort_by(|a, b| a.variable.cmp(&b.variable));
                if self.descending {
                    rows.reverse();
                }
            }
            SortColumn::MeanCorrelation => rows.sort_by(|a, b| {
                let ord = descending_nan_last(a.value, b.value);
                if self.descending || a.value.is_nan() || b.value.is_nan() {
                    ord
                } else {
                    ord.reverse()
                }
            }),
        }
    }

    /// Arrow suffix for the header of `column`.
    pub fn indicator(self, column: SortColumn) -> &'static str {
        match (self.column == column, self.descending) {
            (false, _) => "",
            (true, true) => " ⏷",
            (true, false) => " ⏶",
        }
    }
}

// ---------------------------------------------------------------------------
// Summary window state
// ---------------------------------------------------------------------------

/// Where the summary window goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Still showing the summary.
    Open,
    /// "Mostrar Gráficos" was pressed: close and open the plots.
    ShowPlots,
}

/// The summary UI state, independent of rendering.
pub struct AppState {
    pub config: AnalysisConfig,
    pub report: AnalysisReport,

    /// Ranking rows in the current display order.
    pub rows: Vec<MeanCorrelation>,
    pub sort: SortOrder,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub transition: Transition,
}

impl AppState {
    pub fn new(config: AnalysisConfig, report: AnalysisReport) -> Self {
        let mut state = Self {
            config,
            rows: Vec::new(),
            report,
            sort: SortOrder::default(),
            status_message: None,
            transition: Transition::Open,
        };
        state.resort();
        state
    }

    /// Ingest a new report (after "Abrir…") and keep the current sort.
    pub fn set_report(&mut self, report: AnalysisReport) {
        self.report = report;
        self.status_message = None;
        self.resort();
    }

    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort = self.sort.toggled(column);
        self.resort();
    }

    fn resort(&mut self) {
        self.rows = self.report.ranking.clone();
        self.sort.apply(&mut self.rows);
    }

    /// Re-run the whole pipeline on another file. On failure the previous
    /// report stays and the error is shown in the top bar.
    pub fn reload_from(&mut self, path: &Path) {
        let config = self.config.with_path(path);
        match pipeline::run(&config) {
            Ok(report) => {
                log::info!(
                    "Reloaded {}: R² = {:.4}",
                    path.display(),
                    report.regression.r2
                );
                self.config = config;
                self.set_report(report);
            }
            Err(e) => {
                log::error!("Failed to analyse {}: {e:#}", path.display());
                self.status_message = Some(format!("Erro: {e:#}"));
            }
        }
    }

    /// The one-shot transition behind the "Mostrar Gráficos" button.
    pub fn request_plots(&mut self) {
        self.transition = Transition::ShowPlots;
    }
}
