use eframe::egui::{self, Align, Color32, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, SortColumn};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let report = &state.report;
        let file_name = report
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui.label(format!(
            "{file_name}: {} de {} linhas válidas",
            report.cleaned.n_rows(),
            report.raw_rows
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – R² and the mean-correlation table
// ---------------------------------------------------------------------------

pub fn summary(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(10.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!(
                "R² da regressão: {:.4}",
                state.report.regression.r2
            ))
            .strong()
            .size(16.0),
        );
    });
    ui.add_space(10.0);

    correlation_table(ui, state);
}

/// Two-column table; clicking a header sorts by it.
fn correlation_table(ui: &mut Ui, state: &mut AppState) {
    let mut clicked: Option<SortColumn> = None;
    let sort = state.sort;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::remainder().at_least(160.0))
        .column(Column::auto().at_least(140.0))
        .header(24.0, |mut header| {
            for (column, title) in [
                (SortColumn::Variable, "Variável"),
                (SortColumn::MeanCorrelation, "Correlação Média"),
            ] {
                header.col(|ui: &mut Ui| {
                    let text = format!("{title}{}", sort.indicator(column));
                    if ui
                        .add(egui::Button::new(RichText::new(text).strong()).frame(false))
                        .clicked()
                    {
                        clicked = Some(column);
                    }
                });
            }
        })
        .body(|mut body| {
            for row in &state.rows {
                body.row(20.0, |mut table_row| {
                    table_row.col(|ui: &mut Ui| {
                        ui.label(&row.variable);
                    });
                    table_row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.4}", row.value));
                    });
                });
            }
        });

    if let Some(column) = clicked {
        state.sort_by(column);
    }
}

// ---------------------------------------------------------------------------
// Bottom panel – the one-shot button
// ---------------------------------------------------------------------------

pub fn actions(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(6.0);
    ui.vertical_centered(|ui: &mut Ui| {
        if ui.button("Mostrar Gráficos").clicked() {
            log::info!("Showing plots");
            state.request_plots();
        }
    });
    ui.add_space(6.0);
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir dados de qualidade do ar")
        .add_filter("Arquivos suportados", &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Planilhas", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.reload_from(&path);
    }
}
