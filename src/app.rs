use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use eframe::egui;

use crate::config::AnalysisConfig;
use crate::pipeline::AnalysisReport;
use crate::state::{AppState, Transition};
use crate::ui::plot::{FigureKind, Figures};
use crate::ui::{panels, plot};

/// Report handed from the summary window to the plots session.
type Handoff = Rc<RefCell<Option<AnalysisReport>>>;

// ---------------------------------------------------------------------------
// Summary window
// ---------------------------------------------------------------------------

pub struct SummaryApp {
    pub state: AppState,
    handoff: Handoff,
}

impl eframe::App for SummaryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: "Mostrar Gráficos" ----
        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| {
            panels::actions(ui, &mut self.state);
        });

        // ---- Central panel: R² and table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::summary(ui, &mut self.state);
        });

        if self.state.transition == Transition::ShowPlots {
            let mut slot = self.handoff.borrow_mut();
            if slot.is_none() {
                *slot = Some(self.state.report.clone());
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }
}

/// Show the summary window until it is closed. Returns the report to plot
/// when the window was closed through "Mostrar Gráficos".
pub fn run_summary(config: AnalysisConfig, report: AnalysisReport) -> anyhow::Result<Option<AnalysisReport>> {
    let handoff: Handoff = Rc::new(RefCell::new(None));
    let app = SummaryApp {
        state: AppState::new(config, report),
        handoff: Rc::clone(&handoff),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Análise de Qualidade do Ar")
            .with_inner_size([600.0, 400.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Análise de Qualidade do Ar",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("summary window failed: {e}"))?;

    let report = handoff.borrow_mut().take();
    Ok(report)
}

// ---------------------------------------------------------------------------
// Plots session
// ---------------------------------------------------------------------------

/// The heatmap lives in the root viewport; the other figures get their own
/// native windows and can be closed one by one.
pub struct PlotsApp {
    figures: Figures,
    open: [bool; 3],
}

impl PlotsApp {
    pub fn new(report: &AnalysisReport) -> Self {
        Self {
            figures: Figures::from_report(report),
            open: [true; 3],
        }
    }
}

impl eframe::App for PlotsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure(ui, &self.figures, FigureKind::Heatmap);
        });

        let figures = &self.figures;
        for (kind, open) in FigureKind::SECONDARY.into_iter().zip(self.open.iter_mut()) {
            if !*open {
                continue;
            }
            ctx.show_viewport_immediate(
                egui::ViewportId::from_hash_of(kind),
                egui::ViewportBuilder::default()
                    .with_title(kind.title())
                    .with_inner_size(kind.window_size()),
                |ctx, _class| {
                    egui::CentralPanel::default().show(ctx, |ui| {
                        plot::figure(ui, figures, kind);
                    });
                    if ctx.input(|i| i.viewport().close_requested()) {
                        *open = false;
                    }
                },
            );
        }
    }
}

/// Blocks until the heatmap window is closed.
pub fn run_plots(report: &AnalysisReport) -> anyhow::Result<()> {
    let app = PlotsApp::new(report);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(FigureKind::Heatmap.title())
            .with_inner_size(FigureKind::Heatmap.window_size())
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        FigureKind::Heatmap.title(),
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("plot windows failed: {e}"))
}
