use std::f32::consts::FRAC_PI_2;

use eframe::egui::epaint::TextShape;
use eframe::egui::{Align2, Color32, FontId, Rect, Sense, Ui, pos2, vec2};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::color::{annotation_color, diverging};
use crate::pipeline::AnalysisReport;
use crate::stats::correlation::CorrelationMatrix;
use crate::stats::histogram::{Histogram, kde_curve};

const SCATTER_COLOR: Color32 = Color32::from_rgba_premultiplied(19, 71, 108, 153);
const RESIDUAL_COLOR: Color32 = Color32::from_rgb(128, 0, 128);
const DISTRIBUTION_COLOR: Color32 = Color32::from_rgb(0, 128, 128);
const KDE_POINTS: usize = 200;

// ---------------------------------------------------------------------------
// Figure catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigureKind {
    Heatmap,
    Scatter,
    Residuals,
    Distribution,
}

impl FigureKind {
    /// Figures shown in their own windows next to the heatmap.
    pub const SECONDARY: [FigureKind; 3] = [
        FigureKind::Scatter,
        FigureKind::Residuals,
        FigureKind::Distribution,
    ];

    pub fn title(self) -> &'static str {
        match self {
            FigureKind::Heatmap => "Matriz de Correlação",
            FigureKind::Scatter => "Valores reais vs previstos da regressão",
            FigureKind::Residuals => "Distribuição dos resíduos da regressão",
            FigureKind::Distribution => "Distribuição da concentração de benzeno (C6H6)",
        }
    }

    /// Native window size, matching the matplotlib figure sizes at 100 dpi.
    pub fn window_size(self) -> [f32; 2] {
        match self {
            FigureKind::Heatmap => [1200.0, 800.0],
            _ => [800.0, 600.0],
        }
    }
}

/// A histogram plus its count-scaled KDE overlay.
#[derive(Debug, Clone)]
pub struct DistributionFigure {
    pub histogram: Histogram,
    pub kde: Vec<[f64; 2]>,
}

impl DistributionFigure {
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let histogram = Histogram::new(values, bins)?;
        let kde = kde_curve(values, &histogram, KDE_POINTS);
        Some(Self { histogram, kde })
    }
}

/// Everything the four figures draw, computed once when the plots open.
#[derive(Debug, Clone)]
pub struct Figures {
    pub correlation: CorrelationMatrix,
    pub target: String,
    /// (actual, predicted) on the test split.
    pub scatter: Vec<[f64; 2]>,
    /// Diagonal from the smallest to the largest actual value.
    pub ideal: Option<[[f64; 2]; 2]>,
    pub residuals: Option<DistributionFigure>,
    pub distribution_column: String,
    pub distribution: Option<DistributionFigure>,
}

impl Figures {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let reg = &report.regression;
        let scatter: Vec<[f64; 2]> = reg
            .y_test
            .iter()
            .zip(reg.y_pred.iter())
            .map(|(&actual, &predicted)| [actual, predicted])
            .collect();

        let lo = reg.y_test.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = reg.y_test.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let ideal = (lo.is_finite() && hi.is_finite()).then_some([[lo, lo], [hi, hi]]);

        let distribution = report
            .distribution
            .as_deref()
            .and_then(|values| DistributionFigure::new(values, report.histogram_bins));

        Self {
            correlation: report.correlation.clone(),
            target: reg.target.clone(),
            scatter,
            ideal,
            residuals: DistributionFigure::new(&reg.residuals, report.histogram_bins),
            distribution_column: report.distribution_column.clone(),
            distribution,
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Render one figure filling `ui`.
pub fn figure(ui: &mut Ui, figures: &Figures, kind: FigureKind) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(kind.title());
    });
    ui.add_space(4.0);

    match kind {
        FigureKind::Heatmap => heatmap(ui, &figures.correlation),
        FigureKind::Scatter => scatter(ui, figures),
        FigureKind::Residuals => distribution_plot(
            ui,
            "residuals_plot",
            figures.residuals.as_ref(),
            RESIDUAL_COLOR,
            "Valor real - previsto",
        ),
        FigureKind::Distribution => distribution_plot(
            ui,
            "distribution_plot",
            figures.distribution.as_ref(),
            DISTRIBUTION_COLOR,
            &format!("{} – µg/m³", figures.distribution_column),
        ),
    }
}

fn placeholder(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(text);
    });
}

/// Annotated correlation heatmap with a colour bar, painted directly.
fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let k = matrix.len();
    if k == 0 {
        placeholder(ui, "Nenhuma coluna numérica.");
        return;
    }

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let rect = response.rect;
    let text_color = ui.visuals().text_color();
    let label_font = FontId::proportional(12.0);

    // Room for the longest name on the left and, rotated, at the bottom.
    let label_len = matrix
        .names
        .iter()
        .map(|n| painter.layout_no_wrap(n.clone(), label_font.clone(), text_color).size().x)
        .fold(0.0, f32::max)
        + 8.0;
    let colorbar_space = 80.0;

    let avail_w = rect.width() - label_len - colorbar_space;
    let avail_h = rect.height() - label_len - 8.0;
    let cell = (avail_w.min(avail_h) / k as f32).max(4.0);
    let origin = pos2(rect.left() + label_len, rect.top() + 4.0);
    let side = cell * k as f32;

    let annotate = cell >= 30.0;
    let value_font = FontId::proportional((cell * 0.28).clamp(9.0, 14.0));

    for (i, row_name) in matrix.names.iter().enumerate() {
        for j in 0..k {
            let value = matrix.values[[i, j]];
            let cell_rect = Rect::from_min_size(
                origin + vec2(j as f32 * cell, i as f32 * cell),
                vec2(cell, cell),
            );
            painter.rect_filled(cell_rect, 0.0, diverging(value));
            if annotate {
                painter.text(
                    cell_rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{value:.2}"),
                    value_font.clone(),
                    annotation_color(value),
                );
            }
        }

        painter.text(
            pos2(origin.x - 4.0, origin.y + (i as f32 + 0.5) * cell),
            Align2::RIGHT_CENTER,
            row_name,
            label_font.clone(),
            text_color,
        );
    }

    for (j, col_name) in matrix.names.iter().enumerate() {
        let galley = painter.layout_no_wrap(col_name.clone(), label_font.clone(), text_color);
        let size = galley.size();
        let pos = pos2(
            origin.x + (j as f32 + 0.5) * cell - size.y / 2.0,
            origin.y + side + 4.0 + size.x,
        );
        painter.add(TextShape::new(pos, galley, text_color).with_angle(-FRAC_PI_2));
    }

    // Colour bar: +1 at the top, -1 at the bottom.
    let bar_left = origin.x + side + 16.0;
    let steps = 64;
    let step_h = side / steps as f32;
    for s in 0..steps {
        let value = 1.0 - 2.0 * (s as f64 + 0.5) / steps as f64;
        let strip = Rect::from_min_size(
            pos2(bar_left, origin.y + s as f32 * step_h),
            vec2(16.0, step_h + 0.5),
        );
        painter.rect_filled(strip, 0.0, diverging(value));
    }
    for (value, frac) in [(1.0, 0.0), (0.5, 0.25), (0.0, 0.5), (-0.5, 0.75), (-1.0, 1.0)] {
        painter.text(
            pos2(bar_left + 20.0, origin.y + frac * side),
            Align2::LEFT_CENTER,
            format!("{value:.2}"),
            label_font.clone(),
            text_color,
        );
    }
}

/// Actual vs predicted scatter with the dashed identity line.
fn scatter(ui: &mut Ui, figures: &Figures) {
    if figures.scatter.is_empty() {
        placeholder(ui, "Sem previsões para mostrar.");
        return;
    }

    Plot::new("scatter_plot")
        .legend(Legend::default())
        .x_axis_label(format!("Valor real de {}", figures.target))
        .y_axis_label("Valor previsto")
        .show_grid(true)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = figures.scatter.iter().copied().collect();
            plot_ui.points(
                Points::new(points)
                    .name("Previsões")
                    .color(SCATTER_COLOR)
                    .radius(3.0),
            );

            if let Some(ideal) = figures.ideal {
                let line: PlotPoints = ideal.into_iter().collect();
                plot_ui.line(
                    Line::new(line)
                        .name("Ideal")
                        .color(Color32::RED)
                        .style(LineStyle::dashed_loose())
                        .width(1.5),
                );
            }
        });
}

/// Histogram bars with the KDE curve on top.
fn distribution_plot(
    ui: &mut Ui,
    id: &str,
    figure: Option<&DistributionFigure>,
    color: Color32,
    x_label: &str,
) {
    let Some(figure) = figure else {
        placeholder(ui, "Dados insuficientes para o histograma.");
        return;
    };

    let width = figure.histogram.bin_width();
    let bars: Vec<Bar> = figure
        .histogram
        .centers()
        .zip(figure.histogram.counts.iter())
        .map(|(center, &count)| Bar::new(center, count as f64).width(width))
        .collect();

    Plot::new(id)
        .x_axis_label(x_label)
        .y_axis_label("Frequência")
        .show_grid(true)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
            if !figure.kde.is_empty() {
                let curve: PlotPoints = figure.kde.iter().copied().collect();
                plot_ui.line(Line::new(curve).color(color).width(2.0));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::data::model::{CellValue, RawColumn, RawTable};
    use crate::pipeline::analyze;

    fn report() -> AnalysisReport {
        let col = |name: &str, values: Vec<f64>| RawColumn {
            name: name.to_string(),
            cells: values.into_iter().map(CellValue::Float).collect(),
        };
        let n = 40;
        let a: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..n).map(|i| ((i * 7) % 11) as f64).collect();
        let benzene: Vec<f64> = (0..n).map(|i| 1.0 + ((i * 5) % 13) as f64 * 0.7).collect();
        let target: Vec<f64> = (0..n)
            .map(|i| 500.0 + 3.0 * a[i] - 2.0 * b[i] + ((i * 3) % 5) as f64)
            .collect();
        let raw = RawTable {
            columns: vec![
                col("a", a),
                col("b", b),
                col("C6H6(GT)", benzene),
                col("PT08.S2(NMHC)", target),
            ],
        };
        analyze(&raw, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn figures_follow_the_report() {
        let report = report();
        let figures = Figures::from_report(&report);

        assert_eq!(figures.scatter.len(), report.regression.n_test);
        assert_eq!(figures.correlation.len(), 4);

        let [start, end] = figures.ideal.unwrap();
        assert_eq!(start[0], start[1]);
        assert_eq!(end[0], end[1]);
        assert!(start[0] <= end[0]);

        let residuals = figures.residuals.unwrap();
        assert_eq!(residuals.histogram.counts.len(), 30);
        assert_eq!(residuals.histogram.total(), report.regression.n_test);

        let distribution = figures.distribution.unwrap();
        assert_eq!(distribution.histogram.total(), 40);
        assert_eq!(distribution.kde.len(), KDE_POINTS);
    }

    #[test]
    fn missing_distribution_has_no_figure() {
        let mut report = report();
        report.distribution = None;
        assert!(Figures::from_report(&report).distribution.is_none());
    }

    #[test]
    fn titles_are_distinct() {
        let mut titles: Vec<&str> = FigureKind::SECONDARY.iter().map(|k| k.title()).collect();
        titles.push(FigureKind::Heatmap.title());
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), 4);
    }
}
