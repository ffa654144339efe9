mod app;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod state;
mod stats;
mod ui;

use config::AnalysisConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::default();
    let report = pipeline::run(&config).inspect_err(|e| log::error!("{e:#}"))?;
    log::info!("R² da regressão: {:.4}", report.regression.r2);

    // Window closed without pressing "Mostrar Gráficos": nothing else to do.
    let Some(report) = app::run_summary(config, report)? else {
        return Ok(());
    };

    app::run_plots(&report)
}
