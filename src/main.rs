mod config;
mod errors;
mod execution;
mod models;
mod report;
mod server;
mod state;

use crate::errors::AnalysisResult;
use crate::execution::selector;
use crate::report::scatter::ScatterSeries;
use crate::report::summary;
use crate::state::{AppState, Selection};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Structured logging on stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id);

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let (selection, scatter, report) = match span.in_scope(|| analyze(&cfg)) {
        Ok(out) => out,
        Err(e) => {
            tracing::error!("run {run_id} failed: {e}");
            std::process::exit(1);
        }
    };

    let Some(port) = cfg.server_port else {
        return;
    };

    let app_state = Arc::new(AppState {
        run_id,
        selection,
        scatter,
        report,
    });
    let app = server::router(app_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("serving results on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}

/// Load, validate, evaluate and report one run. Synchronous; nothing here awaits.
fn analyze(cfg: &config::AppConfig) -> AnalysisResult<(Selection, ScatterSeries, String)> {
    tracing::info!("spread_scout starting");

    // Validate everything up front; evaluation itself cannot fail.
    let inputs = cfg.load_run()?.into_inputs()?;

    let selection = selector::run(&inputs);
    let scatter = ScatterSeries::from_results(&selection.results);
    let report = summary::render_summary(&selection);

    eprintln!("{}", summary::render_table(&selection.results));
    println!("{report}");

    if let Some(path) = &cfg.scatter_output {
        scatter.write_json(path)?;
        tracing::info!("scatter series written to {}", path.display());
    }

    Ok((selection, scatter, report))
}
