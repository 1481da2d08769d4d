use crate::report::scatter::ScatterSeries;
use crate::state::{AppState, EvaluationResult};
use axum::extract::State;
use axum::response::Json;
use std::sync::Arc;

/// GET /api/results -- every evaluated candidate in enumeration order
pub async fn get_results(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<EvaluationResult>> {
    Json(state.selection.results.clone())
}

/// GET /api/best -- selected spread, or null when nothing qualified
pub async fn get_best(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    match &state.selection.best {
        Some(best) => Json(serde_json::json!({ "run_id": state.run_id, "best": best })),
        None => Json(serde_json::json!({
            "run_id": state.run_id,
            "best": null,
            "message": crate::report::summary::NO_RESULT_MESSAGE,
        })),
    }
}

/// GET /api/scatter -- (sd, expected profit, label) points for plotting
pub async fn get_scatter(
    State(state): State<Arc<AppState>>,
) -> Json<ScatterSeries> {
    Json(state.scatter.clone())
}

/// GET /api/report -- plain-text summary
pub async fn get_report(
    State(state): State<Arc<AppState>>,
) -> String {
    state.report.clone()
}

/// GET /api/stats -- how the candidate grid was filtered
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "run_id": state.run_id,
        "stats": state.selection.stats,
    }))
}
