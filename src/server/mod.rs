pub mod routes;

use crate::state::AppState;
use std::sync::Arc;

/// Read-only API over a finished run.
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/api/results", axum::routing::get(routes::get_results))
        .route("/api/best", axum::routing::get(routes::get_best))
        .route("/api/scatter", axum::routing::get(routes::get_scatter))
        .route("/api/report", axum::routing::get(routes::get_report))
        .route("/api/stats", axum::routing::get(routes::get_stats))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::scatter::ScatterSeries;
    use crate::report::summary::{render_summary, NO_RESULT_MESSAGE};
    use crate::state::{BestCombination, EnumerationStats, EvaluationResult, Selection};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn result(label: &str, sd: f64) -> EvaluationResult {
        EvaluationResult {
            label: label.into(),
            lower_strike: 22000.0,
            upper_strike: 24200.0,
            expected_profit: 353.0,
            standard_deviation: sd,
            future_cost: 1287.0,
        }
    }

    fn app_with(best: Option<BestCombination>, results: Vec<EvaluationResult>) -> axum::Router {
        let selection = Selection {
            best,
            stats: EnumerationStats {
                pairs_considered: results.len(),
                evaluated: results.len(),
                ..EnumerationStats::default()
            },
            results,
        };
        let state = AppState {
            run_id: uuid::Uuid::new_v4(),
            scatter: ScatterSeries::from_results(&selection.results),
            report: render_summary(&selection),
            selection,
        };
        router(Arc::new(state))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get_json(app: axum::Router, uri: &str) -> serde_json::Value {
        let (status, body) = get(app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri} status");
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_best_is_null_without_selection() {
        let app = app_with(None, vec![result("A", 0.0)]);
        let body = get_json(app, "/api/best").await;
        assert!(body["best"].is_null(), "best should be null: {body}");
        assert_eq!(body["message"], NO_RESULT_MESSAGE);
        assert!(body["run_id"].is_string());
    }

    #[tokio::test]
    async fn test_best_flattens_result_and_ratio() {
        let chosen = result("A", 706.0);
        let best = BestCombination {
            ratio: 0.5,
            result: chosen.clone(),
        };
        let body = get_json(app_with(Some(best), vec![chosen]), "/api/best").await;
        assert_eq!(body["best"]["label"], "A");
        assert_eq!(body["best"]["lower_strike"], 22000.0);
        assert_eq!(body["best"]["ratio"], 0.5);
    }

    #[tokio::test]
    async fn test_results_scatter_and_stats() {
        let app = app_with(None, vec![result("A", 10.0), result("B", 20.0)]);

        let results = get_json(app.clone(), "/api/results").await;
        assert_eq!(results.as_array().map(Vec::len), Some(2));

        let scatter = get_json(app.clone(), "/api/scatter").await;
        assert_eq!(scatter["x_axis_title"], "Standard Deviation of Profit");
        assert_eq!(scatter["points"][1]["label"], "B");
        assert_eq!(scatter["points"][1]["x"], 20.0);

        let stats = get_json(app, "/api/stats").await;
        assert_eq!(stats["stats"]["evaluated"], 2);
    }

    #[tokio::test]
    async fn test_report_is_plain_text() {
        let (status, body) = get(app_with(None, vec![]), "/api/report").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), NO_RESULT_MESSAGE);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, _) = get(app_with(None, vec![]), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
