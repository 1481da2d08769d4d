//! Risk/reward scatter data for plotting.
//! The core only produces points; rendering belongs to whoever consumes the JSON.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::state::EvaluationResult;
use std::path::Path;

pub const CHART_TITLE: &str = "Bull Call Spread: Expected Profit vs. Standard Deviation";
pub const X_AXIS_TITLE: &str = "Standard Deviation of Profit";
pub const Y_AXIS_TITLE: &str = "Expected Profit";

/// One candidate on the chart: x = standard deviation, y = expected profit.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ScatterSeries {
    pub title: &'static str,
    pub x_axis_title: &'static str,
    pub y_axis_title: &'static str,
    pub points: Vec<ScatterPoint>,
}

impl ScatterSeries {
    /// Points in enumeration order.
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let points = results
            .iter()
            .map(|r| ScatterPoint {
                x: r.standard_deviation,
                y: r.expected_profit,
                label: r.label.clone(),
            })
            .collect();

        Self {
            title: CHART_TITLE,
            x_axis_title: X_AXIS_TITLE,
            y_axis_title: Y_AXIS_TITLE,
            points,
        }
    }

    /// Write the series as pretty JSON for an external plotting tool.
    pub fn write_json(&self, path: &Path) -> AnalysisResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| AnalysisError::Io(format!("write {}: {e}", path.display())))
    }
}
