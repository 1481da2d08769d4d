//! Text reports for a finished selection. Pure functions returning strings;
//! the caller decides where they go.

use crate::state::{EvaluationResult, Selection};

pub const NO_RESULT_MESSAGE: &str = "No valid combination found.";

/// Summary of the selected spread, or the no-result message.
pub fn render_summary(selection: &Selection) -> String {
    let Some(best) = &selection.best else {
        return NO_RESULT_MESSAGE.to_string();
    };
    let r = &best.result;

    format!(
        "Optimal combination based on (Expected Profit/SD) ratio:\n\
         Label: {}\n  \
         Lower strike: {}\n  \
         Upper strike: {}\n  \
         Expected Profit: {:.2}\n  \
         Standard Deviation: {:.2}\n  \
         Ratio (Exp Profit / SD): {:.2}",
        r.label, r.lower_strike, r.upper_strike, r.expected_profit, r.standard_deviation, best.ratio
    )
}

/// Fixed-width listing of every evaluated candidate.
pub fn render_table(results: &[EvaluationResult]) -> String {
    let header = format!(
        "{:<6} {:>10} {:>10} {:>12} {:>12} {:>12} {:>8}\n",
        "label", "lower", "upper", "fv_cost", "exp_profit", "std_dev", "ratio"
    );
    let rows = results.iter().map(|r| {
        let ratio = r
            .ratio()
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{:<6} {:>10} {:>10} {:>12.2} {:>12.2} {:>12.2} {:>8}\n",
            r.label, r.lower_strike, r.upper_strike, r.future_cost, r.expected_profit, r.standard_deviation, ratio
        )
    });
    std::iter::once(header).chain(rows).collect()
}
