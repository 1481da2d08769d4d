//! Scenario-weighted statistics for a single bull call spread.
//!
//! net_i = payoff(S_i) - FV(cost)
//! E[X]  = sum_i p_i * net_i
//! Var   = sum_i p_i * (net_i - E[X])^2
//! SD    = sqrt(Var)
//!
//! Var is the population variance under the discrete scenario measure,
//! there is no Bessel correction. Pure function: same inputs, same output.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::models::cost::future_cost_with;
use crate::models::payoff::payoff;
use crate::state::{CandidateSpread, EvaluationResult, QuoteTable, RateParams, Scenario};
use smallvec::SmallVec;

/// Net payoffs per scenario. Scenario sets are small, keep them on the stack.
type NetPayoffs = SmallVec<[f64; 8]>;

/// Evaluate one candidate across all scenarios.
///
/// Fails with `InvalidCandidate` when the upper strike does not exceed the
/// lower strike and with `MissingQuote` when either strike is unquoted.
pub fn evaluate(
    label: String,
    candidate: &CandidateSpread,
    scenarios: &[Scenario],
    quotes: &QuoteTable,
    rate: &RateParams,
) -> AnalysisResult<EvaluationResult> {
    let lower = candidate.lower_strike;
    let upper = candidate.upper_strike;

    if !candidate.is_bull_spread() {
        return Err(AnalysisError::InvalidCandidate { lower, upper });
    }

    // Entry cost carried to expiry, shared by every scenario.
    let future_cost = future_cost_with(lower, upper, quotes, rate)?;

    let net_payoffs: NetPayoffs = scenarios
        .iter()
        .map(|s| payoff(s.price, lower, upper) - future_cost)
        .collect();

    let expected_profit: f64 = scenarios
        .iter()
        .zip(&net_payoffs)
        .map(|(s, net)| s.probability * net)
        .sum();

    let standard_deviation = if is_riskless(scenarios, &net_payoffs) {
        0.0
    } else {
        let variance: f64 = scenarios
            .iter()
            .zip(&net_payoffs)
            .map(|(s, net)| {
                let dev = net - expected_profit;
                s.probability * dev * dev
            })
            .sum();
        variance.max(0.0).sqrt()
    };

    tracing::trace!(
        "{label} {lower}/{upper}: cost={future_cost:.4} E={expected_profit:.4} SD={standard_deviation:.4}"
    );

    Ok(EvaluationResult {
        label,
        lower_strike: lower,
        upper_strike: upper,
        expected_profit,
        standard_deviation,
        future_cost,
    })
}

/// Every scenario that can occur pays the same, so there is no dispersion.
/// Checked exactly so rounding in the weighted sums cannot leak a tiny SD.
fn is_riskless(scenarios: &[Scenario], net_payoffs: &[f64]) -> bool {
    let mut live = scenarios
        .iter()
        .zip(net_payoffs)
        .filter(|(s, _)| s.probability > 0.0)
        .map(|(_, net)| *net);

    match live.next() {
        Some(first) => live.all(|net| net == first),
        None => true,
    }
}
