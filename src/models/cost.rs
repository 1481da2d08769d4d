//! Future value of the premium paid to open a bull call spread.
//!
//! net = premium(K_low) - premium(K_high)
//! FV  = net * (1 + r)^n
//!
//! The default model carries the cost for a single period (n = 1) whatever the
//! time to expiry. `Compounding::PerPeriod` uses n = periods_to_expiry.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::state::{Compounding, QuoteTable, RateParams};

/// Premium paid for the long leg minus premium received for the short leg.
#[inline]
pub fn net_premium(lower_strike: f64, upper_strike: f64, quotes: &QuoteTable) -> AnalysisResult<f64> {
    let long_leg = quotes
        .premium(lower_strike)
        .ok_or(AnalysisError::MissingQuote { strike: lower_strike })?;
    let short_leg = quotes
        .premium(upper_strike)
        .ok_or(AnalysisError::MissingQuote { strike: upper_strike })?;
    Ok(long_leg - short_leg)
}

/// Net premium compounded forward one period at `period_rate`.
#[inline]
pub fn future_cost(
    lower_strike: f64,
    upper_strike: f64,
    quotes: &QuoteTable,
    period_rate: f64,
) -> AnalysisResult<f64> {
    let net = net_premium(lower_strike, upper_strike, quotes)?;
    Ok(net * (1.0 + period_rate))
}

/// Net premium compounded forward according to the rate parameters.
pub fn future_cost_with(
    lower_strike: f64,
    upper_strike: f64,
    quotes: &QuoteTable,
    rate: &RateParams,
) -> AnalysisResult<f64> {
    match rate.compounding {
        Compounding::SinglePeriod => future_cost(lower_strike, upper_strike, quotes, rate.period_rate()),
        Compounding::PerPeriod => {
            let net = net_premium(lower_strike, upper_strike, quotes)?;
            Ok(net * (1.0 + rate.period_rate()).powf(rate.periods_to_expiry))
        }
    }
}
