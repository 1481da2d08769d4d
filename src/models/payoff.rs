/// Terminal payoff of a bull call spread.
///
/// payoff = max(S_T - K_low, 0) - max(S_T - K_high, 0)
///
/// Long call at K_low, short call at K_high. For K_high > K_low the result is
/// bounded in [0, K_high - K_low] and non-decreasing in S_T.
/// Pure function, no allocations.
#[inline]
pub fn payoff(final_price: f64, lower_strike: f64, upper_strike: f64) -> f64 {
    let long_call = (final_price - lower_strike).max(0.0);
    let short_call = (final_price - upper_strike).max(0.0);
    long_call - short_call
}
