pub mod cost;
pub mod payoff;
