use crate::errors::{AnalysisError, AnalysisResult};
use crate::report::scatter::ScatterSeries;

/// Rate parameters are quoted per annum and applied per month.
pub const MONTHS_PER_YEAR: f64 = 12.0;

// ── Input Tables ──

/// One terminal price of the underlying and its probability.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    /// Optional tag such as "Bull" or "Bear", only used in logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price: f64,
    pub probability: f64,
}

#[cfg(test)]
impl Scenario {
    pub fn new(price: f64, probability: f64) -> Self {
        Self {
            name: None,
            price,
            probability,
        }
    }

    pub fn named(name: &str, price: f64, probability: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            price,
            probability,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct OptionQuote {
    pub strike: f64,
    pub premium: f64,
}

/// Call premiums keyed by strike. Sorted by strike, strikes unique.
///
/// Deserializes from a JSON object whose keys are strikes:
/// `{"22000": 1594, "24200": 307}`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(try_from = "RawQuotes")]
pub struct QuoteTable {
    quotes: Vec<OptionQuote>,
}

impl QuoteTable {
    pub fn from_pairs<I>(pairs: I) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut quotes: Vec<OptionQuote> = pairs
            .into_iter()
            .map(|(strike, premium)| OptionQuote { strike, premium })
            .collect();

        if let Some(q) = quotes.iter().find(|q| !q.strike.is_finite()) {
            return Err(AnalysisError::DegenerateInput(format!(
                "quote table strike is not finite: {}",
                q.strike
            )));
        }

        quotes.sort_by(|a, b| a.strike.total_cmp(&b.strike));

        if let Some(pair) = quotes.windows(2).find(|w| w[0].strike == w[1].strike) {
            return Err(AnalysisError::DegenerateInput(format!(
                "duplicate strike in quote table: {}",
                pair[0].strike
            )));
        }

        Ok(Self { quotes })
    }

    /// Premium quoted for exactly this strike.
    #[inline]
    pub fn premium(&self, strike: f64) -> Option<f64> {
        self.quotes
            .binary_search_by(|q| q.strike.total_cmp(&strike))
            .ok()
            .map(|i| self.quotes[i].premium)
    }

    pub fn quotes(&self) -> &[OptionQuote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }
}

/// Quote table entries exactly as they appear in the JSON object, repeated
/// keys included, so duplicates reach `QuoteTable::from_pairs` instead of
/// being collapsed by a map.
struct RawQuotes(Vec<(String, f64)>);

impl<'de> serde::Deserialize<'de> for RawQuotes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RawQuotesVisitor;

        impl<'de> serde::de::Visitor<'de> for RawQuotesVisitor {
            type Value = RawQuotes;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an object mapping strike to premium")
            }

            fn visit_map<A>(self, mut map: A) -> Result<RawQuotes, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, f64>()? {
                    entries.push(entry);
                }
                Ok(RawQuotes(entries))
            }
        }

        deserializer.deserialize_map(RawQuotesVisitor)
    }
}

impl TryFrom<RawQuotes> for QuoteTable {
    type Error = AnalysisError;

    fn try_from(raw: RawQuotes) -> AnalysisResult<Self> {
        let pairs = raw
            .0
            .into_iter()
            .map(|(key, premium)| {
                key.trim()
                    .parse::<f64>()
                    .map(|strike| (strike, premium))
                    .map_err(|e| AnalysisError::Parse(format!("quote strike {key:?}: {e}")))
            })
            .collect::<AnalysisResult<Vec<_>>>()?;
        Self::from_pairs(pairs)
    }
}

// ── Candidates and Rates ──

/// Long call at `lower_strike`, short call at `upper_strike`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CandidateSpread {
    pub lower_strike: f64,
    pub upper_strike: f64,
}

impl CandidateSpread {
    pub fn new(lower_strike: f64, upper_strike: f64) -> Self {
        Self {
            lower_strike,
            upper_strike,
        }
    }

    /// A bull call spread needs the short leg strictly above the long leg.
    #[inline]
    pub fn is_bull_spread(&self) -> bool {
        self.upper_strike > self.lower_strike
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Compounding {
    /// Entry cost grows for exactly one period regardless of time to expiry.
    #[default]
    SinglePeriod,
    /// Entry cost grows for `periods_to_expiry` periods.
    PerPeriod,
}

impl std::fmt::Display for Compounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SinglePeriod => write!(f, "single-period"),
            Self::PerPeriod => write!(f, "per-period"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RateParams {
    pub annual_rate: f64,
    /// Months from entry to expiry, may be fractional.
    pub periods_to_expiry: f64,
    pub compounding: Compounding,
}

impl RateParams {
    pub fn new(annual_rate: f64, periods_to_expiry: f64) -> Self {
        Self {
            annual_rate,
            periods_to_expiry,
            compounding: Compounding::SinglePeriod,
        }
    }

    #[cfg(test)]
    pub fn zero() -> Self {
        Self::new(0.0, 1.0)
    }

    #[inline]
    pub fn period_rate(&self) -> f64 {
        self.annual_rate / MONTHS_PER_YEAR
    }
}

// ── Evaluation Output ──

/// Statistics of one candidate spread across all scenarios.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EvaluationResult {
    pub label: String,
    pub lower_strike: f64,
    pub upper_strike: f64,
    pub expected_profit: f64,
    pub standard_deviation: f64,
    /// Net premium carried forward to expiry.
    pub future_cost: f64,
}

impl EvaluationResult {
    /// Expected profit per unit of standard deviation.
    /// None when the deviation is zero or the ratio is not finite.
    #[inline]
    pub fn ratio(&self) -> Option<f64> {
        if self.standard_deviation > 0.0 {
            let r = self.expected_profit / self.standard_deviation;
            r.is_finite().then_some(r)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BestCombination {
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub ratio: f64,
}

/// How the candidate grid was filtered before evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct EnumerationStats {
    pub pairs_considered: usize,
    pub inverted_pairs: usize,
    pub missing_quotes: usize,
    pub evaluated: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// None when no candidate has a positive standard deviation.
    pub best: Option<BestCombination>,
    /// Every evaluated candidate in enumeration order.
    pub results: Vec<EvaluationResult>,
    pub stats: EnumerationStats,
}

/// Everything one analysis run needs, already validated.
#[derive(Debug, Clone)]
pub struct AnalysisInputs {
    pub scenarios: Vec<Scenario>,
    pub quotes: QuoteTable,
    pub lower_candidates: Vec<f64>,
    pub upper_candidates: Vec<f64>,
    pub rate: RateParams,
}

// ── Shared Server State ──

/// Immutable snapshot of a finished run, shared with HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    pub run_id: uuid::Uuid,
    pub selection: Selection,
    pub scatter: ScatterSeries,
    pub report: String,
}
