use crate::errors::{AnalysisError, AnalysisResult};
use crate::state::{AnalysisInputs, Compounding, QuoteTable, RateParams, Scenario, MONTHS_PER_YEAR};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Probabilities may drift this far from 1.0 before the run is rejected.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

const DAYS_PER_YEAR: f64 = 365.25;

/// Process-level settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Run file; the bundled sample chain is used when unset.
    pub input_path: Option<PathBuf>,
    /// Where to write the scatter series as JSON.
    pub scatter_output: Option<PathBuf>,
    /// Serve the finished run over HTTP on this port.
    pub server_port: Option<u16>,
}

impl AppConfig {
    pub fn from_env() -> AnalysisResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_opt("SERVER_PORT")
            .map(|v| {
                v.parse::<u16>()
                    .map_err(|e| AnalysisError::Config(format!("SERVER_PORT: {e}")))
            })
            .transpose()?;

        Ok(Self {
            input_path: env_var_opt("SPREAD_INPUT").map(PathBuf::from),
            scatter_output: env_var_opt("SCATTER_OUTPUT").map(PathBuf::from),
            server_port,
        })
    }

    pub fn load_run(&self) -> AnalysisResult<RunConfig> {
        match &self.input_path {
            Some(path) => RunConfig::from_file(path),
            None => {
                tracing::info!("SPREAD_INPUT not set, using bundled sample chain");
                RunConfig::sample()
            }
        }
    }
}

fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// One analysis run as described in a JSON file.
///
/// ```json
/// {
///   "scenarios": [{"name": "Base", "price": 24000, "probability": 1.0}],
///   "quoteTable": {"22000": 1594, "24200": 307},
///   "lowerCandidates": [22000],
///   "upperCandidates": [24200],
///   "annualRate": 0.0342,
///   "periodsToExpiry": 1
/// }
/// ```
///
/// `periodsToExpiry` (months) may be replaced by `valuationDate` and
/// `expiryDate`. `compounding` is `"singlePeriod"` (default) or `"perPeriod"`.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub scenarios: Vec<Scenario>,
    pub quote_table: QuoteTable,
    pub lower_candidates: Vec<f64>,
    pub upper_candidates: Vec<f64>,
    pub annual_rate: f64,
    #[serde(default)]
    pub periods_to_expiry: Option<f64>,
    #[serde(default)]
    pub valuation_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub compounding: Compounding,
}

impl RunConfig {
    pub fn from_json(json: &str) -> AnalysisResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> AnalysisResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::Io(format!("read {}: {e}", path.display())))?;
        let run = Self::from_json(&raw)?;
        tracing::info!("loaded run from {}", path.display());
        Ok(run)
    }

    /// Index call chain with a bull/base/bear scenario set.
    pub fn sample() -> AnalysisResult<Self> {
        Self::from_json(include_str!("../data/sample_run.json"))
    }

    /// Months from entry to expiry, explicit or derived from the dates.
    pub fn periods(&self) -> AnalysisResult<f64> {
        let span_days = self.date_span_days()?;
        if let Some(periods) = self.periods_to_expiry {
            return Ok(periods);
        }
        match span_days {
            Some(days) => Ok(days as f64 / (DAYS_PER_YEAR / MONTHS_PER_YEAR)),
            None => Err(AnalysisError::Config(
                "periodsToExpiry or both valuationDate and expiryDate are required".into(),
            )),
        }
    }

    /// Days from valuation to expiry when both dates are given.
    /// Inverted dates are rejected even when `periodsToExpiry` overrides them.
    fn date_span_days(&self) -> AnalysisResult<Option<i64>> {
        let (Some(valuation), Some(expiry)) = (self.valuation_date, self.expiry_date) else {
            return Ok(None);
        };
        if expiry < valuation {
            return Err(AnalysisError::DegenerateInput(format!(
                "expiry date {expiry} is before valuation date {valuation}"
            )));
        }
        Ok(Some((expiry - valuation).num_days()))
    }

    /// Reject inputs the evaluator would silently mis-handle.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.scenarios.is_empty() {
            return degenerate("scenario list is empty");
        }
        for (i, s) in self.scenarios.iter().enumerate() {
            if !(s.price.is_finite() && s.price > 0.0) {
                return degenerate(&format!("scenario {i}: price must be positive, got {}", s.price));
            }
            if !(0.0..=1.0).contains(&s.probability) {
                return degenerate(&format!(
                    "scenario {i}: probability must be in [0, 1], got {}",
                    s.probability
                ));
            }
        }
        let total: f64 = self.scenarios.iter().map(|s| s.probability).sum();
        if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return degenerate(&format!("scenario probabilities sum to {total}, expected 1"));
        }

        for q in self.quote_table.quotes() {
            if q.strike <= 0.0 {
                return degenerate(&format!("quote strike must be positive, got {}", q.strike));
            }
            if !(q.premium.is_finite() && q.premium >= 0.0) {
                return degenerate(&format!(
                    "premium for strike {} must be non-negative, got {}",
                    q.strike, q.premium
                ));
            }
        }

        for (name, list) in [
            ("lowerCandidates", &self.lower_candidates),
            ("upperCandidates", &self.upper_candidates),
        ] {
            if list.is_empty() {
                return degenerate(&format!("{name} is empty"));
            }
            if let Some(k) = list.iter().find(|k| !(k.is_finite() && **k > 0.0)) {
                return degenerate(&format!("{name}: strike must be positive, got {k}"));
            }
        }

        if !self.annual_rate.is_finite() {
            return degenerate(&format!("annualRate must be finite, got {}", self.annual_rate));
        }
        let periods = self.periods()?;
        if !(periods.is_finite() && periods > 0.0) {
            return degenerate(&format!("periods to expiry must be positive, got {periods}"));
        }

        Ok(())
    }

    /// Validate and convert into evaluator inputs.
    pub fn into_inputs(self) -> AnalysisResult<AnalysisInputs> {
        self.validate()?;
        let rate = RateParams {
            compounding: self.compounding,
            ..RateParams::new(self.annual_rate, self.periods()?)
        };

        tracing::info!(
            "{} scenarios, {} quotes, {}x{} candidate strikes, rate {:.4}/yr over {:.2} months ({})",
            self.scenarios.len(),
            self.quote_table.len(),
            self.lower_candidates.len(),
            self.upper_candidates.len(),
            rate.annual_rate,
            rate.periods_to_expiry,
            rate.compounding
        );
        for s in &self.scenarios {
            tracing::debug!(
                "scenario {}: price={} p={}",
                s.name.as_deref().unwrap_or("-"),
                s.price,
                s.probability
            );
        }

        Ok(AnalysisInputs {
            scenarios: self.scenarios,
            quotes: self.quote_table,
            lower_candidates: self.lower_candidates,
            upper_candidates: self.upper_candidates,
            rate,
        })
    }
}

fn degenerate<T>(msg: &str) -> AnalysisResult<T> {
    Err(AnalysisError::DegenerateInput(msg.to_string()))
}
