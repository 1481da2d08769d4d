use crate::errors::AnalysisError;
use crate::execution::evaluator::evaluate;
use crate::state::{
    AnalysisInputs, BestCombination, CandidateSpread, EnumerationStats, EvaluationResult, QuoteTable,
    RateParams, Scenario, Selection,
};

const ALPHABET_LEN: usize = 26;

/// Short alphabetic label for a zero-based candidate index.
///
/// Bijective base-26, spreadsheet column style:
/// 0 -> "A", 25 -> "Z", 26 -> "AA", 701 -> "ZZ", 702 -> "AAA".
pub fn candidate_label(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = smallvec::SmallVec::<[u8; 4]>::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % ALPHABET_LEN) as u8);
        n /= ALPHABET_LEN;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Evaluate every (lower, upper) pair and pick the best reward-to-risk ratio.
///
/// Outer loop over `lower_candidates`, inner loop over `upper_candidates`, both
/// in the given order. Labels and tie-breaks depend on that order.
/// Pairs with upper <= lower and pairs with an unquoted strike are excluded
/// and counted in the returned stats. An empty or riskless candidate set
/// yields `best == None`.
pub fn find_best(
    lower_candidates: &[f64],
    upper_candidates: &[f64],
    scenarios: &[Scenario],
    quotes: &QuoteTable,
    rate: &RateParams,
) -> Selection {
    let mut stats = EnumerationStats::default();
    let mut results: Vec<EvaluationResult> =
        Vec::with_capacity(lower_candidates.len() * upper_candidates.len());

    for &lower in lower_candidates {
        for &upper in upper_candidates {
            stats.pairs_considered += 1;

            let candidate = CandidateSpread::new(lower, upper);
            if !candidate.is_bull_spread() {
                stats.inverted_pairs += 1;
                tracing::debug!("excluding {lower}/{upper}: upper strike must exceed lower strike");
                continue;
            }

            match evaluate(candidate_label(results.len()), &candidate, scenarios, quotes, rate) {
                Ok(result) => results.push(result),
                Err(AnalysisError::MissingQuote { strike }) => {
                    stats.missing_quotes += 1;
                    tracing::warn!("excluding {lower}/{upper}: no quote for strike {strike}");
                }
                Err(e) => {
                    tracing::error!("excluding {lower}/{upper}: {e}");
                }
            }
        }
    }

    stats.evaluated = results.len();

    if stats.pairs_considered > 0 && stats.inverted_pairs == stats.pairs_considered {
        tracing::warn!(
            "no candidate pair has upper > lower ({} pairs considered)",
            stats.pairs_considered
        );
    }

    tracing::info!(
        "evaluated {} of {} pairs ({} inverted, {} missing quotes)",
        stats.evaluated,
        stats.pairs_considered,
        stats.inverted_pairs,
        stats.missing_quotes
    );

    let best = select_best(&results);
    match &best {
        Some(b) => tracing::info!(
            "best {} {}/{} ratio={:.4}",
            b.result.label,
            b.result.lower_strike,
            b.result.upper_strike,
            b.ratio
        ),
        None => tracing::info!("no candidate with positive standard deviation"),
    }

    Selection {
        best,
        results,
        stats,
    }
}

/// Run the enumeration over a validated set of inputs.
pub fn run(inputs: &AnalysisInputs) -> Selection {
    find_best(
        &inputs.lower_candidates,
        &inputs.upper_candidates,
        &inputs.scenarios,
        &inputs.quotes,
        &inputs.rate,
    )
}

/// Result with the strictly greatest expected profit / SD.
///
/// Zero-SD results are skipped. Ties keep the first result in slice order.
/// There is no floor on the ratio: the first finite ratio seeds the running
/// best, so a lone candidate with a large negative ratio is still selected.
pub fn select_best(results: &[EvaluationResult]) -> Option<BestCombination> {
    let mut best: Option<(&EvaluationResult, f64)> = None;

    for result in results {
        let Some(ratio) = result.ratio() else {
            continue;
        };
        if best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
            best = Some((result, ratio));
        }
    }

    best.map(|(result, ratio)| BestCombination {
        result: result.clone(),
        ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;

    fn three_scenarios() -> Vec<Scenario> {
        vec![
            Scenario::new(25350.0, 0.20),
            Scenario::new(24000.0, 0.60),
            Scenario::new(21250.0, 0.20),
        ]
    }

    #[test]
    fn test_labels() {
        assert_eq!(candidate_label(0), "A");
        assert_eq!(candidate_label(1), "B");
        assert_eq!(candidate_label(25), "Z");
        assert_eq!(candidate_label(26), "AA");
        assert_eq!(candidate_label(51), "AZ");
        assert_eq!(candidate_label(52), "BA");
        assert_eq!(candidate_label(701), "ZZ");
        assert_eq!(candidate_label(702), "AAA");
    }

    #[test]
    fn test_labels_unique() {
        let labels: std::collections::HashSet<String> = (0..2000).map(candidate_label).collect();
        assert_eq!(labels.len(), 2000);
    }

    #[test]
    fn test_excludes_inverted_pairs() {
        let quotes = QuoteTable::from_pairs([(100.0, 20.0), (150.0, 5.0), (200.0, 1.0)]).unwrap();
        let scenarios = vec![Scenario::new(90.0, 0.5), Scenario::new(180.0, 0.5)];
        let selection = find_best(&[100.0, 200.0], &[150.0, 100.0], &scenarios, &quotes, &RateParams::zero());

        assert_eq!(selection.results.len(), 1, "only (100, 150) is a bull spread");
        let only = &selection.results[0];
        assert_eq!((only.lower_strike, only.upper_strike), (100.0, 150.0));
        assert_eq!(only.label, "A");
        assert_eq!(selection.stats.pairs_considered, 4);
        assert_eq!(selection.stats.inverted_pairs, 3);
        assert_eq!(selection.stats.evaluated, 1);
    }

    #[test]
    fn test_missing_quotes_skipped_and_labels_stay_sequential() {
        let quotes = QuoteTable::from_pairs([(22000.0, 1594.0), (24200.0, 307.0), (24600.0, 210.0)]).unwrap();
        let selection = find_best(
            &[22000.0],
            &[24200.0, 25000.0, 24600.0],
            &three_scenarios(),
            &quotes,
            &RateParams::zero(),
        );

        assert_eq!(selection.stats.missing_quotes, 1);
        let labels: Vec<&str> = selection.results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(selection.results[1].upper_strike, 24600.0);
    }

    #[test]
    fn test_empty_pair_set_has_no_best() {
        let quotes = QuoteTable::from_pairs([(100.0, 10.0), (200.0, 2.0)]).unwrap();
        let selection = find_best(&[200.0], &[100.0], &three_scenarios(), &quotes, &RateParams::zero());
        assert!(selection.best.is_none());
        assert!(selection.results.is_empty());

        let empty = find_best(&[], &[], &three_scenarios(), &quotes, &RateParams::zero());
        assert!(empty.best.is_none());
        assert_eq!(empty.stats, EnumerationStats::default());
    }

    #[test]
    fn test_all_zero_sd_has_no_best() {
        let quotes = QuoteTable::from_pairs([(100.0, 10.0), (110.0, 4.0), (120.0, 1.0)]).unwrap();
        let certain = vec![Scenario::new(150.0, 1.0)];
        let selection = find_best(&[100.0], &[110.0, 120.0], &certain, &quotes, &RateParams::zero());
        assert_eq!(selection.results.len(), 2, "zero-SD results are still reported");
        assert!(selection.best.is_none());
    }

    #[test]
    fn test_ties_keep_first() {
        let quotes = QuoteTable::from_pairs([(22000.0, 1594.0), (24200.0, 307.0)]).unwrap();
        let selection = find_best(
            &[22000.0, 22000.0],
            &[24200.0],
            &three_scenarios(),
            &quotes,
            &RateParams::zero(),
        );
        assert_eq!(selection.results.len(), 2);
        let best = selection.best.expect("should select");
        assert_eq!(best.result.label, "A");
    }

    #[test]
    fn test_select_best_picks_greatest_ratio() {
        let make = |label: &str, e: f64, sd: f64| EvaluationResult {
            label: label.into(),
            lower_strike: 100.0,
            upper_strike: 110.0,
            expected_profit: e,
            standard_deviation: sd,
            future_cost: 0.0,
        };
        let results = vec![
            make("A", -5.0, 10.0),
            make("B", 50.0, 0.0),
            make("C", 3.0, 2.0),
            make("D", 6.0, 4.0),
        ];
        let best = select_best(&results).expect("should select");
        assert_eq!(best.result.label, "C");
        assert!((best.ratio - 1.5).abs() < 1e-12);

        // A negative ratio still wins when it is the only candidate.
        let lone = select_best(&results[..1]).expect("should select");
        assert_eq!(lone.result.label, "A");
        assert!(lone.ratio < 0.0);
    }

    #[test]
    fn test_select_best_has_no_ratio_floor() {
        let make = |label: &str, e: f64| EvaluationResult {
            label: label.into(),
            lower_strike: 100.0,
            upper_strike: 110.0,
            expected_profit: e,
            standard_deviation: 1.0,
            future_cost: 0.0,
        };
        let results = vec![make("A", -5000.0), make("B", -1200.0), make("C", -3000.0)];
        let best = select_best(&results).expect("ratios below -999 still compete");
        assert_eq!(best.result.label, "B");
        assert_eq!(best.ratio, -1200.0);
    }

    #[test]
    fn test_sample_run_selection() {
        let inputs = RunConfig::sample().unwrap().into_inputs().unwrap();
        let selection = run(&inputs);

        assert_eq!(selection.stats.pairs_considered, 64);
        assert_eq!(selection.stats.inverted_pairs, 3);
        assert_eq!(selection.stats.evaluated, 61);
        assert_eq!(selection.results[26].label, "AA");

        let best = selection.best.expect("sample run should select a spread");
        assert_eq!(best.result.label, "Y");
        assert_eq!(best.result.lower_strike, 23200.0);
        assert_eq!(best.result.upper_strike, 24200.0);
        assert!((best.ratio - 0.977_989_81).abs() < 1e-6, "ratio={}", best.ratio);
        assert!((best.result.expected_profit - 341.0367).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let inputs = RunConfig::sample().unwrap().into_inputs().unwrap();
        let first = run(&inputs);
        let second = run(&inputs);
        assert_eq!(first, second);
    }
}
