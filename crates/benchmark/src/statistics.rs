use crate::report::BackendStatistics;
use core_types::RunResult;
use std::collections::{BTreeMap, HashMap};

/// Groups run results by backend display name and computes the
/// distribution summaries for each group.
///
/// Failed runs count toward `failure_count` but are excluded from every
/// score and latency distribution. Insertion order of the results is
/// irrelevant; grouping is keyed, not positional.
pub fn aggregate(results: &[RunResult]) -> Vec<BackendStatistics> {
    let mut groups: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
    for result in results {
        groups.entry(&result.backend).or_default().push(result);
    }

    let mut stats: Vec<BackendStatistics> = groups
        .into_iter()
        .map(|(backend, runs)| summarize(backend, &runs))
        .collect();

    // Best average first; the leaderboard re-sorts anyway, but a report
    // reader scanning the statistics list gets the same order.
    stats.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));
    stats
}

fn summarize(backend: &str, runs: &[&RunResult]) -> BackendStatistics {
    let backend_info = runs
        .iter()
        .map(|r| r.backend_info.clone())
        .next()
        .unwrap_or_default();

    let mut stat = BackendStatistics {
        backend: backend.to_string(),
        backend_info,
        run_count: runs.len(),
        success_count: 0,
        failure_count: 0,
        avg_score: 0.0,
        min_score: 0.0,
        max_score: 0.0,
        std_dev: 0.0,
        avg_latency_ms: 0.0,
        min_latency_ms: 0.0,
        max_latency_ms: 0.0,
        consistency: 0.0,
        indicator_avgs: HashMap::new(),
    };

    let mut scores = Vec::new();
    let mut latencies = Vec::new();
    let mut indicator_sums: HashMap<&'static str, f64> = HashMap::new();
    let mut indicator_counts: HashMap<&'static str, usize> = HashMap::new();

    for run in runs {
        if !run.is_success() {
            stat.failure_count += 1;
            continue;
        }
        stat.success_count += 1;
        scores.push(run.total_score);
        latencies.push(run.latency_ms);

        if let Some(run_scores) = &run.scores {
            for (name, value) in run_scores.fields() {
                *indicator_sums.entry(name).or_insert(0.0) += value;
                *indicator_counts.entry(name).or_insert(0) += 1;
            }
        }
    }

    if !scores.is_empty() {
        stat.avg_score = average(&scores);
        stat.min_score = min(&scores);
        stat.max_score = max(&scores);
        stat.std_dev = std_dev(&scores);
        stat.avg_latency_ms = average(&latencies);
        stat.min_latency_ms = min(&latencies);
        stat.max_latency_ms = max(&latencies);

        if stat.avg_score > 0.0 {
            stat.consistency = (100.0 - (stat.std_dev / stat.avg_score) * 100.0).max(0.0);
        }

        for (name, sum) in indicator_sums {
            let count = indicator_counts[name];
            if count > 0 {
                stat.indicator_avgs
                    .insert(name.to_string(), sum / count as f64);
            }
        }
    }

    stat
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Sample standard deviation (n - 1 divisor); 0 for fewer than two values.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = average(values);
    let sum_squares: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    (sum_squares / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{BackendInfo, IndicatorSet, ScoreSet};

    fn result(backend: &str, total: f64, latency: f64, error: Option<&str>) -> RunResult {
        let success = error.is_none();
        RunResult {
            snapshot_id: "snap".to_string(),
            backend: backend.to_string(),
            backend_info: BackendInfo {
                provider: "openai".to_string(),
                model: "m".to_string(),
                display_name: backend.to_string(),
                base_url: String::new(),
            },
            run_index: 0,
            expected: IndicatorSet::default(),
            actual: success.then(IndicatorSet::default),
            errors: HashMap::new(),
            scores: success.then(|| ScoreSet {
                ma20: total,
                ema12: total,
                ema26: total,
                macd: total,
                rsi14: total,
                boll_upper: total,
                boll_middle: total,
                boll_lower: total,
                atr14: total,
                volume_ma5: total,
            }),
            total_score: if success { total } else { 0.0 },
            latency_ms: latency,
            raw_output: String::new(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn computes_distribution_summaries_per_backend() {
        let results = vec![
            result("A", 80.0, 1000.0, None),
            result("A", 100.0, 3000.0, None),
            result("B", 60.0, 500.0, None),
        ];
        let stats = aggregate(&results);

        assert_eq!(stats.len(), 2);
        // Sorted by average score descending: A (90) before B (60).
        assert_eq!(stats[0].backend, "A");
        assert_eq!(stats[0].run_count, 2);
        assert_eq!(stats[0].success_count, 2);
        assert_eq!(stats[0].avg_score, 90.0);
        assert_eq!(stats[0].min_score, 80.0);
        assert_eq!(stats[0].max_score, 100.0);
        // Sample stddev of [80, 100] = sqrt(200) ≈ 14.142.
        assert!((stats[0].std_dev - 200.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(stats[0].avg_latency_ms, 2000.0);
        assert_eq!(stats[0].min_latency_ms, 1000.0);
        assert_eq!(stats[0].max_latency_ms, 3000.0);
    }

    #[test]
    fn failures_count_but_do_not_skew_distributions() {
        let results = vec![
            result("A", 100.0, 1000.0, None),
            result("A", 0.0, 9999.0, Some("request failed")),
        ];
        let stats = aggregate(&results);

        assert_eq!(stats[0].run_count, 2);
        assert_eq!(stats[0].success_count, 1);
        assert_eq!(stats[0].failure_count, 1);
        assert_eq!(stats[0].avg_score, 100.0);
        assert_eq!(stats[0].avg_latency_ms, 1000.0);
        assert_eq!(stats[0].std_dev, 0.0);
    }

    #[test]
    fn all_failed_backend_has_zeroed_distributions() {
        let results = vec![result("A", 0.0, 0.0, Some("boom"))];
        let stats = aggregate(&results);

        assert_eq!(stats[0].failure_count, 1);
        assert_eq!(stats[0].avg_score, 0.0);
        assert_eq!(stats[0].min_score, 0.0);
        assert_eq!(stats[0].max_score, 0.0);
        assert!(stats[0].indicator_avgs.is_empty());
    }

    #[test]
    fn consistency_is_clamped_at_zero() {
        // avg 10, stddev ~14.14 -> raw consistency is negative.
        let results = vec![
            result("A", 0.0, 100.0, None),
            result("A", 20.0, 100.0, None),
        ];
        let stats = aggregate(&results);
        assert_eq!(stats[0].consistency, 0.0);
    }

    #[test]
    fn indicator_averages_span_successful_runs() {
        let results = vec![
            result("A", 100.0, 100.0, None),
            result("A", 60.0, 100.0, None),
        ];
        let stats = aggregate(&results);
        assert_eq!(stats[0].indicator_avgs["ma20"], 80.0);
        assert_eq!(stats[0].indicator_avgs.len(), 10);
    }
}
