use crate::report::{BackendStatistics, LeaderboardEntry};

/// Projects aggregated statistics into a ranked leaderboard, best average
/// score first. Ranks are positional (1..n) with no gaps and no
/// duplicates; the order among exactly tied averages is whatever the
/// stable sort produced and is not a contract.
pub fn build(stats: &[BackendStatistics]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = stats
        .iter()
        .map(|s| LeaderboardEntry {
            rank: 0,
            backend: s.backend.clone(),
            provider: s.backend_info.provider.clone(),
            model: s.backend_info.model.clone(),
            avg_score: s.avg_score,
            std_dev: s.std_dev,
            consistency: s.consistency,
            avg_latency_ms: s.avg_latency_ms,
            run_count: s.run_count,
        })
        .collect();

    entries.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    entries
}
