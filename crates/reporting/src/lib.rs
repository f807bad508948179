//! Terminal and file renderers for the benchmark report.
//!
//! The report aggregate is self-contained, so everything here is a pure
//! projection of it: a leaderboard table, a per-backend indicator
//! breakdown, and a JSON export for downstream tooling.

use benchmark::report::{BackendStatistics, BenchmarkReport, LeaderboardEntry};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use core_types::{BackendInfo, INDICATOR_NAMES};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders the ranked leaderboard as a terminal table.
pub fn leaderboard_table(entries: &[LeaderboardEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Rank",
            "Backend",
            "Provider",
            "Model",
            "Avg Score",
            "Std Dev",
            "Consistency",
            "Avg Latency",
            "Runs",
        ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.rank),
            Cell::new(&entry.backend),
            Cell::new(&entry.provider),
            Cell::new(&entry.model),
            Cell::new(format!("{:.1}", entry.avg_score)),
            Cell::new(format!("{:.1}", entry.std_dev)),
            Cell::new(format!("{:.1}", entry.consistency)),
            Cell::new(format!("{:.0} ms", entry.avg_latency_ms)),
            Cell::new(entry.run_count),
        ]);
    }

    table
}

/// Renders the backend registry: provider, default model and endpoint per
/// entry.
pub fn backends_table(backends: &[BackendInfo]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Backend", "Provider", "Model", "Base URL"]);

    for backend in backends {
        table.add_row(vec![
            Cell::new(&backend.display_name),
            Cell::new(&backend.provider),
            Cell::new(&backend.model),
            Cell::new(&backend.base_url),
        ]);
    }

    table
}

/// Renders one backend's per-indicator average scores.
pub fn indicator_table(stats: &BackendStatistics) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Indicator", "Avg Score"]);

    for name in INDICATOR_NAMES {
        let avg = stats.indicator_avgs.get(name).copied().unwrap_or(0.0);
        table.add_row(vec![Cell::new(name), Cell::new(format!("{avg:.1}"))]);
    }

    table
}

/// Short per-backend summary lines for the run log: success ratio plus
/// score and latency ranges.
pub fn summary_lines(report: &BenchmarkReport) -> Vec<String> {
    report
        .statistics
        .iter()
        .map(|s| {
            format!(
                "{}: {}/{} ok, score {:.1} (min {:.1}, max {:.1}), latency {:.0} ms",
                s.backend,
                s.success_count,
                s.run_count,
                s.avg_score,
                s.min_score,
                s.max_score,
                s.avg_latency_ms,
            )
        })
        .collect()
}

/// Writes the full report as pretty-printed JSON into `dir`, named after
/// the report id. Returns the path written.
pub fn write_report_json(report: &BenchmarkReport, dir: &Path) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("report_{}.json", report.id));
    let data = serde_json::to_string_pretty(report)?;
    fs::write(&path, data)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn entry(rank: usize, backend: &str, avg: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            backend: backend.to_string(),
            provider: "openai".to_string(),
            model: "m".to_string(),
            avg_score: avg,
            std_dev: 1.5,
            consistency: 98.3,
            avg_latency_ms: 1234.0,
            run_count: 3,
        }
    }

    #[test]
    fn leaderboard_table_renders_every_entry() {
        let table = leaderboard_table(&[entry(1, "alpha", 92.5), entry(2, "beta", 71.0)]);
        let rendered = table.to_string();

        assert!(rendered.contains("alpha"));
        assert!(rendered.contains("beta"));
        assert!(rendered.contains("92.5"));
        assert!(rendered.contains("1234 ms"));
    }

    #[test]
    fn backends_table_renders_registry_entries() {
        let backends = vec![BackendInfo {
            provider: "deepseek".to_string(),
            model: "deepseek-chat".to_string(),
            display_name: "DeepSeek-Chat".to_string(),
            base_url: "https://api.deepseek.com".to_string(),
        }];
        let rendered = backends_table(&backends).to_string();

        assert!(rendered.contains("DeepSeek-Chat"));
        assert!(rendered.contains("https://api.deepseek.com"));
    }

    #[test]
    fn indicator_table_lists_all_ten_indicators() {
        let stats = BackendStatistics {
            backend: "alpha".to_string(),
            backend_info: Default::default(),
            run_count: 1,
            success_count: 1,
            failure_count: 0,
            avg_score: 100.0,
            min_score: 100.0,
            max_score: 100.0,
            std_dev: 0.0,
            avg_latency_ms: 100.0,
            min_latency_ms: 100.0,
            max_latency_ms: 100.0,
            consistency: 100.0,
            indicator_avgs: HashMap::from([("ma20".to_string(), 80.0)]),
        };
        let rendered = indicator_table(&stats).to_string();

        for name in INDICATOR_NAMES {
            assert!(rendered.contains(name), "{name} missing");
        }
        assert!(rendered.contains("80.0"));
        // Indicators with no recorded runs render as zero, not as gaps.
        assert!(rendered.contains("0.0"));
    }
}
