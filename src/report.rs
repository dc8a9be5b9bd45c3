//! Plain-text reports
//!
//! `--format text` output: an optional dump of every run, then one report per
//! dataset with the summary metrics and its median run.

use crate::run::{Dataset, Run};
use crate::summary::{DatasetSummary, MetricKind, MetricSummary};

/// Statistics of one run
pub fn format_run(run: &Run) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}:\tduration: {:.3} ms,\taverage: {:.3} ms\n",
        run.name(),
        run.total_duration_ms(),
        run.average_duration_ms()
    ));
    out.push_str(&format!(
        "\tmedian: {:.3} ms,\tp90: {:.3} ms,\tp95: {:.3} ms\n",
        run.median(),
        run.p90(),
        run.p95()
    ));
    out.push_str(&format!(
        "\tmissed frames: {:.3}%,\tmissed score: {:.2e}\n",
        run.missed_frames_percent(),
        run.missed_score()
    ));

    if run.state_durations().states().count() > 1 {
        for (state, ms) in run.state_durations().iter() {
            out.push_str(&format!("\tstate {}: {:.3} ms\n", state, ms));
        }
    }
    out
}

fn format_metric(metric: &MetricSummary) -> String {
    let unit = match metric.kind {
        MetricKind::Absolute => "ms",
        MetricKind::Relative => "%",
    };
    let values = &metric.values;

    let mut out = String::new();
    out.push_str(&format!("{}:\n", metric.metric));
    out.push_str(&format!("  Average:       {:.3} {}\n", values.average, unit));
    out.push_str(&format!("  Median:        {:.3} {}\n", values.median, unit));
    out.push_str(&format!("  P90:           {:.3} {}\n", values.p90, unit));
    out.push_str(&format!("  P95:           {:.3} {}\n", values.p95, unit));
    // Missed frames are already a percentage
    out.push_str(&format!("  Missed frames: {:.3} %\n", values.missed_frames));
    if let Some(score) = values.missed_score {
        out.push_str(&format!("  Missed score:  {:.2e}\n", score));
    }
    if let Some(time) = values.time_in_state {
        out.push_str(&format!("  Time in state: {:.3} {}\n", time, unit));
    }
    out
}

/// Summary of one dataset
pub fn format_dataset_report(dataset: &Dataset, summary: &DatasetSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", summary.dataset));
    out.push_str(&format!("Dataset size: {}\n", summary.run_count));
    if summary.failed_runs > 0 {
        out.push_str(&format!("Skipped runs: {}\n", summary.failed_runs));
    }
    out.push_str(&format!(
        "Stable band: {:.3} .. {:.3} ms ({} of {} runs{})\n",
        summary.low_bound_ms,
        summary.high_bound_ms,
        summary.stable_runs.len(),
        summary.run_count,
        if summary.outlier_trimming_applied {
            ", outliers trimmed"
        } else {
            ""
        }
    ));
    out.push('\n');

    for metric in &summary.metrics {
        out.push_str(&format_metric(metric));
    }

    out.push('\n');
    out.push_str("Median result:\n");
    if let Some(run) = dataset.runs.get(summary.representatives.median.index) {
        out.push_str(&format_run(run));
    }
    out
}
