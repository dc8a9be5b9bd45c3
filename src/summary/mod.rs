// Cross-run summaries for repeated benchmark measurements
//
// Runs of the same configuration are noisy. This module ranks a dataset's
// runs by median frame time, flags runs outside the 5th-95th percentile band
// of those medians, reduces every per-run series with a list of named
// metrics and picks the low/median/high representative runs for reporting.
//
// Implementation:
// - Uses trueno (crates.io) for SIMD vector reductions (min, max, std dev)
// - Percentile bounds reuse the frame-time percentile interpolation

mod metric;
mod representatives;
mod summarizer;

pub use metric::{default_metrics, relative_noise, Aggregator, MetricKind, SummaryMetric};
pub use representatives::{rank_index, RepresentativeRuns, RunRef};
pub use summarizer::{summarize, DatasetSummary, MetricSummary, SeriesKind, SeriesValues};

#[cfg(test)]
mod tests;
