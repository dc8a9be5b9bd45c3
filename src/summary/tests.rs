// Scenario tests for cross-run summaries
//
// Datasets are built from synthetic runs whose medians are known exactly.

use super::*;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::frame_log::FrameRecord;
use crate::run::{Dataset, Run};

const MS: u64 = 1_000_000;

/// A run whose every frame takes `frame_ms`
fn flat_run(name: &str, frame_ms: u64, config: &AnalysisConfig) -> Run {
    let frames = vec![FrameRecord::with_state(frame_ms * MS, 0); 5];
    Run::from_frames(name, format!("/logs/{}", name), frames, config).unwrap()
}

fn dataset(medians_ms: &[u64], config: &AnalysisConfig) -> Dataset {
    let runs = medians_ms
        .iter()
        .enumerate()
        .map(|(i, &ms)| flat_run(&format!("run{}", i), ms, config))
        .collect();
    Dataset::new("test", runs)
}

fn metric<'a>(summary: &'a DatasetSummary, name: &str) -> &'a MetricSummary {
    summary
        .metrics
        .iter()
        .find(|m| m.metric == name)
        .unwrap_or_else(|| panic!("missing metric {}", name))
}

/// Three runs with medians 10/20/30 ms, inserted out of order
#[test]
fn test_three_run_representatives() {
    let config = AnalysisConfig::default();
    let data = dataset(&[30, 10, 20], &config);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();

    assert_eq!(summary.representatives.median.median_ms, 20.0);
    assert_eq!(summary.representatives.median.name, "run2");
    assert_eq!(summary.representatives.low.median_ms, 10.0);
    assert_eq!(summary.representatives.high.median_ms, 30.0);

    // Bounds are the 5th/95th percentile of [10, 20, 30]
    assert!((summary.low_bound_ms - 11.0).abs() < 1e-9);
    assert!((summary.high_bound_ms - 29.0).abs() < 1e-9);
}

/// Ranking is by median, ascending
#[test]
fn test_runs_sorted_by_median() {
    let config = AnalysisConfig::default();
    let data = dataset(&[25, 15, 35, 5], &config);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();
    let medians: Vec<f64> = summary.sorted_runs.iter().map(|r| r.median_ms).collect();

    assert_eq!(medians, vec![5.0, 15.0, 25.0, 35.0]);
    // Indices still point into the dataset's insertion order
    assert_eq!(summary.sorted_runs[0].index, 3);
}

/// Outlier trimming restricts aggregation to the stable subset
#[test]
fn test_outlier_trimming_gates_aggregation() {
    let config = AnalysisConfig::default();
    let data = dataset(&[10, 20, 30], &config);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();

    assert!(summary.outlier_trimming_applied);
    assert_eq!(summary.stable_runs.len(), 1);
    assert_eq!(summary.stable_runs[0].median_ms, 20.0);

    // Only the 20ms run feeds the aggregators
    let min = metric(&summary, "Min");
    let max = metric(&summary, "Max");
    assert_eq!(min.values.median, 20.0);
    assert_eq!(max.values.median, 20.0);

    let outliers: Vec<f64> = summary.outliers().map(|r| r.median_ms).collect();
    assert_eq!(outliers, vec![10.0, 30.0]);
}

/// With trimming off, the stable subset is reported but not applied
#[test]
fn test_outlier_trimming_disabled() {
    let config = AnalysisConfig {
        outlier_trimming: false,
        ..AnalysisConfig::default()
    };
    let data = dataset(&[10, 20, 30], &config);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();

    assert!(!summary.outlier_trimming_applied);
    assert_eq!(summary.stable_runs.len(), 1);
    assert_eq!(metric(&summary, "Min").values.median, 10.0);
    assert_eq!(metric(&summary, "Max").values.median, 30.0);
}

/// Identical runs leave the stable subset empty; all runs are used
#[test]
fn test_empty_stable_subset_falls_back_to_all_runs() {
    let config = AnalysisConfig::default();
    let data = dataset(&[16, 16, 16], &config);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();

    assert!(summary.stable_runs.is_empty());
    assert!(!summary.outlier_trimming_applied);
    assert_eq!(metric(&summary, "Standard deviation").values.median, 0.0);
    assert_eq!(metric(&summary, "Relative noise").values.median, 0.0);
}

/// Runs a few microseconds apart keep a measurable spread
#[test]
fn test_std_dev_of_close_medians() {
    let config = AnalysisConfig {
        outlier_trimming: false,
        ..AnalysisConfig::default()
    };
    let runs = (0..5u64)
        .map(|i| {
            let frames = vec![FrameRecord::with_state(16_610_000 + i * 1_000, 0); 5];
            Run::from_frames(format!("run{}", i), "/logs", frames, &config).unwrap()
        })
        .collect();
    let data = Dataset::new("close", runs);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();
    let std_dev = metric(&summary, "Standard deviation").values.median;

    // Population spread of 16.610..=16.614 ms
    assert!((std_dev - 0.0014142136).abs() < 1e-6, "{}", std_dev);
    assert_eq!(metric(&summary, "Min").values.median, 16.61);
    assert_eq!(metric(&summary, "Max").values.median, 16.614);
}

/// A single run is its own low, median and high representative
#[test]
fn test_single_run_dataset() {
    let config = AnalysisConfig::default();
    let data = dataset(&[12], &config);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();

    assert_eq!(summary.run_count, 1);
    assert_eq!(summary.representatives.low, summary.representatives.high);
    assert_eq!(metric(&summary, "Min").values.average, 12.0);
}

#[test]
fn test_empty_dataset_fails() {
    let data = Dataset::new("nothing", Vec::new());
    let result = summarize(&data, &default_metrics(), &AnalysisConfig::default());

    match result {
        Err(AnalysisError::EmptyDataset { name }) => assert_eq!(name, "nothing"),
        other => panic!("Expected EmptyDataset, got {:?}", other),
    }
}

/// Every metric yields one value per series
#[test]
fn test_one_value_per_metric_and_series() {
    let config = AnalysisConfig::state_aware();
    let data = dataset(&[10, 20, 30, 40, 50], &config);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();

    assert_eq!(summary.metrics.len(), 4);
    for m in &summary.metrics {
        assert!(m.values.missed_score.is_some());
        assert!(m.values.time_in_state.is_some());
    }
}

/// The state series is only produced for state-aware logs
#[test]
fn test_state_series_requires_state_config() {
    let config = AnalysisConfig {
        missed_score: false,
        ..AnalysisConfig::default()
    };
    let data = dataset(&[10, 20], &config);

    let summary = summarize(&data, &[SummaryMetric::max()], &config).unwrap();

    assert!(summary.metrics[0].values.time_in_state.is_none());
    assert!(summary.metrics[0].values.missed_score.is_none());
}

/// Missed-frame series uses each run's configured target
#[test]
fn test_missed_frames_series() {
    let config = AnalysisConfig {
        outlier_trimming: false,
        ..AnalysisConfig::default()
    };
    // 10ms frames never miss 60 FPS, 20ms frames always do
    let data = dataset(&[10, 20], &config);

    let summary = summarize(&data, &default_metrics(), &config).unwrap();

    assert_eq!(metric(&summary, "Min").values.missed_frames, 0.0);
    assert_eq!(metric(&summary, "Max").values.missed_frames, 100.0);
}

/// Failed runs are counted but never summarized
#[test]
fn test_failed_runs_are_reported() {
    let config = AnalysisConfig::default();
    let mut data = dataset(&[10], &config);
    data.failures.push(crate::run::RunFailure {
        path: "/logs/broken.log".into(),
        error: AnalysisError::EmptyRun {
            name: "broken".to_string(),
        },
    });

    let summary = summarize(&data, &default_metrics(), &config).unwrap();
    assert_eq!(summary.failed_runs, 1);
    assert_eq!(summary.run_count, 1);
}
