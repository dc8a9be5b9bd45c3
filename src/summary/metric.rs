// Named reducers applied across a dataset's runs
//
// Each metric folds one per-run series (e.g. every run's p95) into a single
// number. Absolute metrics keep the unit of the series; relative metrics are
// percentages.

use crate::percentiles::percentile;
use serde::{Deserialize, Serialize};
use trueno::Vector;

/// Reduces a per-run series to one value
pub type Aggregator = fn(&[f64]) -> f64;

/// Unit of a metric's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Same unit as the summarized series
    Absolute,
    /// Percentage
    Relative,
}

/// A named reducer applied across a dataset's runs
#[derive(Debug, Clone)]
pub struct SummaryMetric {
    pub name: String,
    pub aggregator: Aggregator,
    pub kind: MetricKind,
}

impl SummaryMetric {
    pub fn new(name: impl Into<String>, aggregator: Aggregator, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            aggregator,
            kind,
        }
    }

    pub fn min() -> Self {
        Self::new("Min", min, MetricKind::Absolute)
    }

    pub fn max() -> Self {
        Self::new("Max", max, MetricKind::Absolute)
    }

    pub fn std_dev() -> Self {
        Self::new("Standard deviation", std_dev, MetricKind::Absolute)
    }

    pub fn relative_noise() -> Self {
        Self::new("Relative noise", relative_noise, MetricKind::Relative)
    }

    /// Apply the aggregator to one series
    pub fn apply(&self, values: &[f64]) -> f64 {
        (self.aggregator)(values)
    }
}

/// Min, Max, Standard deviation and Relative noise
pub fn default_metrics() -> Vec<SummaryMetric> {
    vec![
        SummaryMetric::min(),
        SummaryMetric::max(),
        SummaryMetric::std_dev(),
        SummaryMetric::relative_noise(),
    ]
}

/// Deviations from the f64 mean, narrowed to f32
///
/// Run medians sit close together far from zero. Centering first keeps the
/// f32 reductions from cancelling away the spread.
fn centered(values: &[f64]) -> Option<Vector<f32>> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let deviations: Vec<f32> = values.iter().map(|&v| (v - mean) as f32).collect();
    Some(Vector::from_slice(&deviations))
}

// Index-based so the result is a member of the series, not an f32 round trip
fn min(values: &[f64]) -> f64 {
    centered(values)
        .and_then(|v| v.argmin().ok())
        .map_or(f64::NAN, |i| values[i])
}

fn max(values: &[f64]) -> f64 {
    centered(values)
        .and_then(|v| v.argmax().ok())
        .map_or(f64::NAN, |i| values[i])
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    centered(values)
        .and_then(|v| v.variance().ok())
        .map_or(f64::NAN, |variance| f64::from(variance.max(0.0)).sqrt())
}

/// Spread between the 5th and 95th percentile, as a percentage of the 5th
///
/// `|low - high| / low * 100`. A zero low bound yields 0.
pub fn relative_noise(values: &[f64]) -> f64 {
    let (Some(low), Some(high)) = (percentile(values, 5.0), percentile(values, 95.0)) else {
        return f64::NAN;
    };

    if low.abs() < f64::EPSILON {
        return 0.0;
    }

    (low - high).abs() / low * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max() {
        let values = [12.0, 10.0, 30.0, 20.0];
        assert_eq!(SummaryMetric::min().apply(&values), 10.0);
        assert_eq!(SummaryMetric::max().apply(&values), 30.0);
    }

    #[test]
    fn test_std_dev_grows_with_spread() {
        let narrow = SummaryMetric::std_dev().apply(&[15.0, 16.0, 17.0]);
        let wide = SummaryMetric::std_dev().apply(&[10.0, 16.0, 22.0]);
        assert!(narrow > 0.0);
        assert!(wide > narrow, "{} <= {}", wide, narrow);
    }

    #[test]
    fn test_min_max_return_series_members() {
        let values = [16.612345678, 20.0, 33.300000001];
        assert_eq!(SummaryMetric::min().apply(&values), 16.612345678);
        assert_eq!(SummaryMetric::max().apply(&values), 33.300000001);
    }

    #[test]
    fn test_min_max_empty_series() {
        assert!(SummaryMetric::min().apply(&[]).is_nan());
        assert!(SummaryMetric::max().apply(&[]).is_nan());
        assert!(SummaryMetric::std_dev().apply(&[]).is_nan());
    }

    #[test]
    fn test_std_dev_is_population() {
        let std_dev = SummaryMetric::std_dev().apply(&[10.0, 20.0, 30.0]);
        assert!((std_dev - 8.1649658).abs() < 1e-6, "{}", std_dev);
    }

    #[test]
    fn test_std_dev_close_medians() {
        let std_dev = SummaryMetric::std_dev().apply(&[33.30, 33.31, 33.32]);
        assert!((std_dev - 0.0081650).abs() < 1e-6, "{}", std_dev);

        let std_dev = SummaryMetric::std_dev().apply(&[16.612, 16.615, 16.613, 16.614, 16.611]);
        assert!((std_dev - 0.0014142).abs() < 1e-6, "{}", std_dev);

        let std_dev = SummaryMetric::std_dev().apply(&[16.600, 16.601, 16.602]);
        assert!(std_dev.is_finite());
        assert!((std_dev - 0.00081650).abs() < 1e-6, "{}", std_dev);
    }

    #[test]
    fn test_std_dev_large_offset() {
        let std_dev = SummaryMetric::std_dev().apply(&[1e13, 1e13 + 1e6, 1e13 + 2e6]);
        assert!((std_dev / 816_496.58 - 1.0).abs() < 1e-5, "{}", std_dev);
    }

    #[test]
    fn test_std_dev_constant() {
        assert_eq!(SummaryMetric::std_dev().apply(&[7.0, 7.0, 7.0]), 0.0);
    }

    #[test]
    fn test_relative_noise() {
        // 5th percentile: 10 + 0.1 * 10 = 11, 95th: 20 + 0.9 * 10 = 29
        let noise = relative_noise(&[10.0, 20.0, 30.0]);
        assert!((noise - (18.0 / 11.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_relative_noise_identical_runs() {
        assert_eq!(relative_noise(&[16.6, 16.6, 16.6]), 0.0);
    }

    #[test]
    fn test_relative_noise_zero_low_bound() {
        assert_eq!(relative_noise(&[0.0, 0.0, 5.0]), 0.0);
    }

    #[test]
    fn test_default_metrics() {
        let metrics = default_metrics();
        let names: Vec<_> = metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Min", "Max", "Standard deviation", "Relative noise"]);
        assert_eq!(metrics[3].kind, MetricKind::Relative);
        assert_eq!(metrics[0].kind, MetricKind::Absolute);
    }

    #[test]
    fn test_custom_metric() {
        fn count(values: &[f64]) -> f64 {
            values.len() as f64
        }
        let metric = SummaryMetric::new("Count", count, MetricKind::Absolute);
        assert_eq!(metric.apply(&[1.0, 2.0]), 2.0);
    }
}
