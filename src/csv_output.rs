//! CSV output for FPS and timeline series
//!
//! These files are the hand-off format for the external renderer and for
//! spreadsheet analysis.

use crate::error::{AnalysisError, Result};
use crate::fps::FpsBucket;
use crate::frame_log::StateId;
use crate::timeline::Timeline;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One second of the low/median/high FPS comparison
///
/// Cells are empty once the corresponding run has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FpsSummaryRow {
    pub second: i64,
    pub low_fps: Option<u64>,
    pub low_state: Option<StateId>,
    pub median_fps: Option<u64>,
    pub median_state: Option<StateId>,
    pub high_fps: Option<u64>,
    pub high_state: Option<StateId>,
}

/// Align three FPS series by second
pub fn fps_summary_rows(low: &[FpsBucket], median: &[FpsBucket], high: &[FpsBucket]) -> Vec<FpsSummaryRow> {
    let len = low.len().max(median.len()).max(high.len());
    let cell = |series: &[FpsBucket], i: usize| series.get(i).map(|b| (b.frame_count, b.representative_state));

    (0..len)
        .map(|i| {
            let low = cell(low, i);
            let median = cell(median, i);
            let high = cell(high, i);
            FpsSummaryRow {
                second: i as i64,
                low_fps: low.map(|c| c.0),
                low_state: low.map(|c| c.1),
                median_fps: median.map(|c| c.0),
                median_state: median.map(|c| c.1),
                high_fps: high.map(|c| c.0),
                high_state: high.map(|c| c.1),
            }
        })
        .collect()
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| AnalysisError::csv(path, e))?;

    writer
        .write_record(header)
        .map_err(|e| AnalysisError::csv(path, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AnalysisError::csv(path, e))?;
    }
    writer.flush().map_err(|e| AnalysisError::io(path, e))?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

/// Write the FPS summary of a dataset
pub fn write_fps_summary(path: &Path, rows: &[FpsSummaryRow]) -> Result<()> {
    write_rows(
        path,
        rows,
        &[
            "second",
            "low_fps",
            "low_state",
            "median_fps",
            "median_state",
            "high_fps",
            "high_state",
        ],
    )
}

#[derive(Serialize)]
struct FpsRow {
    second: i64,
    fps: u64,
    state: StateId,
}

#[derive(Serialize)]
struct PipelineRow {
    seconds: f64,
    creation_ms: f64,
    kind: &'static str,
}

/// Write `<dataset>_timeline.csv` and `<dataset>_pipelines.csv` into `dir`
pub fn write_timeline(timeline: &Timeline, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))?;

    let fps_path = dir.join(format!("{}_timeline.csv", timeline.dataset));
    let fps_rows: Vec<FpsRow> = timeline
        .fps
        .iter()
        .map(|b| FpsRow {
            second: b.second_index,
            fps: b.frame_count,
            state: b.representative_state,
        })
        .collect();
    write_rows(&fps_path, &fps_rows, &["second", "fps", "state"])?;

    let pipelines_path = dir.join(format!("{}_pipelines.csv", timeline.dataset));
    let pipeline_rows: Vec<PipelineRow> = timeline
        .pipelines
        .iter()
        .map(|p| PipelineRow {
            seconds: p.seconds,
            creation_ms: p.creation_ms,
            kind: p.kind.as_str(),
        })
        .collect();
    write_rows(&pipelines_path, &pipeline_rows, &["seconds", "creation_ms", "kind"])?;

    Ok(vec![fps_path, pipelines_path])
}
