//! Hand-off to an external plotting program
//!
//! The renderer receives its input files as arguments and the image to
//! produce in the `OUTFILE` environment variable.

use crate::error::{AnalysisError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// External program that turns CSV/log files into an image
#[derive(Debug, Clone)]
pub struct ExternalRenderer {
    program: PathBuf,
}

impl ExternalRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the renderer and wait for it
    pub fn render(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        tracing::debug!(
            program = %self.program.display(),
            inputs = inputs.len(),
            output = %output.display(),
            "invoking renderer"
        );

        let status = Command::new(&self.program)
            .args(inputs)
            .env("OUTFILE", output)
            .status()
            .map_err(|e| {
                AnalysisError::Render(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !status.success() {
            return Err(AnalysisError::Render(format!(
                "{} exited with {} while rendering {}",
                self.program.display(),
                status,
                output.display()
            )));
        }
        Ok(())
    }
}
