//! CLI argument parsing for framestat

use crate::config::AnalysisConfig;
use crate::frame_log::StateId;
use clap::{Arg, ArgAction, ArgMatches, Args, FromArgMatches, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const DATASET_ARG: &str = "dataset";

/// `-d/--dataset` values, one group per occurrence
fn dataset_occurrences(matches: &ArgMatches) -> Vec<Vec<String>> {
    matches
        .get_occurrences::<String>(DATASET_ARG)
        .map(|occurrences| {
            occurrences
                .map(|values| values.cloned().collect())
                .collect()
        })
        .unwrap_or_default()
}

// Grouped occurrences have no derive support, so these wrappers register
// the argument by hand and rebuild the groups from the matches.
macro_rules! dataset_groups {
    ($name:ident, $value_names:expr, $num_args:expr, $help:expr) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            groups: Vec<Vec<String>>,
        }

        impl $name {
            pub fn groups(&self) -> &[Vec<String>] {
                &self.groups
            }

            pub fn is_empty(&self) -> bool {
                self.groups.is_empty()
            }
        }

        impl FromArgMatches for $name {
            fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
                Ok(Self {
                    groups: dataset_occurrences(matches),
                })
            }

            fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
                if matches.contains_id(DATASET_ARG) {
                    self.groups = dataset_occurrences(matches);
                }
                Ok(())
            }
        }

        impl Args for $name {
            fn augment_args(cmd: clap::Command) -> clap::Command {
                cmd.arg(
                    Arg::new(DATASET_ARG)
                        .short('d')
                        .long("dataset")
                        .value_names($value_names)
                        .num_args($num_args)
                        .value_parser(clap::value_parser!(String))
                        .action(ArgAction::Append)
                        .help($help),
                )
            }

            fn augment_args_for_update(cmd: clap::Command) -> clap::Command {
                Self::augment_args(cmd)
            }
        }
    };
}

dataset_groups!(
    DatasetLogs,
    ["NAME", "LOG"],
    2..,
    "Dataset name followed by its frame-time logs (repeatable)"
);

dataset_groups!(
    DatasetEventLogs,
    ["NAME", "EVENT_LOG"],
    2,
    "Dataset name followed by its event log (repeatable)"
);

/// Output format for dataset reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "framestat")]
#[command(version)]
#[command(about = "Frame-time statistics for graphics benchmark runs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze frame-time logs, grouped into datasets
    Analyze(AnalyzeArgs),
    /// Build FPS and pipeline-creation timelines from event logs
    Timeline(TimelineArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub datasets: DatasetLogs,

    /// Combined plot of every dataset
    #[arg(short, long, default_value = "combined.png")]
    pub output: PathBuf,

    /// TOML analysis configuration; flags override its fields
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logs carry a second `state` column
    #[arg(long = "with-state")]
    pub with_state: bool,

    /// Target frame rate for missed-frame metrics
    #[arg(long = "target-fps", value_name = "FPS")]
    pub target_fps: Option<f64>,

    /// Skip the first SECONDS of every run
    #[arg(long = "drop-front", value_name = "SECONDS")]
    pub drop_front: Option<f64>,

    /// Analyze at most SECONDS of every run
    #[arg(long = "duration-cap", value_name = "SECONDS")]
    pub duration_cap: Option<f64>,

    /// Restrict statistics to frames in this state (requires --with-state)
    #[arg(long = "state-filter", value_name = "STATE", allow_negative_numbers = true)]
    pub state_filter: Option<StateId>,

    /// Aggregate over every run instead of the stable subset
    #[arg(long = "no-outlier-trimming")]
    pub no_outlier_trimming: bool,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Directory for the per-dataset FPS summary CSV files
    #[arg(long = "fps-csv-dir", value_name = "DIR", default_value = ".")]
    pub fps_csv_dir: PathBuf,

    /// Directory for trimmed copies of the logs (defaults to the temp dir)
    #[arg(long = "work-dir", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Plotting program; rendering is skipped without it
    #[arg(long = "plot-script", value_name = "PATH")]
    pub plot_script: Option<PathBuf>,

    /// Print the statistics of every run
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug tracing output to stderr
    #[arg(long)]
    pub debug: bool,
}

impl AnalyzeArgs {
    /// Apply the flags given on the command line on top of `base`
    pub fn apply_to(&self, mut base: AnalysisConfig) -> AnalysisConfig {
        if self.with_state {
            base.with_state = true;
        }
        if let Some(fps) = self.target_fps {
            base.target_fps = fps;
        }
        if self.drop_front.is_some() {
            base.drop_front_seconds = self.drop_front;
        }
        if self.duration_cap.is_some() {
            base.duration_cap_seconds = self.duration_cap;
        }
        if self.state_filter.is_some() {
            base.state_filter = self.state_filter;
        }
        if self.no_outlier_trimming {
            base.outlier_trimming = false;
        }
        base
    }

    /// `(name, logs)` pairs in command-line order
    pub fn dataset_groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.datasets
            .groups()
            .iter()
            .filter_map(|group| group.split_first())
            .map(|(name, logs)| (name.as_str(), logs))
    }
}

#[derive(Args, Debug)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub datasets: DatasetEventLogs,

    /// Timeline plot
    #[arg(short, long, default_value = "timeline.png")]
    pub output: PathBuf,

    /// Directory for the timeline CSV files
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Plotting program; rendering is skipped without it
    #[arg(long = "plot-script", value_name = "PATH")]
    pub plot_script: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long)]
    pub debug: bool,
}

impl TimelineArgs {
    /// `(name, event log)` pairs in command-line order
    pub fn dataset_logs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.datasets.groups().iter().filter_map(|group| match group.as_slice() {
            [name, log] => Some((name.as_str(), log.as_str())),
            _ => None,
        })
    }
}
