use anyhow::{bail, Context, Result};
use clap::Parser;
use framestat::{
    cli::{AnalyzeArgs, Cli, Command, OutputFormat, TimelineArgs},
    config::AnalysisConfig,
    csv_output, event_log,
    json_output::JsonAnalysisOutput,
    render::ExternalRenderer,
    report,
    run::Dataset,
    summary::{default_metrics, summarize},
    timeline::Timeline,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` turns on every level
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Plot files land next to the combined output
fn plot_dir(output: &Path) -> PathBuf {
    output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    if args.datasets.is_empty() {
        bail!("No datasets given; use --dataset NAME LOG...");
    }

    let base = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let config = args.apply_to(base);
    config.validate().context("Invalid analysis options")?;

    let metrics = default_metrics();
    let renderer = args.plot_script.as_ref().map(ExternalRenderer::new);
    // Concurrent invocations must not share exports
    let work_dir = args.work_dir.clone().unwrap_or_else(|| {
        std::env::temp_dir().join(format!("framestat-{}", std::process::id()))
    });
    std::fs::create_dir_all(&work_dir)
        .with_context(|| format!("Failed to create work dir {}", work_dir.display()))?;
    std::fs::create_dir_all(&args.fps_csv_dir)
        .with_context(|| format!("Failed to create {}", args.fps_csv_dir.display()))?;

    let mut json = JsonAnalysisOutput::new();
    let mut combined_inputs = Vec::new();

    for (name, logs) in args.dataset_groups() {
        let dataset = Dataset::load(name, logs, &config);

        if args.verbose && args.format == OutputFormat::Text {
            for run in &dataset.runs {
                print!("{}", report::format_run(run));
            }
        }

        let summary = summarize(&dataset, &metrics, &config)
            .with_context(|| format!("Failed to summarize dataset '{}'", name))?;

        let reps = &summary.representatives;
        let low = &dataset.runs[reps.low.index];
        let median = &dataset.runs[reps.median.index];
        let high = &dataset.runs[reps.high.index];

        let rows = csv_output::fps_summary_rows(
            &low.fps_buckets(),
            &median.fps_buckets(),
            &high.fps_buckets(),
        );
        let fps_path = args.fps_csv_dir.join(format!("{}_fps.csv", name));
        csv_output::write_fps_summary(&fps_path, &rows)?;

        let low_path = low.result_path(&work_dir, name, reps.low.index)?;
        let median_path = median.result_path(&work_dir, name, reps.median.index)?;

        if let Some(renderer) = &renderer {
            let output = plot_dir(&args.output).join(format!("{}_frametimes.png", name));
            renderer.render(&[low_path.clone(), median_path.clone()], &output)?;
        }

        combined_inputs.push(low_path);
        if reps.median.index != reps.low.index {
            combined_inputs.push(median_path);
        }

        match args.format {
            OutputFormat::Text => print!("{}", report::format_dataset_report(&dataset, &summary)),
            OutputFormat::Json => json.add_dataset(&dataset, summary, config.with_state),
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", json.to_json()?);
    }

    if let Some(renderer) = &renderer {
        renderer.render(&combined_inputs, &args.output.with_extension("png"))?;
    }

    Ok(())
}

fn run_timeline(args: TimelineArgs) -> Result<()> {
    if args.datasets.is_empty() {
        bail!("No datasets given; use --dataset NAME EVENT_LOG");
    }

    let mut inputs = Vec::new();
    for (name, log_path) in args.dataset_logs() {
        let log = event_log::read_event_log(log_path)
            .with_context(|| format!("Failed to read event log for dataset '{}'", name))?;
        let timeline = Timeline::from_event_log(name, &log);

        println!(
            "{}: {:.3} s, {} FPS samples in {} state segments, {} pipelines (slowest {:.3} ms)",
            name,
            timeline.duration_seconds,
            timeline.fps.len(),
            timeline.fps_segments().len(),
            timeline.pipelines.len(),
            timeline.max_creation_ms()
        );

        inputs.extend(csv_output::write_timeline(&timeline, &args.out_dir)?);
    }

    if let Some(script) = &args.plot_script {
        ExternalRenderer::new(script).render(&inputs, &args.output)?;
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => {
            init_tracing(args.debug);
            run_analyze(args)
        }
        Command::Timeline(args) => {
            init_tracing(args.debug);
            run_timeline(args)
        }
    }
}
