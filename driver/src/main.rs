use anyhow::Context;
use clap::Parser;
use generator::profile::GeneratorConfig;
use std::path::PathBuf;
use workflow::config::{CliOverrides, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod io;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconstruct a stitched spectrum from pulsed linear-sweep data"
)]
struct Args {
    /// Intensity file: rows are time samples, columns are bands
    inten: Option<PathBuf>,
    /// Sweep carrying the signal (1-based)
    #[arg(long)]
    fg: Option<usize>,
    /// Reference sweep subtracted from the foreground
    #[arg(long)]
    bg: Option<usize>,
    /// Center frequency, or a file listing one center per band
    #[arg(long)]
    cf: Option<String>,
    /// Sweep bandwidth; defaults to the center spacing
    #[arg(long)]
    bandwidth: Option<f64>,
    /// Boxcar window; the sign is ignored and even widths grow to the next odd
    #[arg(long = "box", allow_negative_numbers = true)]
    boxcar: Option<i64>,
    /// Detector delay in samples
    #[arg(long)]
    delay: Option<usize>,
    /// LO trace used to find sweep count and direction
    #[arg(long)]
    lo: Option<PathBuf>,
    /// Number of full sweeps when no LO trace is given
    #[arg(long)]
    sweeps: Option<usize>,
    #[arg(long, conflicts_with = "sweep_down")]
    sweep_up: bool,
    #[arg(long)]
    sweep_down: bool,
    /// Add the spline stage to baseline removal
    #[arg(long)]
    spline: bool,
    /// Skip baseline removal
    #[arg(long)]
    nobase: bool,
    /// Output the first derivative of the spectrum
    #[arg(long)]
    diff: bool,
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Write a JSON run summary
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Process a generated record instead of an input file
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl Args {
    fn overrides(&self) -> anyhow::Result<CliOverrides> {
        let center = self
            .cf
            .as_deref()
            .map(io::parse_center)
            .transpose()
            .context("reading --cf")?;
        let sweep_up = match (self.sweep_up, self.sweep_down) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Ok(CliOverrides {
            input: self.inten.clone(),
            fg: self.fg,
            bg: self.bg,
            center,
            bandwidth: self.bandwidth,
            boxcar: self.boxcar,
            delay: self.delay,
            lo: self.lo.clone(),
            sweeps: self.sweeps,
            sweep_up,
            spline: self.spline,
            nobase: self.nobase,
            diff: self.diff,
            output: self.output.clone(),
            summary: self.summary.clone(),
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let overrides = args.overrides()?;
    let workflow_config = match &args.workflow {
        Some(path) => {
            let mut config = WorkflowConfig::load(path)?;
            config.apply(overrides);
            config
        }
        None => WorkflowConfig::from_args(overrides),
    };
    let runner = Runner::new(workflow_config);

    let result = if args.synthetic {
        let generator = GeneratorConfig {
            seed: args.seed,
            delay: runner.config().processing.delay,
            background: runner.config().processing.background,
            ..Default::default()
        };
        runner.run_synthetic(&generator)?
    } else {
        runner.run_files()?
    };

    log::info!(
        "{} points through stages {:?}",
        result.output_points,
        result.report.stages
    );
    println!("-- {} Saved --", result.output.display());
    Ok(())
}
