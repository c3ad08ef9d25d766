use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use sweepcore::{BaselineMode, CenterFrequency, ProcessingConfig};

/// Everything a run needs: inputs, processing parameters and outputs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub input: Option<PathBuf>,
    pub lo: Option<PathBuf>,
    pub sweeps: Option<usize>,
    pub sweep_up: Option<bool>,
    pub output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub processing: ProcessingConfig,
}

/// Command-line values that feed a workflow, already parsed by clap.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub fg: Option<usize>,
    pub bg: Option<usize>,
    pub center: Option<CenterFrequency>,
    pub bandwidth: Option<f64>,
    pub boxcar: Option<i64>,
    pub delay: Option<usize>,
    pub lo: Option<PathBuf>,
    pub sweeps: Option<usize>,
    pub sweep_up: Option<bool>,
    pub spline: bool,
    pub nobase: bool,
    pub diff: bool,
    pub output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(cli: CliOverrides) -> Self {
        let mut config = Self::default();
        config.apply(cli);
        config
    }

    /// Explicit command-line values win over the loaded file.
    pub fn apply(&mut self, cli: CliOverrides) {
        let processing = &mut self.processing;
        if let Some(fg) = cli.fg {
            processing.foreground = fg;
        }
        if cli.bg.is_some() {
            processing.background = cli.bg;
        }
        if let Some(center) = cli.center {
            processing.center = center;
        }
        if cli.bandwidth.is_some() {
            processing.bandwidth = cli.bandwidth;
        }
        if cli.boxcar.is_some() {
            processing.boxcar = cli.boxcar;
        }
        if let Some(delay) = cli.delay {
            processing.delay = delay;
        }
        if cli.nobase {
            processing.baseline = BaselineMode::None;
        } else if cli.spline {
            processing.baseline = BaselineMode::PolynomialSpline;
        }
        if cli.diff {
            processing.derivative = true;
        }

        self.input = cli.input.or(self.input.take());
        self.lo = cli.lo.or(self.lo.take());
        self.sweeps = cli.sweeps.or(self.sweeps);
        self.sweep_up = cli.sweep_up.or(self.sweep_up);
        self.output = cli.output.or(self.output.take());
        self.summary = cli.summary.or(self.summary.take());
    }

    /// Output path, defaulting to `SPlot_<input name>` next to the input.
    pub fn output_path(&self) -> Option<PathBuf> {
        if let Some(output) = &self.output {
            return Some(output.clone());
        }
        let input = self.input.as_ref()?;
        let name = input.file_name()?.to_string_lossy();
        Some(input.with_file_name(format!("SPlot_{}", name)))
    }

    pub fn to_processing_config(&self) -> ProcessingConfig {
        self.processing.clone()
    }
}
