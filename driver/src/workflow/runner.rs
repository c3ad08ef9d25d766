use crate::generator::profile::{build_record, GeneratorConfig};
use crate::io::{load_matrix, load_vector, write_spectrum};
use crate::workflow::config::WorkflowConfig;
use crate::workflow::prompt::PromptResolver;
use anyhow::Context;
use ndarray::ArrayView2;
use std::fs;
use std::io;
use std::path::PathBuf;
use sweepcore::{
    LoTrace, ParameterResolver, PipelineOutput, RunReport, SweepLayout, SweepPipeline,
};

const SYNTHETIC_OUTPUT: &str = "SPlot_synthetic.csv";

pub struct WorkflowResult {
    pub output: PathBuf,
    pub output_points: usize,
    pub report: RunReport,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// LO trace first, then an explicit sweep count, then the terminal.
    pub fn resolver(&self) -> anyhow::Result<Box<dyn ParameterResolver>> {
        if let Some(path) = &self.config.lo {
            let samples = load_vector(path)
                .with_context(|| format!("loading LO trace {}", path.display()))?;
            return Ok(Box::new(LoTrace::new(samples)));
        }
        if let Some(sweeps) = self.config.sweeps {
            let layout = SweepLayout::new(sweeps, self.config.sweep_up.unwrap_or(true))?;
            return Ok(Box::new(layout));
        }
        Ok(Box::new(PromptResolver::new(io::stdin().lock(), io::stdout())))
    }

    pub fn execute(
        &self,
        raw: ArrayView2<f64>,
        resolver: &dyn ParameterResolver,
    ) -> anyhow::Result<PipelineOutput> {
        let pipeline = SweepPipeline::new(self.config.to_processing_config())
            .context("validating processing config")?;
        let output = pipeline
            .run(raw, resolver)
            .context("reconstructing spectrum")?;
        log::info!(
            "{} sweeps of {} points -> {} spectrum points",
            output.report.layout.sweep_count,
            output.report.points_per_sweep,
            output.report.output_points
        );
        Ok(output)
    }

    /// Loads the configured input, reconstructs it and saves the spectrum.
    pub fn run_files(&self) -> anyhow::Result<WorkflowResult> {
        let input = self
            .config
            .input
            .as_ref()
            .context("no input intensity file given")?;
        let raw = load_matrix(input)?;
        let resolver = self.resolver()?;
        let output = self.execute(raw.view(), resolver.as_ref())?;
        let path = self
            .config
            .output_path()
            .context("cannot derive an output name from the input path")?;
        self.save(path, output)
    }

    /// Reconstructs a generated record using its own LO trace.
    pub fn run_synthetic(&self, generator: &GeneratorConfig) -> anyhow::Result<WorkflowResult> {
        let record = build_record(generator)?;
        log::debug!(
            "synthetic record {:?} with {} bands",
            record.layout,
            record.center.band_count()
        );
        let mut config = self.config.clone();
        config.processing.center = record.center.clone();
        config.processing.bandwidth.get_or_insert(generator.bandwidth);

        let runner = Runner::new(config);
        let output = runner.execute(record.raw.view(), &LoTrace::new(record.lo))?;
        let path = runner
            .config
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(SYNTHETIC_OUTPUT));
        runner.save(path, output)
    }

    fn save(&self, path: PathBuf, output: PipelineOutput) -> anyhow::Result<WorkflowResult> {
        write_spectrum(&path, &output.spectrum)?;
        if let Some(summary) = &self.config.summary {
            let json = output.report.to_json().context("serializing run summary")?;
            fs::write(summary, json)
                .with_context(|| format!("writing summary {}", summary.display()))?;
        }
        Ok(WorkflowResult {
            output: path,
            output_points: output.spectrum.len(),
            report: output.report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::CliOverrides;
    use sweepcore::Spectrum;
    use tempfile::tempdir;

    fn deepest(spectrum: &Spectrum) -> f64 {
        spectrum
            .iter()
            .fold((f64::NAN, f64::INFINITY), |best, (f, y)| {
                if y < best.1 {
                    (f, y)
                } else {
                    best
                }
            })
            .0
    }

    #[test]
    fn runner_recovers_synthetic_line() {
        let generator = GeneratorConfig {
            background: Some(2),
            seed: 7,
            ..Default::default()
        };
        let record = build_record(&generator).unwrap();
        let runner = Runner::new(WorkflowConfig::from_args(CliOverrides {
            bg: Some(2),
            center: Some(record.center.clone()),
            bandwidth: Some(generator.bandwidth),
            ..Default::default()
        }));
        let output = runner
            .execute(record.raw.view(), &LoTrace::new(record.lo.clone()))
            .unwrap();

        assert_eq!(output.spectrum.len(), generator.points_per_sweep);
        assert!((deepest(&output.spectrum) - generator.line_frequency).abs() < 0.2);
    }

    #[test]
    fn runner_round_trips_files() {
        let dir = tempdir().unwrap();
        let generator = GeneratorConfig {
            points_per_sweep: 50,
            centers: vec![10.0, 20.0],
            line_frequency: 11.0,
            ..Default::default()
        };
        let record = build_record(&generator).unwrap();

        let input = dir.path().join("scan.csv");
        let mut text = String::from("band1,band2\n");
        for row in record.raw.rows() {
            text.push_str(&format!("{},{}\n", row[0], row[1]));
        }
        fs::write(&input, text).unwrap();
        let lo = dir.path().join("lo.txt");
        let lo_text: Vec<String> = record.lo.iter().map(|v| v.to_string()).collect();
        fs::write(&lo, lo_text.join("\n")).unwrap();
        let summary = dir.path().join("summary.json");

        let runner = Runner::new(WorkflowConfig::from_args(CliOverrides {
            input: Some(input),
            lo: Some(lo),
            center: Some(record.center.clone()),
            boxcar: Some(3),
            summary: Some(summary.clone()),
            ..Default::default()
        }));
        let result = runner.run_files().unwrap();

        assert_eq!(result.output, dir.path().join("SPlot_scan.csv"));
        assert_eq!(result.output_points, 2 * 50 - 2);
        assert_eq!(result.report.layout, record.layout);
        let saved = fs::read_to_string(&result.output).unwrap();
        assert!(saved.starts_with("freq,inten"));
        assert_eq!(saved.lines().count(), result.output_points + 1);
        assert!(fs::read_to_string(summary).unwrap().contains("\"bands\": 2"));
    }

    #[test]
    fn missing_input_is_reported() {
        let runner = Runner::new(WorkflowConfig::default());
        let err = runner.run_files().err().unwrap();
        assert!(err.to_string().contains("no input"));
    }
}
