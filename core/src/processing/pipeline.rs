use crate::acquisition::{ParameterResolver, SweepLayout};
use crate::config::ProcessingConfig;
use crate::prelude::{ProcessingStage, Spectrum, SweepError, SweepFrame, SweepResult};
use crate::processing::baseline::{PerSweepBaselineStage, WidebandBaselineStage};
use crate::processing::delay::{roll_delay, truncate_delay};
use crate::processing::derivative::DerivativeStage;
use crate::processing::extract::extract_or_average;
use crate::processing::frequency::reconstruct_frequency;
use crate::processing::smooth::BoxcarStage;
use crate::processing::stitch::StitchStage;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Summary of one reconstruction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub layout: SweepLayout,
    pub points_per_sweep: usize,
    pub bands: usize,
    pub bandwidth: f64,
    pub stages: Vec<String>,
    pub output_points: usize,
    pub metrics: MetricsSnapshot,
}

impl RunReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub spectrum: Spectrum,
    pub report: RunReport,
}

/// Runs the configured chain from raw time samples to a stitched spectrum.
pub struct SweepPipeline {
    config: ProcessingConfig,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl SweepPipeline {
    pub fn new(config: ProcessingConfig) -> SweepResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            metrics: MetricsRecorder::new(),
            logger: LogManager::with_target("sweepcore::pipeline"),
        })
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Stages after extraction, in execution order.
    pub fn stages(&self) -> Vec<Box<dyn ProcessingStage>> {
        let baseline = self.config.baseline;
        let spline = baseline.uses_spline().then_some(self.config.spline);
        let mut stages: Vec<Box<dyn ProcessingStage>> = Vec::new();

        if baseline.enabled() {
            stages.push(Box::new(PerSweepBaselineStage::new(
                self.config.poly_degree,
                spline,
            )));
        }
        stages.push(Box::new(StitchStage::new(baseline.enabled())));
        if baseline.enabled() {
            stages.push(Box::new(WidebandBaselineStage::new(spline)));
        }
        if let Some(window) = self.config.boxcar {
            stages.push(Box::new(BoxcarStage::new(window)));
        }
        if self.config.derivative {
            stages.push(Box::new(DerivativeStage::new()));
        }
        stages
    }

    /// Frequency axis and signal intensity of the foreground sweep.
    ///
    /// `raw` holds every sweep back to back along rows, one column per band.
    pub fn prepare(&self, raw: ArrayView2<f64>, layout: SweepLayout) -> SweepResult<SweepFrame> {
        let config = &self.config;
        let points = layout.points_per_sweep(raw.nrows())?;
        config.validate_layout(layout.sweep_count, points)?;

        let bands = config.center.band_count();
        if raw.ncols() != bands {
            return Err(SweepError::ShapeMismatch {
                context: "center frequencies per band",
                expected: vec![bands],
                found: vec![raw.ncols()],
            });
        }

        let freq = reconstruct_frequency(
            &config.center,
            points,
            layout.runs_up(config.foreground),
            config.resolved_bandwidth(),
        )?;
        let rolled = roll_delay(raw, config.delay)?;
        let signal = extract_or_average(rolled.view(), points, config.foreground, config.background)?;
        let (freq, signal) = truncate_delay(freq.view(), signal.view(), config.delay)?;

        self.logger.stage(
            "extract",
            &format!(
                "{} sweeps x {} points x {} bands, foreground {} background {:?}, delay {}",
                layout.sweep_count,
                points,
                bands,
                config.foreground,
                config.background,
                config.delay
            ),
        );
        SweepFrame::new(freq, signal)
    }

    pub fn run(
        &self,
        raw: ArrayView2<f64>,
        resolver: &dyn ParameterResolver,
    ) -> SweepResult<PipelineOutput> {
        let layout = resolver.resolve()?;
        let points_per_sweep = layout.points_per_sweep(raw.nrows())?;
        let mut frame = self.prepare(raw, layout)?;

        let stages = self.stages();
        for stage in &stages {
            frame = match stage.execute(frame) {
                Ok(next) => {
                    self.metrics.record_processed();
                    next
                }
                Err(err) => {
                    self.metrics.record_error();
                    log::error!("stage {} failed: {}", stage.name(), err);
                    return Err(err);
                }
            };
        }

        let spectrum = frame.into_spectrum();
        let report = RunReport {
            layout,
            points_per_sweep,
            bands: raw.ncols(),
            bandwidth: self.config.resolved_bandwidth(),
            stages: stages.iter().map(|stage| stage.name().to_string()).collect(),
            output_points: spectrum.len(),
            metrics: self.metrics.snapshot(),
        };
        Ok(PipelineOutput { spectrum, report })
    }
}
