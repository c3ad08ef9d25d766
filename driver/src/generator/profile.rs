use anyhow::{ensure, Context};
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sweepcore::processing::frequency::sweep_ramp;
use sweepcore::{CenterFrequency, SweepLayout};

/// Configuration for generating a synthetic pulsed-sweep record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub points_per_sweep: usize,
    pub sweep_count: usize,
    pub sweep_up: bool,
    pub centers: Vec<f64>,
    pub bandwidth: f64,
    pub line_frequency: f64,
    pub line_width: f64,
    pub line_depth: f64,
    pub baseline_tilt: f64,
    pub sweep_drift: f64,
    pub noise: f64,
    pub delay: usize,
    pub seed: u64,
    /// Sweep recorded without the absorber, if any.
    pub background: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            points_per_sweep: 200,
            sweep_count: 4,
            sweep_up: true,
            centers: vec![0.0],
            bandwidth: 10.0,
            line_frequency: 1.5,
            line_width: 0.3,
            line_depth: 1.0,
            baseline_tilt: 0.05,
            sweep_drift: 0.2,
            noise: 0.01,
            delay: 0,
            seed: 0,
            background: None,
        }
    }
}

/// Synthetic detector record and the LO trace that accompanied it.
pub struct SyntheticRecord {
    pub raw: Array2<f64>,
    pub lo: Array1<f64>,
    pub layout: SweepLayout,
    pub center: CenterFrequency,
}

fn lorentzian(freq: f64, center: f64, width: f64) -> f64 {
    let half = width / 2.0;
    half * half / ((freq - center).powi(2) + half * half)
}

pub fn build_record(config: &GeneratorConfig) -> anyhow::Result<SyntheticRecord> {
    ensure!(!config.centers.is_empty(), "generator needs at least one band center");
    ensure!(
        config.delay < config.points_per_sweep,
        "generator delay must be shorter than a sweep"
    );
    let layout = SweepLayout::new(config.sweep_count, config.sweep_up)?;
    let points = config.points_per_sweep;
    let samples = points
        .checked_mul(config.sweep_count)
        .context("overflow computing sample count for generator")?;
    let bands = config.centers.len();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut clean = Array2::<f64>::zeros((samples, bands));
    let mut lo = Array1::<f64>::zeros(samples);
    // nudges the LO off exact zero so every sweep has one sign change
    let lo_offset = 0.5 / (points.max(2) - 1) as f64;

    for ordinal in 1..=config.sweep_count {
        let ramp = sweep_ramp(points, layout.runs_up(ordinal))?;
        let start = (ordinal - 1) * points;
        let has_line = config.background != Some(ordinal);
        let drift = config.sweep_drift * ordinal as f64;

        for (i, &r) in ramp.iter().enumerate() {
            lo[start + i] = 2.0 * r + lo_offset;
            for (band, &center) in config.centers.iter().enumerate() {
                let freq = center + config.bandwidth * r;
                let line = if has_line {
                    -config.line_depth * lorentzian(freq, config.line_frequency, config.line_width)
                } else {
                    0.0
                };
                let jitter = if config.noise > 0.0 {
                    rng.gen_range(-config.noise..config.noise)
                } else {
                    0.0
                };
                clean[[start + i, band]] = 1.0 + config.baseline_tilt * r + drift + line + jitter;
            }
        }
    }

    // the detector lags the stimulus; its first samples repeat the first reading
    let mut raw = clean.clone();
    if config.delay > 0 {
        for row in 0..samples {
            let source = row.saturating_sub(config.delay);
            raw.row_mut(row).assign(&clean.row(source));
        }
    }

    let center = if bands == 1 {
        CenterFrequency::Single(config.centers[0])
    } else {
        CenterFrequency::Bands(config.centers.clone())
    };
    Ok(SyntheticRecord {
        raw,
        lo,
        layout,
        center,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepcore::{LoTrace, ParameterResolver};

    #[test]
    fn generator_builds_expected_shape() {
        let config = GeneratorConfig {
            centers: vec![100.0, 110.0, 120.0],
            ..Default::default()
        };
        let record = build_record(&config).unwrap();
        assert_eq!(record.raw.dim(), (800, 3));
        assert_eq!(record.lo.len(), 800);
        assert_eq!(record.center.band_count(), 3);
    }

    #[test]
    fn lo_trace_round_trips_layout() {
        for (points, up) in [(200, true), (51, false)] {
            let config = GeneratorConfig {
                points_per_sweep: points,
                sweep_count: 6,
                sweep_up: up,
                ..Default::default()
            };
            let record = build_record(&config).unwrap();
            let layout = LoTrace::new(record.lo.clone()).resolve().unwrap();
            assert_eq!(layout, record.layout);
        }
    }

    #[test]
    fn same_seed_repeats_noise() {
        let config = GeneratorConfig {
            seed: 13,
            ..Default::default()
        };
        let a = build_record(&config).unwrap();
        let b = build_record(&config).unwrap();
        assert_eq!(a.raw, b.raw);
    }

    #[test]
    fn delay_shifts_samples_later() {
        let base = GeneratorConfig {
            noise: 0.0,
            ..Default::default()
        };
        let delayed = GeneratorConfig { delay: 4, ..base.clone() };
        let a = build_record(&base).unwrap();
        let b = build_record(&delayed).unwrap();
        assert_eq!(b.raw[[10, 0]], a.raw[[6, 0]]);
        assert_eq!(b.raw[[0, 0]], a.raw[[0, 0]]);
    }
}
