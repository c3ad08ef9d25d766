use crate::acquisition::CenterFrequency;
use crate::prelude::{SweepError, SweepResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BANDWIDTH: f64 = 1.0;

/// Which baseline corrections run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineMode {
    None,
    #[default]
    Polynomial,
    PolynomialSpline,
}

impl BaselineMode {
    pub fn enabled(&self) -> bool {
        !matches!(self, BaselineMode::None)
    }

    pub fn uses_spline(&self) -> bool {
        matches!(self, BaselineMode::PolynomialSpline)
    }
}

/// Tuning of the adaptive spline baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineOptions {
    pub segments: usize,
    pub smoothing: f64,
}

impl Default for SplineOptions {
    fn default() -> Self {
        Self {
            segments: 8,
            smoothing: 1e-3,
        }
    }
}

/// Already-parsed processing parameters handed in by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub foreground: usize,
    pub background: Option<usize>,
    pub center: CenterFrequency,
    pub bandwidth: Option<f64>,
    pub boxcar: Option<i64>,
    pub delay: usize,
    pub baseline: BaselineMode,
    pub poly_degree: usize,
    pub derivative: bool,
    pub spline: SplineOptions,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            foreground: 1,
            background: None,
            center: CenterFrequency::default(),
            bandwidth: None,
            boxcar: None,
            delay: 0,
            baseline: BaselineMode::default(),
            poly_degree: 1,
            derivative: false,
            spline: SplineOptions::default(),
        }
    }
}

impl ProcessingConfig {
    /// Explicit bandwidth, else the spacing of the center list, else 1.
    pub fn resolved_bandwidth(&self) -> f64 {
        self.bandwidth
            .or_else(|| self.center.spacing())
            .unwrap_or(DEFAULT_BANDWIDTH)
    }

    /// Checks that need no data.
    pub fn validate(&self) -> SweepResult<()> {
        let bandwidth = self.resolved_bandwidth();
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(SweepError::NonPositiveBandwidth(bandwidth));
        }
        if self.foreground == 0 {
            return Err(SweepError::OrdinalOutOfRange {
                role: "foreground",
                ordinal: 0,
                sweep_count: 0,
            });
        }
        if self.background == Some(0) {
            return Err(SweepError::OrdinalOutOfRange {
                role: "background",
                ordinal: 0,
                sweep_count: 0,
            });
        }
        if self.center.band_count() == 0 {
            return Err(SweepError::MissingParameter("center frequency"));
        }
        Ok(())
    }

    /// Checks against the resolved record geometry.
    pub fn validate_layout(&self, sweep_count: usize, points_per_sweep: usize) -> SweepResult<()> {
        if points_per_sweep < 2 {
            return Err(SweepError::DegeneratePoints(points_per_sweep));
        }
        for (role, ordinal) in [("foreground", Some(self.foreground)), ("background", self.background)] {
            if let Some(ordinal) = ordinal {
                if ordinal == 0 || ordinal > sweep_count {
                    return Err(SweepError::OrdinalOutOfRange {
                        role,
                        ordinal,
                        sweep_count,
                    });
                }
            }
        }
        if self.delay >= points_per_sweep {
            return Err(SweepError::DelayOutOfRange {
                delay: self.delay,
                points: points_per_sweep,
            });
        }
        Ok(())
    }
}
