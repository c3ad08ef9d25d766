use crate::prelude::{SweepError, SweepResult};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Number of sweeps in the record and the direction of the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepLayout {
    pub sweep_count: usize,
    pub sweep_up: bool,
}

impl SweepLayout {
    pub fn new(sweep_count: usize, sweep_up: bool) -> SweepResult<Self> {
        if sweep_count == 0 {
            return Err(SweepError::InvalidSweepCount(
                "at least one sweep is required".into(),
            ));
        }
        Ok(Self {
            sweep_count,
            sweep_up,
        })
    }

    /// Points in one sweep, given the total number of time samples.
    pub fn points_per_sweep(&self, samples: usize) -> SweepResult<usize> {
        if self.sweep_count == 0 {
            return Err(SweepError::InvalidSweepCount(
                "at least one sweep is required".into(),
            ));
        }
        if samples % self.sweep_count != 0 {
            return Err(SweepError::IncompleteSweeps {
                samples,
                sweep_count: self.sweep_count,
            });
        }
        Ok(samples / self.sweep_count)
    }

    /// Direction of the given 1-based sweep; even ordinals run against sweep 1.
    pub fn runs_up(&self, ordinal: usize) -> bool {
        if ordinal % 2 == 1 {
            self.sweep_up
        } else {
            !self.sweep_up
        }
    }
}

/// Supplies the sweep layout to the pipeline.
///
/// The core never asks a user for missing values; callers that want
/// interactive input implement this trait themselves.
pub trait ParameterResolver {
    fn resolve(&self) -> SweepResult<SweepLayout>;
}

impl ParameterResolver for SweepLayout {
    fn resolve(&self) -> SweepResult<SweepLayout> {
        SweepLayout::new(self.sweep_count, self.sweep_up)
    }
}

/// Local-oscillator reference whose zero crossings mark direction reversals.
#[derive(Debug, Clone, PartialEq)]
pub struct LoTrace {
    samples: Array1<f64>,
}

impl LoTrace {
    pub fn new(samples: Array1<f64>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> ArrayView1<'_, f64> {
        self.samples.view()
    }

    /// Sign changes between adjacent samples.
    pub fn zero_crossings(&self) -> usize {
        self.samples
            .windows(2)
            .into_iter()
            .filter(|pair| pair[0] * pair[1] < 0.0)
            .count()
    }

    /// The LO starts below zero when the first sweep rises.
    pub fn first_sweep_up(&self) -> Option<bool> {
        self.samples.get(0).map(|&first| first < 0.0)
    }
}

impl ParameterResolver for LoTrace {
    fn resolve(&self) -> SweepResult<SweepLayout> {
        if self.samples.len() < 2 {
            return Err(SweepError::InvalidSweepCount(format!(
                "LO trace has {} samples",
                self.samples.len()
            )));
        }
        let crossings = self.zero_crossings();
        if crossings == 0 {
            return Err(SweepError::InvalidSweepCount(
                "LO trace never crosses zero".into(),
            ));
        }
        let sweep_up = self
            .first_sweep_up()
            .ok_or(SweepError::MissingParameter("sweep direction"))?;
        log::debug!("LO trace: {} crossings, first sweep up {}", crossings, sweep_up);
        SweepLayout::new(crossings, sweep_up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn lo_trace_counts_crossings_and_direction() {
        let lo = LoTrace::new(array![-1.0, 1.0, 2.0, -2.0, -1.0, 1.0, 0.5, -0.5]);
        let layout = lo.resolve().unwrap();
        assert_eq!(layout.sweep_count, 4);
        assert!(layout.sweep_up);

        let falling = LoTrace::new(array![1.0, -1.0, 1.0]);
        assert!(!falling.resolve().unwrap().sweep_up);
    }

    #[test]
    fn flat_lo_trace_is_rejected() {
        let lo = LoTrace::new(array![1.0, 1.0, 1.0]);
        assert!(matches!(
            lo.resolve().unwrap_err(),
            SweepError::InvalidSweepCount(_)
        ));
    }

    #[test]
    fn points_per_sweep_requires_whole_sweeps() {
        let layout = SweepLayout::new(4, true).unwrap();
        assert_eq!(layout.points_per_sweep(80).unwrap(), 20);
        assert!(matches!(
            layout.points_per_sweep(81).unwrap_err(),
            SweepError::IncompleteSweeps { .. }
        ));
        assert!(SweepLayout::new(0, true).is_err());
    }

    #[test]
    fn even_ordinals_run_against_first_sweep() {
        let layout = SweepLayout::new(4, false).unwrap();
        assert!(!layout.runs_up(1));
        assert!(layout.runs_up(2));
        assert!(!layout.runs_up(3));
    }
}
