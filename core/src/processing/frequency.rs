use crate::acquisition::CenterFrequency;
use crate::prelude::{SweepError, SweepResult};
use ndarray::{Array1, Array2};

/// Normalized sweep ramp `i / (n - 1) - 0.5`, mirrored for a falling sweep.
pub fn sweep_ramp(points_per_sweep: usize, sweep_up: bool) -> SweepResult<Array1<f64>> {
    if points_per_sweep < 2 {
        return Err(SweepError::DegeneratePoints(points_per_sweep));
    }
    let last = (points_per_sweep - 1) as f64;
    let sign = if sweep_up { 1.0 } else { -1.0 };
    Ok(Array1::from_shape_fn(points_per_sweep, |i| {
        sign * (i as f64 / last - 0.5)
    }))
}

/// Frequency of every sample in one sweep, one column per band.
pub fn reconstruct_frequency(
    center: &CenterFrequency,
    points_per_sweep: usize,
    sweep_up: bool,
    bandwidth: f64,
) -> SweepResult<Array2<f64>> {
    if !bandwidth.is_finite() || bandwidth <= 0.0 {
        return Err(SweepError::NonPositiveBandwidth(bandwidth));
    }
    let centers = center.centers();
    if centers.is_empty() {
        return Err(SweepError::MissingParameter("center frequency"));
    }

    let ramp = sweep_ramp(points_per_sweep, sweep_up)? * bandwidth;
    Ok(Array2::from_shape_fn(
        (points_per_sweep, centers.len()),
        |(row, band)| ramp[row] + centers[band],
    ))
}
