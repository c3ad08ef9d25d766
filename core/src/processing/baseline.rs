use crate::config::SplineOptions;
use crate::math::{PenalizedSpline, Polynomial, StatsHelper};
use crate::prelude::{ProcessingStage, SweepError, SweepFrame, SweepResult};
use crate::telemetry::LogManager;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Rescaled median above this marks a dominant dip under a high baseline.
const DIP_MEDIAN: f64 = 0.9;
/// Rescaled median below this marks a dominant peak over a low baseline.
const PEAK_MEDIAN: f64 = 0.1;

/// Subtracts a least-squares polynomial fitted over the normalized index.
pub fn debaseline_poly(y: ArrayView1<f64>, degree: usize) -> SweepResult<Array1<f64>> {
    let x = StatsHelper::unit_abscissa(y.len());
    let poly = Polynomial::fit(x.view(), y, degree)?;
    Ok(&y - &poly.eval_all(x.view()))
}

/// Per-sample weights that hide a single dominant feature from the baseline fit.
pub fn adaptive_weights(y: ArrayView1<f64>) -> Array1<f64> {
    let scaled = match StatsHelper::rescale_unit(y) {
        Some(scaled) => scaled,
        None => return Array1::ones(y.len()),
    };
    let median = StatsHelper::median(scaled.view()).unwrap_or(0.5);

    if median > DIP_MEDIAN {
        scaled.mapv(|v| if v < DIP_MEDIAN { 0.0 } else { 1.0 })
    } else if median < PEAK_MEDIAN {
        scaled.mapv(|v| if v > PEAK_MEDIAN { 0.0 } else { 1.0 })
    } else {
        Array1::ones(y.len())
    }
}

/// Subtracts a weighted degree-5 spline, then any linear tilt left on the
/// weighted samples.
pub fn debaseline_spline(y: ArrayView1<f64>, options: &SplineOptions) -> SweepResult<Array1<f64>> {
    let x = StatsHelper::unit_abscissa(y.len());
    let weights = adaptive_weights(y);
    let spline = PenalizedSpline::fit(x.view(), y, weights.view(), options.segments, options.smoothing)?;
    let residual = &y - &spline.eval_all(x.view());

    let (kept_x, kept_y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(residual.iter())
        .zip(weights.iter())
        .filter(|(_, w)| **w > 0.0)
        .map(|((&xi, &ri), _)| (xi, ri))
        .unzip();
    if kept_x.len() < 2 {
        log::warn!(
            "spline detrend skipped: {} weighted samples",
            kept_x.len()
        );
        return Ok(residual);
    }

    let tilt = Polynomial::fit(
        Array1::from(kept_x).view(),
        Array1::from(kept_y).view(),
        1,
    )?;
    Ok(&residual - &tilt.eval_all(x.view()))
}

/// Polynomial removal followed by the optional spline pass.
pub fn debaseline_column(
    y: ArrayView1<f64>,
    degree: usize,
    spline: Option<SplineOptions>,
) -> SweepResult<Array1<f64>> {
    let flattened = debaseline_poly(y, degree)?;
    match spline {
        Some(options) => debaseline_spline(flattened.view(), &options),
        None => Ok(flattened),
    }
}

/// Debaselines every sweep column independently.
pub fn debaseline_per_sweep(
    inten: ArrayView2<f64>,
    degree: usize,
    spline: Option<SplineOptions>,
) -> SweepResult<Array2<f64>> {
    if inten.is_empty() {
        return Err(SweepError::EmptyInput("per-sweep baseline"));
    }
    let columns = (0..inten.ncols())
        .into_par_iter()
        .map(|band| debaseline_column(inten.column(band), degree, spline))
        .collect::<SweepResult<Vec<_>>>()?;

    let mut output = Array2::<f64>::zeros(inten.dim());
    for (mut target, column) in output.columns_mut().into_iter().zip(columns.iter()) {
        target.assign(column);
    }
    Ok(output)
}

/// Removes the broad residual baseline of a stitched waveform.
pub fn debaseline_wideband(
    inten: ArrayView1<f64>,
    spline: Option<SplineOptions>,
) -> SweepResult<Array1<f64>> {
    if inten.is_empty() {
        return Err(SweepError::EmptyInput("wideband baseline"));
    }
    debaseline_column(inten, 1, spline)
}

/// Per-sweep baseline stage applied before stitching.
pub struct PerSweepBaselineStage {
    degree: usize,
    spline: Option<SplineOptions>,
    logger: LogManager,
}

impl PerSweepBaselineStage {
    pub fn new(degree: usize, spline: Option<SplineOptions>) -> Self {
        Self {
            degree,
            spline,
            logger: LogManager::new(),
        }
    }
}

impl ProcessingStage for PerSweepBaselineStage {
    fn name(&self) -> &'static str {
        "per-sweep-baseline"
    }

    fn execute(&self, frame: SweepFrame) -> SweepResult<SweepFrame> {
        let inten = debaseline_per_sweep(frame.inten.view(), self.degree, self.spline)?;
        for (band, column) in inten.columns().into_iter().enumerate() {
            let rms = StatsHelper::rms(column);
            self.logger
                .column(self.name(), band, &format!("residual RMS {:.4e}", rms));
        }
        self.logger.stage(
            self.name(),
            &format!(
                "degree {} spline {} across {} sweeps",
                self.degree,
                self.spline.is_some(),
                frame.bands()
            ),
        );
        SweepFrame::new(frame.freq, inten)
    }
}

/// Wideband baseline stage applied to the stitched waveform.
pub struct WidebandBaselineStage {
    spline: Option<SplineOptions>,
    logger: LogManager,
}

impl WidebandBaselineStage {
    pub fn new(spline: Option<SplineOptions>) -> Self {
        Self {
            spline,
            logger: LogManager::new(),
        }
    }
}

impl ProcessingStage for WidebandBaselineStage {
    fn name(&self) -> &'static str {
        "wideband-baseline"
    }

    fn execute(&self, frame: SweepFrame) -> SweepResult<SweepFrame> {
        let spectrum = frame.into_spectrum();
        let inten = debaseline_wideband(spectrum.inten.view(), self.spline)?;
        let rms = StatsHelper::rms(inten.view());
        self.logger
            .stage(self.name(), &format!("residual RMS {:.4e}", rms));
        SweepFrame::from_waveform(spectrum.freq, inten)
    }
}
