use crate::math::FftHelper;
use crate::prelude::{ensure_same_len, ensure_same_shape, ProcessingStage, SweepError, SweepFrame, SweepResult};
use crate::telemetry::LogManager;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

/// Windows at or above this length are convolved in the frequency domain.
pub const FFT_WINDOW_THRESHOLD: usize = 64;

/// Normalizes any integer to an odd window of at least one sample.
pub fn box_win(window: i64) -> usize {
    let magnitude = window.unsigned_abs() as usize;
    if magnitude == 0 {
        1
    } else if magnitude % 2 == 0 {
        magnitude + 1
    } else {
        magnitude
    }
}

fn moving_average(y: ArrayView1<f64>, window: usize) -> Array1<f64> {
    let scale = 1.0 / window as f64;
    if window >= FFT_WINDOW_THRESHOLD {
        let helper = FftHelper::for_convolution(y.len(), window);
        let kernel = vec![scale; window];
        return Array1::from(helper.convolve_valid(&y.to_vec(), &kernel));
    }
    y.windows(window)
        .into_iter()
        .map(|win| win.sum() * scale)
        .collect()
}

/// Valid-mode boxcar over each column, with the frequency axis cropped by
/// `window / 2` samples at both ends.
pub fn boxcar_columns(
    freq: ArrayView2<f64>,
    inten: ArrayView2<f64>,
    window: i64,
) -> SweepResult<(Array2<f64>, Array2<f64>)> {
    ensure_same_shape("boxcar", freq, inten)?;
    let window = box_win(window);
    if window == 1 {
        return Ok((freq.to_owned(), inten.to_owned()));
    }
    let rows = inten.nrows();
    if window >= rows {
        return Err(SweepError::WindowTooLarge { window, len: rows });
    }

    let half = window / 2;
    let columns = (0..inten.ncols())
        .into_par_iter()
        .map(|band| moving_average(inten.column(band), window))
        .collect::<Vec<_>>();
    let mut smoothed = Array2::<f64>::zeros((rows - window + 1, inten.ncols()));
    for (mut target, column) in smoothed.axis_iter_mut(Axis(1)).zip(columns.iter()) {
        target.assign(column);
    }

    let cropped = freq.slice(s![half..rows - half, ..]).to_owned();
    Ok((cropped, smoothed))
}

/// Boxcar smoothing of a single waveform.
pub fn boxcar(
    freq: ArrayView1<f64>,
    inten: ArrayView1<f64>,
    window: i64,
) -> SweepResult<(Array1<f64>, Array1<f64>)> {
    ensure_same_len("boxcar", freq, inten)?;
    let (freq, inten) = boxcar_columns(
        freq.insert_axis(Axis(1)),
        inten.insert_axis(Axis(1)),
        window,
    )?;
    Ok((freq.column(0).to_owned(), inten.column(0).to_owned()))
}

/// Boxcar stage; a frame of several bands is smoothed band by band.
///
/// The pipeline places it after stitching, so it smooths the single
/// stitched column and the window runs across former band boundaries.
pub struct BoxcarStage {
    window: i64,
    logger: LogManager,
}

impl BoxcarStage {
    pub fn new(window: i64) -> Self {
        Self {
            window,
            logger: LogManager::new(),
        }
    }
}

impl ProcessingStage for BoxcarStage {
    fn name(&self) -> &'static str {
        "boxcar"
    }

    fn execute(&self, frame: SweepFrame) -> SweepResult<SweepFrame> {
        let (freq, inten) = boxcar_columns(frame.freq.view(), frame.inten.view(), self.window)?;
        self.logger.stage(
            self.name(),
            &format!("window {} -> {} points", box_win(self.window), inten.nrows()),
        );
        SweepFrame::new(freq, inten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    fn ramp(len: usize, offset: f64) -> Array1<f64> {
        Array1::from_shape_fn(len, |i| i as f64 + offset)
    }

    #[test]
    fn window_normalization_is_odd_and_positive() {
        for (input, expected) in [(1, 1), (2, 3), (3, 3), (0, 1), (-1, 1), (-2, 3)] {
            assert_eq!(box_win(input), expected, "window {}", input);
        }
        for w in -50..50 {
            let verified = box_win(w);
            assert!(verified >= 1 && verified % 2 == 1);
        }
    }

    #[test]
    fn unit_window_is_identity() {
        let x = ramp(10, 0.0);
        let y = ramp(20, 0.0).mapv(f64::sqrt).slice_move(s![..10]);
        let (fx, fy) = boxcar(x.view(), y.view(), 1).unwrap();
        assert_eq!(fx, x);
        assert_eq!(fy, y);
    }

    #[test]
    fn window_three_shortens_and_averages_ramp() {
        let x = ramp(20, 0.0);
        let (fx, fy) = boxcar(x.view(), x.view(), 3).unwrap();
        assert_eq!(fx.len(), 18);
        assert_eq!(fy.len(), 18);
        for (a, b) in fy.iter().zip(ramp(18, 1.0).iter()) {
            assert!((a - b).abs() < TOL);
        }
        assert_eq!(fx, ramp(18, 1.0));
    }

    #[test]
    fn even_window_rounds_up() {
        let x = ramp(10, 0.0);
        let (_, fy) = boxcar(x.view(), x.view(), 2).unwrap();
        assert_eq!(fy.len(), 8);
    }

    #[test]
    fn columns_are_smoothed_independently() {
        let freq = Array2::from_shape_fn((10, 10), |(r, _)| r as f64);
        let inten = Array2::from_shape_fn((10, 10), |(r, c)| (r * (c + 1)) as f64);
        let (fx, fy) = boxcar_columns(freq.view(), inten.view(), 3).unwrap();
        assert_eq!(fx.dim(), (8, 10));
        assert_eq!(fy.dim(), (8, 10));
        for c in 0..10 {
            assert_eq!(fx.column(c), ramp(8, 1.0));
            assert!((fy[[0, c]] - (c + 1) as f64).abs() < TOL);
        }
    }

    #[test]
    fn fft_path_matches_direct_average() {
        let y = Array1::from_shape_fn(400, |i| (i as f64 * 0.05).sin() + 0.01 * i as f64);
        let window = 65;
        let (_, fast) = boxcar(y.view(), y.view(), window as i64).unwrap();
        assert_eq!(fast.len(), 400 - window + 1);
        for (i, value) in fast.iter().enumerate() {
            let direct = y.slice(s![i..i + window]).sum() / window as f64;
            assert!((value - direct).abs() < 1e-9);
        }
    }

    #[test]
    fn window_reaching_length_fails() {
        let x = ramp(5, 0.0);
        assert_eq!(
            boxcar(x.view(), x.view(), 5).unwrap_err(),
            SweepError::WindowTooLarge { window: 5, len: 5 }
        );
    }
}
