use crate::prelude::{
    ensure_same_shape, flatten_columns, ProcessingStage, Spectrum, SweepError, SweepFrame,
    SweepResult,
};
use crate::telemetry::LogManager;
use ndarray::{Array1, Array2, ArrayView2};

/// Offsets each column so it starts where the previous one ended.
///
/// Column `c` is shifted by the running sum of `last(c - 1) - first(c)`,
/// measured on the uncorrected data. Each column keeps its internal shape.
pub fn glue(inten: ArrayView2<f64>) -> Array2<f64> {
    let mut output = inten.to_owned();
    let Some(last) = inten.nrows().checked_sub(1) else {
        return output;
    };

    let mut offset = 0.0;
    for band in 1..inten.ncols() {
        offset += inten[[last, band - 1]] - inten[[0, band]];
        let mut column = output.column_mut(band);
        column += offset;
    }
    output
}

/// Reorders every sample by frequency, keeping the matrix shape.
///
/// The column-major flattened axis is stable-sorted and refilled column by
/// column, so overlapping bands still flatten to an ascending waveform.
fn orient(freq: ArrayView2<f64>, inten: ArrayView2<f64>) -> (Array2<f64>, Array2<f64>) {
    let (rows, cols) = freq.dim();
    let flat_freq = flatten_columns(freq);
    let flat_inten = flatten_columns(inten);

    let mut order: Vec<usize> = (0..flat_freq.len()).collect();
    order.sort_by(|&a, &b| flat_freq[a].total_cmp(&flat_freq[b]));
    let refill = |flat: &Array1<f64>| {
        Array2::from_shape_fn((rows, cols), |(row, col)| flat[order[col * rows + row]])
    };
    (refill(&flat_freq), refill(&flat_inten))
}

/// Flattens a sweep matrix into one ascending waveform, optionally glued.
pub fn stitch_with(
    freq: ArrayView2<f64>,
    inten: ArrayView2<f64>,
    continuity: bool,
) -> SweepResult<Spectrum> {
    ensure_same_shape("stitch", freq, inten)?;
    if freq.is_empty() {
        return Err(SweepError::EmptyInput("stitch"));
    }

    let (freq, inten) = orient(freq, inten);
    let inten = if continuity && inten.ncols() > 1 {
        glue(inten.view())
    } else {
        inten
    };
    Ok(SweepFrame { freq, inten }.into_spectrum())
}

/// Flattens with continuity correction between sweep segments.
pub fn stitch(freq: ArrayView2<f64>, inten: ArrayView2<f64>) -> SweepResult<Spectrum> {
    stitch_with(freq, inten, true)
}

/// Stage turning the per-sweep matrix into the single-column waveform.
pub struct StitchStage {
    continuity: bool,
    logger: LogManager,
}

impl StitchStage {
    pub fn new(continuity: bool) -> Self {
        Self {
            continuity,
            logger: LogManager::new(),
        }
    }
}

impl ProcessingStage for StitchStage {
    fn name(&self) -> &'static str {
        "stitch"
    }

    fn execute(&self, frame: SweepFrame) -> SweepResult<SweepFrame> {
        let bands = frame.bands();
        let spectrum = stitch_with(frame.freq.view(), frame.inten.view(), self.continuity)?;
        self.logger.stage(
            self.name(),
            &format!(
                "{} segments -> {} points, glued {}",
                bands,
                spectrum.len(),
                self.continuity && bands > 1
            ),
        );
        SweepFrame::from_waveform(spectrum.freq, spectrum.inten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::CenterFrequency;
    use crate::processing::frequency::reconstruct_frequency;
    use ndarray::array;

    const TOL: f64 = 1e-9;

    #[test]
    fn glue_removes_every_boundary_jump() {
        let inten = Array2::from_shape_fn((12, 5), |(r, c)| {
            (r as f64 * 0.7).sin() + 3.0 * c as f64 - (c * c) as f64
        });
        let glued = glue(inten.view());
        for band in 0..4 {
            assert!((glued[[11, band]] - glued[[0, band + 1]]).abs() < TOL);
        }
        // internal shape of each column is unchanged
        for band in 0..5 {
            let before = &inten.column(band) - inten[[0, band]];
            let after = &glued.column(band) - glued[[0, band]];
            for (a, b) in before.iter().zip(after.iter()) {
                assert!((a - b).abs() < TOL);
            }
        }
        assert_eq!(glued.column(0), inten.column(0));
    }

    #[test]
    fn ascending_matrix_flattens_column_major() {
        let freq = Array2::from_shape_fn((100, 10), |(r, c)| (r + 100 * c) as f64);
        let inten = freq.mapv(f64::to_radians);
        let spectrum = stitch_with(freq.view(), inten.view(), false).unwrap();
        let expected = Array1::from_shape_fn(1000, |i| i as f64);
        assert_eq!(spectrum.freq, expected);
        assert_eq!(spectrum.inten, expected.mapv(f64::to_radians));
    }

    #[test]
    fn falling_sweeps_are_flipped_before_flattening() {
        let freq = array![[3.0, 7.0], [2.0, 6.0], [1.0, 5.0]];
        let inten = array![[30.0, 70.0], [20.0, 60.0], [10.0, 50.0]];
        let spectrum = stitch(freq.view(), inten.view()).unwrap();
        assert_eq!(spectrum.freq, array![1.0, 2.0, 3.0, 5.0, 6.0, 7.0]);
        // glued: second segment starts where the first ended
        assert_eq!(spectrum.inten, array![10.0, 20.0, 30.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn descending_band_order_is_sorted() {
        let freq = array![[5.0, 1.0], [6.0, 2.0]];
        let inten = array![[1.0, 0.0], [1.0, 0.0]];
        let spectrum = stitch_with(freq.view(), inten.view(), false).unwrap();
        assert_eq!(spectrum.freq, array![1.0, 2.0, 5.0, 6.0]);
        assert_eq!(spectrum.inten, array![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn overlapping_bands_flatten_to_sorted_axis() {
        let centers = CenterFrequency::Bands(vec![0.0, 1.0]);
        let freq = reconstruct_frequency(&centers, 10, true, 2.0).unwrap();
        let inten = freq.mapv(|f| 3.0 * f);
        let spectrum = stitch_with(freq.view(), inten.view(), false).unwrap();

        assert_eq!(spectrum.len(), 20);
        assert!(spectrum.freq.windows(2).into_iter().all(|w| w[0] <= w[1]));
        for (f, y) in spectrum.iter() {
            assert!((y - 3.0 * f).abs() < TOL);
        }
        assert_eq!(spectrum.freq[0], -1.0);
        assert_eq!(spectrum.freq[19], 2.0);
    }

    #[test]
    fn single_band_is_not_glued() {
        let freq = array![[0.0], [1.0], [2.0]];
        let inten = array![[4.0], [-1.0], [9.0]];
        let spectrum = stitch(freq.view(), inten.view()).unwrap();
        assert_eq!(spectrum.inten, array![4.0, -1.0, 9.0]);
    }

    #[test]
    fn mismatched_shapes_fail() {
        let freq = Array2::<f64>::zeros((4, 2));
        let inten = Array2::<f64>::zeros((4, 3));
        assert!(matches!(
            stitch(freq.view(), inten.view()).unwrap_err(),
            SweepError::ShapeMismatch { .. }
        ));
    }
}
