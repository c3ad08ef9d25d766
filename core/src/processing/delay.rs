use crate::prelude::{ensure_same_shape, SweepError, SweepResult};
use ndarray::{s, Array2, ArrayView2};

fn check_delay(delay: usize, rows: usize) -> SweepResult<()> {
    if delay > 0 && delay >= rows {
        return Err(SweepError::DelayOutOfRange {
            delay,
            points: rows,
        });
    }
    Ok(())
}

/// Rotates rows so the first `delay` samples move to the end.
pub fn roll_delay(inten: ArrayView2<f64>, delay: usize) -> SweepResult<Array2<f64>> {
    if delay == 0 {
        return Ok(inten.to_owned());
    }
    check_delay(delay, inten.nrows())?;
    let rows = inten.nrows();
    Ok(Array2::from_shape_fn(inten.dim(), |(row, band)| {
        inten[[(row + delay) % rows, band]]
    }))
}

/// Drops the last `delay` rows of both arrays, keeping them aligned.
pub fn truncate_delay(
    freq: ArrayView2<f64>,
    inten: ArrayView2<f64>,
    delay: usize,
) -> SweepResult<(Array2<f64>, Array2<f64>)> {
    ensure_same_shape("delay truncation", freq, inten)?;
    check_delay(delay, freq.nrows())?;
    let keep = freq.nrows() - delay;
    Ok((
        freq.slice(s![..keep, ..]).to_owned(),
        inten.slice(s![..keep, ..]).to_owned(),
    ))
}

/// Compensates a detector response lagging the stimulus by `delay` samples.
pub fn apply_delay(
    freq: ArrayView2<f64>,
    inten: ArrayView2<f64>,
    delay: usize,
) -> SweepResult<(Array2<f64>, Array2<f64>)> {
    ensure_same_shape("delay correction", freq, inten)?;
    let rolled = roll_delay(inten, delay)?;
    truncate_delay(freq, rolled.view(), delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, Axis};

    #[test]
    fn roll_moves_leading_samples_to_end() {
        let x = Array1::from_shape_fn(100, |i| i as f64).insert_axis(Axis(1));
        let rolled = roll_delay(x.view(), 5).unwrap();
        assert_eq!(rolled[[0, 0]], 5.0);
        assert_eq!(rolled[[94, 0]], 99.0);
        assert_eq!(rolled[[95, 0]], 0.0);
        assert_eq!(rolled[[99, 0]], 4.0);
    }

    #[test]
    fn roll_applies_to_every_band() {
        let x = Array2::from_shape_fn((100, 4), |(r, _)| r as f64);
        let rolled = roll_delay(x.view(), 5).unwrap();
        for column in rolled.columns() {
            assert_eq!(column[0], 5.0);
            assert_eq!(column[99], 4.0);
        }
    }

    #[test]
    fn apply_delay_truncates_both_arrays_identically() {
        let freq = Array2::from_shape_fn((10, 2), |(r, c)| (r + 10 * c) as f64);
        let inten = freq.mapv(|v| v * 2.0);
        let (f, y) = apply_delay(freq.view(), inten.view(), 3).unwrap();
        assert_eq!(f.dim(), (7, 2));
        assert_eq!(y.dim(), (7, 2));
        assert_eq!(f[[0, 0]], 0.0);
        assert_eq!(y[[0, 0]], 6.0);
        assert_eq!(y[[6, 1]], 38.0);
    }

    #[test]
    fn zero_delay_is_identity() {
        let freq = Array2::from_shape_fn((6, 1), |(r, _)| r as f64);
        let (f, y) = apply_delay(freq.view(), freq.view(), 0).unwrap();
        assert_eq!(f, freq);
        assert_eq!(y, freq);
    }

    #[test]
    fn delay_must_be_shorter_than_sweep() {
        let freq = Array2::<f64>::zeros((6, 1));
        assert!(matches!(
            apply_delay(freq.view(), freq.view(), 6).unwrap_err(),
            SweepError::DelayOutOfRange { .. }
        ));
    }
}
