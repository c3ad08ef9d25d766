use crate::prelude::{SweepError, SweepResult};
use ndarray::{s, Array2, ArrayView2, Axis};

fn sweep_count(raw: ArrayView2<f64>, points_per_sweep: usize) -> SweepResult<usize> {
    if points_per_sweep == 0 {
        return Err(SweepError::DegeneratePoints(points_per_sweep));
    }
    if raw.nrows() == 0 || raw.ncols() == 0 {
        return Err(SweepError::EmptyInput("intensity"));
    }
    if raw.nrows() % points_per_sweep != 0 {
        return Err(SweepError::IncompleteSweeps {
            samples: raw.nrows(),
            sweep_count: raw.nrows() / points_per_sweep,
        });
    }
    Ok(raw.nrows() / points_per_sweep)
}

fn check_ordinal(role: &'static str, ordinal: usize, sweep_count: usize) -> SweepResult<()> {
    if ordinal == 0 || ordinal > sweep_count {
        return Err(SweepError::OrdinalOutOfRange {
            role,
            ordinal,
            sweep_count,
        });
    }
    Ok(())
}

/// Rows of the 1-based sweep `ordinal`, in recording order.
pub fn segment(
    raw: ArrayView2<'_, f64>,
    points_per_sweep: usize,
    ordinal: usize,
) -> SweepResult<ArrayView2<'_, f64>> {
    let count = sweep_count(raw, points_per_sweep)?;
    check_ordinal("sweep", ordinal, count)?;
    let start = (ordinal - 1) * points_per_sweep;
    Ok(raw.slice_move(s![start..start + points_per_sweep, ..]))
}

/// Whether a background sweep must be reversed to line up with the foreground.
///
/// Sweeps alternate direction, so an odd `fg - bg` means opposite directions.
pub fn needs_reversal(foreground: usize, background: usize) -> bool {
    (foreground as i64 - background as i64 + 1).rem_euclid(2) == 0
}

/// Signal intensity of one sweep, shaped `points_per_sweep × bands`.
///
/// Without a background every sweep sharing the foreground's parity is
/// averaged. A background equal to the foreground extracts that sweep alone;
/// any other background is direction-aligned and subtracted.
pub fn extract_or_average(
    raw: ArrayView2<f64>,
    points_per_sweep: usize,
    foreground: usize,
    background: Option<usize>,
) -> SweepResult<Array2<f64>> {
    let count = sweep_count(raw, points_per_sweep)?;
    check_ordinal("foreground", foreground, count)?;

    match background {
        None => {
            let mut total = Array2::<f64>::zeros((points_per_sweep, raw.ncols()));
            let mut selected = 0usize;
            for ordinal in (1..=count).filter(|o| o % 2 == foreground % 2) {
                total += &segment(raw, points_per_sweep, ordinal)?;
                selected += 1;
            }
            log::debug!(
                "averaged {} of {} sweeps with parity of sweep {}",
                selected,
                count,
                foreground
            );
            Ok(total / selected as f64)
        }
        Some(bg) if bg == foreground => Ok(segment(raw, points_per_sweep, foreground)?.to_owned()),
        Some(bg) => {
            check_ordinal("background", bg, count)?;
            let signal = segment(raw, points_per_sweep, foreground)?;
            let mut reference = segment(raw, points_per_sweep, bg)?;
            if needs_reversal(foreground, bg) {
                reference.invert_axis(Axis(0));
            }
            Ok(&signal - &reference)
        }
    }
}
