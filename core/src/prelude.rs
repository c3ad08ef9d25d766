use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Frequency/intensity pair carried between processing stages.
///
/// Rows are samples within a sweep and columns are frequency bands. A single
/// band, and the stitched waveform, are both a one-column frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepFrame {
    pub freq: Array2<f64>,
    pub inten: Array2<f64>,
}

impl SweepFrame {
    pub fn new(freq: Array2<f64>, inten: Array2<f64>) -> SweepResult<Self> {
        ensure_same_shape("sweep frame", freq.view(), inten.view())?;
        Ok(Self { freq, inten })
    }

    /// Wraps a 1-D waveform as a single-column frame.
    pub fn from_waveform(freq: Array1<f64>, inten: Array1<f64>) -> SweepResult<Self> {
        Self::new(freq.insert_axis(Axis(1)), inten.insert_axis(Axis(1)))
    }

    pub fn points(&self) -> usize {
        self.inten.nrows()
    }

    pub fn bands(&self) -> usize {
        self.inten.ncols()
    }

    /// Column-major flattening into a 1-D spectrum.
    pub fn into_spectrum(self) -> Spectrum {
        Spectrum {
            freq: flatten_columns(self.freq.view()),
            inten: flatten_columns(self.inten.view()),
        }
    }
}

/// Final stitched output: frequency sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub freq: Array1<f64>,
    pub inten: Array1<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.inten.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inten.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.freq.iter().copied().zip(self.inten.iter().copied())
    }
}

/// Coarse error families used by callers to choose a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    Shape,
    Numerical,
}

/// Common error type for every pipeline operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    #[error("points per sweep must be at least 2, got {0}")]
    DegeneratePoints(usize),
    #[error("bandwidth must be positive, got {0}")]
    NonPositiveBandwidth(f64),
    #[error("{role} sweep ordinal {ordinal} outside 1..={sweep_count}")]
    OrdinalOutOfRange {
        role: &'static str,
        ordinal: usize,
        sweep_count: usize,
    },
    #[error("detector delay {delay} must be below points per sweep {points}")]
    DelayOutOfRange { delay: usize, points: usize },
    #[error("invalid sweep count: {0}")]
    InvalidSweepCount(String),
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("{samples} samples do not form whole sweeps of {sweep_count} sweeps")]
    IncompleteSweeps { samples: usize, sweep_count: usize },
    #[error("shape mismatch in {context}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
    #[error("boxcar window {window} not smaller than waveform length {len}")]
    WindowTooLarge { window: usize, len: usize },
    #[error("{context} needs at least {needed} samples, found {found}")]
    InsufficientData {
        context: &'static str,
        needed: usize,
        found: usize,
    },
    #[error("singular system: {0}")]
    SingularSystem(String),
}

impl SweepError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SweepError::DegeneratePoints(_)
            | SweepError::NonPositiveBandwidth(_)
            | SweepError::OrdinalOutOfRange { .. }
            | SweepError::DelayOutOfRange { .. }
            | SweepError::InvalidSweepCount(_)
            | SweepError::MissingParameter(_) => ErrorKind::Configuration,
            SweepError::IncompleteSweeps { .. }
            | SweepError::ShapeMismatch { .. }
            | SweepError::EmptyInput(_) => ErrorKind::Shape,
            SweepError::WindowTooLarge { .. }
            | SweepError::InsufficientData { .. }
            | SweepError::SingularSystem(_) => ErrorKind::Numerical,
        }
    }
}

pub type SweepResult<T> = Result<T, SweepError>;

/// Trait describing one step of the reconstruction chain.
pub trait ProcessingStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, frame: SweepFrame) -> SweepResult<SweepFrame>;
}

pub(crate) fn ensure_same_shape(
    context: &'static str,
    freq: ArrayView2<f64>,
    inten: ArrayView2<f64>,
) -> SweepResult<()> {
    if freq.shape() != inten.shape() {
        return Err(SweepError::ShapeMismatch {
            context,
            expected: freq.shape().to_vec(),
            found: inten.shape().to_vec(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_same_len(
    context: &'static str,
    freq: ArrayView1<f64>,
    inten: ArrayView1<f64>,
) -> SweepResult<()> {
    if freq.len() != inten.len() {
        return Err(SweepError::ShapeMismatch {
            context,
            expected: vec![freq.len()],
            found: vec![inten.len()],
        });
    }
    Ok(())
}

pub(crate) fn flatten_columns(matrix: ArrayView2<f64>) -> Array1<f64> {
    matrix.t().iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn flatten_is_column_major() {
        let m = array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]];
        assert_eq!(
            flatten_columns(m.view()),
            array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn frame_rejects_mismatched_shapes() {
        let err = SweepFrame::new(Array2::zeros((4, 2)), Array2::zeros((4, 3))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn error_kinds_follow_taxonomy() {
        assert_eq!(
            SweepError::DegeneratePoints(1).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            SweepError::WindowTooLarge { window: 5, len: 3 }.kind(),
            ErrorKind::Numerical
        );
        assert!(SweepError::NonPositiveBandwidth(-1.0)
            .to_string()
            .contains("positive"));
    }
}
