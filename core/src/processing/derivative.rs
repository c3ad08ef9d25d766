use crate::prelude::{ensure_same_len, ProcessingStage, SweepError, SweepFrame, SweepResult};
use crate::telemetry::LogManager;
use ndarray::{s, Array1, ArrayView1};

/// First difference of intensity, placed at the midpoint frequency of each pair.
pub fn differentiate(
    freq: ArrayView1<f64>,
    inten: ArrayView1<f64>,
) -> SweepResult<(Array1<f64>, Array1<f64>)> {
    ensure_same_len("derivative", freq, inten)?;
    if inten.len() < 2 {
        return Err(SweepError::InsufficientData {
            context: "derivative",
            needed: 2,
            found: inten.len(),
        });
    }
    let head = freq.slice(s![..-1]);
    let step = &freq.slice(s![1..]) - &head;
    let midpoints = &head + &(step / 2.0);
    let diff = &inten.slice(s![1..]) - &inten.slice(s![..-1]);
    Ok((midpoints, diff))
}

pub struct DerivativeStage {
    logger: LogManager,
}

impl DerivativeStage {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new(),
        }
    }
}

impl Default for DerivativeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for DerivativeStage {
    fn name(&self) -> &'static str {
        "derivative"
    }

    fn execute(&self, frame: SweepFrame) -> SweepResult<SweepFrame> {
        let spectrum = frame.into_spectrum();
        let (freq, inten) = differentiate(spectrum.freq.view(), spectrum.inten.view())?;
        self.logger
            .stage(self.name(), &format!("{} points", inten.len()));
        SweepFrame::from_waveform(freq, inten)
    }
}
