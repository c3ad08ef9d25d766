//! Reconstruction core for pulsed linear-sweep spectroscopy.
//!
//! Raw detector samples from repeated back-and-forth sweeps are turned into a
//! single, continuous, frequency-sorted spectrum: frequency axis synthesis,
//! signal/background extraction, detector delay correction, baseline removal,
//! stitching of interleaved bands, boxcar smoothing and differentiation.

pub mod acquisition;
pub mod config;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use acquisition::{CenterFrequency, LoTrace, ParameterResolver, SweepLayout};
pub use config::{BaselineMode, ProcessingConfig, SplineOptions};
pub use prelude::{ErrorKind, ProcessingStage, Spectrum, SweepError, SweepFrame, SweepResult};
pub use processing::{PipelineOutput, RunReport, SweepPipeline};
