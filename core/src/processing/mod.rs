pub mod baseline;
pub mod delay;
pub mod derivative;
pub mod extract;
pub mod frequency;
pub mod pipeline;
pub mod smooth;
pub mod stitch;

pub use baseline::{
    debaseline_per_sweep, debaseline_wideband, PerSweepBaselineStage, WidebandBaselineStage,
};
pub use delay::apply_delay;
pub use derivative::{differentiate, DerivativeStage};
pub use extract::extract_or_average;
pub use frequency::reconstruct_frequency;
pub use pipeline::{PipelineOutput, RunReport, SweepPipeline};
pub use smooth::{box_win, boxcar, BoxcarStage};
pub use stitch::{stitch, StitchStage};
