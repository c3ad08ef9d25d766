pub mod fft;
pub mod matrix;
pub mod poly;
pub mod spline;
pub mod stats;

pub use fft::FftHelper;
pub use matrix::MatrixHelper;
pub use poly::Polynomial;
pub use spline::PenalizedSpline;
pub use stats::StatsHelper;
