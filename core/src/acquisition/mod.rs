pub mod center;
pub mod layout;

pub use center::CenterFrequency;
pub use layout::{LoTrace, ParameterResolver, SweepLayout};
