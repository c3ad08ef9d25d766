pub mod loader;
pub mod writer;

pub use loader::{load_matrix, load_vector, parse_center};
pub use writer::write_spectrum;
