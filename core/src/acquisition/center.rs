use serde::{Deserialize, Serialize};

/// Center frequency of a single band, or the ordered centers of several bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CenterFrequency {
    Single(f64),
    Bands(Vec<f64>),
}

impl Default for CenterFrequency {
    fn default() -> Self {
        CenterFrequency::Single(0.0)
    }
}

impl CenterFrequency {
    pub fn band_count(&self) -> usize {
        match self {
            CenterFrequency::Single(_) => 1,
            CenterFrequency::Bands(centers) => centers.len(),
        }
    }

    pub fn centers(&self) -> Vec<f64> {
        match self {
            CenterFrequency::Single(center) => vec![*center],
            CenterFrequency::Bands(centers) => centers.clone(),
        }
    }

    /// Band spacing implied by a list of evenly spaced centers.
    pub fn spacing(&self) -> Option<f64> {
        match self {
            CenterFrequency::Bands(centers) if centers.len() >= 2 => {
                Some((centers[1] - centers[0]).abs())
            }
            _ => None,
        }
    }
}

impl From<f64> for CenterFrequency {
    fn from(center: f64) -> Self {
        CenterFrequency::Single(center)
    }
}

impl From<Vec<f64>> for CenterFrequency {
    fn from(centers: Vec<f64>) -> Self {
        CenterFrequency::Bands(centers)
    }
}
