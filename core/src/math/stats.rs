use ndarray::{Array1, ArrayView1};

pub struct StatsHelper;

impl StatsHelper {
    pub fn median(samples: ArrayView1<f64>) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Min/max rescale onto `[0, 1]`. Flat input has no range and yields `None`.
    pub fn rescale_unit(samples: ArrayView1<f64>) -> Option<Array1<f64>> {
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        if !range.is_finite() || range <= 0.0 {
            return None;
        }
        Some(samples.mapv(|v| (v - min) / range))
    }

    /// Evenly spaced abscissa `i / (n - 1)` over `[0, 1]`.
    pub fn unit_abscissa(len: usize) -> Array1<f64> {
        if len < 2 {
            return Array1::zeros(len);
        }
        Array1::linspace(0.0, 1.0, len)
    }

    pub fn rms(samples: ArrayView1<f64>) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        (samples.dot(&samples) / samples.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn median_handles_even_and_odd_lengths() {
        assert_eq!(StatsHelper::median(array![3.0, 1.0, 2.0].view()), Some(2.0));
        assert_eq!(
            StatsHelper::median(array![4.0, 1.0, 3.0, 2.0].view()),
            Some(2.5)
        );
        assert_eq!(StatsHelper::median(Array1::<f64>::zeros(0).view()), None);
    }

    #[test]
    fn rescale_maps_extremes_to_unit_interval() {
        let scaled = StatsHelper::rescale_unit(array![2.0, 4.0, 6.0].view()).unwrap();
        assert_eq!(scaled, array![0.0, 0.5, 1.0]);
        assert!(StatsHelper::rescale_unit(array![5.0, 5.0].view()).is_none());
    }

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(Array1::<f64>::zeros(0).view()), 0.0);
        assert_eq!(StatsHelper::rms(array![0.0, 0.0].view()), 0.0);
        assert_eq!(StatsHelper::rms(array![4.0].view()), 4.0);
    }
}
