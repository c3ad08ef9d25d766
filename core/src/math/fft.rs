use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Helper that wraps a forward/inverse `rustfft` plan pair of one size.
pub struct FftHelper {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        Self {
            forward,
            inverse,
            size,
        }
    }

    /// Plans a helper large enough for a linear convolution of the two lengths.
    pub fn for_convolution(signal_len: usize, kernel_len: usize) -> Self {
        let needed = (signal_len + kernel_len).saturating_sub(1).max(1);
        Self::new(needed.next_power_of_two())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .map(|&value| Complex64::new(value, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::zero());
        self.forward.process(&mut buffer);
        buffer
    }

    /// Valid-mode linear convolution (`len(signal) - len(kernel) + 1` samples).
    ///
    /// Returns an empty vector when the kernel is longer than the signal or
    /// the helper is too small for the pair.
    pub fn convolve_valid(&self, signal: &[f64], kernel: &[f64]) -> Vec<f64> {
        if kernel.is_empty() || kernel.len() > signal.len() {
            return Vec::new();
        }
        if signal.len() + kernel.len() - 1 > self.size {
            return Vec::new();
        }

        let lhs = self.forward(signal);
        let rhs = self.forward(kernel);
        let mut product: Vec<Complex64> = lhs.iter().zip(rhs.iter()).map(|(a, b)| a * b).collect();
        self.inverse.process(&mut product);

        let scale = 1.0 / self.size as f64;
        product[kernel.len() - 1..signal.len()]
            .iter()
            .map(|c| c.re * scale)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_helper_pads_to_size() {
        let helper = FftHelper::new(8);
        let output = helper.forward(&[1.0, 0.0, -1.0, 0.0]);
        assert_eq!(output.len(), 8);
    }

    #[test]
    fn convolve_valid_matches_direct_sum() {
        let signal: Vec<f64> = (0..20).map(|i| (i as f64 * 0.3).sin()).collect();
        let kernel = [0.25, 0.5, 0.25];
        let helper = FftHelper::for_convolution(signal.len(), kernel.len());
        let fast = helper.convolve_valid(&signal, &kernel);

        assert_eq!(fast.len(), signal.len() - kernel.len() + 1);
        for (i, value) in fast.iter().enumerate() {
            // kernel is symmetric, so correlation and convolution agree
            let direct: f64 = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * signal[i + k])
                .sum();
            assert!((value - direct).abs() < 1e-10);
        }
    }

    #[test]
    fn convolve_valid_rejects_long_kernel() {
        let helper = FftHelper::new(16);
        assert!(helper.convolve_valid(&[1.0, 2.0], &[1.0, 1.0, 1.0]).is_empty());
    }
}
