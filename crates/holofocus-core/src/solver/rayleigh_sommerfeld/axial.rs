//! Per-depth evaluation of the back-propagated field at a single point.
//!
//! The field at depth $z$ on the axial line through $\mathbf{r}_c$ is
//!
//! $$ E(z) = \sum_{\mathbf{q}} b(\mathbf{q})\, e^{i\mathbf{q}\cdot\mathbf{r}_c}\,
//!    H(\mathbf{q}, z), $$
//!
//! i.e. the inverse transform of the propagated spectrum sampled at one point,
//! which avoids reconstructing the whole plane. Modes whose decay exponent
//! $\gamma|z|$ reaches the stability cutoff contribute exactly zero and their
//! exponential is never evaluated.

use holofocus_compute::{ComputeBackend, ComputeError};
use num_complex::Complex;
use num_traits::Float;

use super::kernel::PropagatorKernel;
use super::spectrum::PhaseCenteredSpectrum;
use crate::precision::Real;

/// Propagator $\exp(i\kappa z - \gamma|z|)$ for one mode at depth `z`.
///
/// `None` when $\gamma|z| \ge$ `limit`, or when $\gamma|z|$ is NaN: the mode is
/// masked out and contributes exactly zero.
fn masked_propagator<T: Real>(
    propagation_rate: T,
    decay_rate: T,
    z: T,
    limit: T,
) -> Option<Complex<T>> {
    let gz = decay_rate * Float::abs(z);
    if gz < limit {
        Some(Complex::new(-gz, propagation_rate * z).exp())
    } else {
        None
    }
}

/// Evaluates the axial field from a phase-centred spectrum and a kernel of
/// the same shape. Both are shared read-only across depths.
#[derive(Debug, Clone, Copy)]
pub struct AxialEvaluator<'a, T> {
    spectrum: &'a PhaseCenteredSpectrum<T>,
    kernel: &'a PropagatorKernel<T>,
}

impl<'a, T: Real> AxialEvaluator<'a, T> {
    /// # Panics
    /// Panics if the spectrum and kernel shapes differ.
    pub fn new(
        spectrum: &'a PhaseCenteredSpectrum<T>,
        kernel: &'a PropagatorKernel<T>,
    ) -> Self {
        assert_eq!(
            spectrum.shape(),
            kernel.shape(),
            "Spectrum and kernel must share a frequency grid"
        );
        Self { spectrum, kernel }
    }

    /// Field at a single depth.
    pub fn field_at(&self, z: T) -> Complex<T> {
        let limit = self.kernel.limit;
        self.spectrum
            .values()
            .iter()
            .zip(self.kernel.propagation_rate.iter())
            .zip(self.kernel.decay_rate.iter())
            .fold(Complex::new(T::zero(), T::zero()), |acc, ((&b, &kappa), &gamma)| {
                match masked_propagator(kappa, gamma, z, limit) {
                    Some(h) => acc + b * h,
                    None => acc,
                }
            })
    }

    /// Field at every depth, in input order.
    ///
    /// Depths are independent, so the backend may evaluate them concurrently;
    /// slot `i` of the result always holds depth `i`.
    pub fn evaluate<B: ComputeBackend>(
        &self,
        depths: &[T],
        backend: &B,
    ) -> Result<Vec<Complex<T>>, ComputeError> {
        backend.parallel_map(depths.len(), |i| {
            let field = self.field_at(depths[i]);
            log::trace!(
                "z = {:.4}: E = {:.6e}{:+.6e}i",
                depths[i].as_f64(),
                field.re.as_f64(),
                field.im.as_f64()
            );
            field
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::stability_cutoff;
    use approx::assert_abs_diff_eq;
    use holofocus_compute::SerialBackend;
    use ndarray::array;

    fn mode_propagator<T: Real + Default>(kappa: T, gamma: T, z: T, limit: T) -> Complex<T> {
        masked_propagator(kappa, gamma, z, limit).unwrap_or_default()
    }

    #[test]
    fn test_pure_phase_for_propagating_mode() {
        let h = mode_propagator(-0.3_f64, 0.0, 2.0, 36.0);
        assert_abs_diff_eq!(h.norm(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(h.arg(), -0.6, epsilon = 1e-15);
    }

    #[test]
    fn test_decay_is_symmetric_in_depth() {
        let up = mode_propagator(-1.0_f64, 0.2, 5.0, 36.0);
        let down = mode_propagator(-1.0_f64, 0.2, -5.0, 36.0);
        assert_abs_diff_eq!(up.norm(), (-1.0_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(down.norm(), up.norm(), epsilon = 1e-15);
        // phase flips with the sign of z
        assert_abs_diff_eq!(up.arg(), -down.arg(), epsilon = 1e-15);
    }

    #[test]
    fn test_underflow_mask_boundary() {
        let limit = stability_cutoff::<f64>();
        let z = 10.0;
        let below = limit * (1.0 - 1e-9) / z;
        let above = limit * (1.0 + 1e-9) / z;

        let h = mode_propagator(0.7, below, z, limit);
        assert!(h.norm() > 0.0);
        assert_abs_diff_eq!(h.norm(), (-below * z).exp(), epsilon = 1e-30);

        let h = mode_propagator(0.7, above, z, limit);
        assert_eq!(h, Complex::new(0.0, 0.0));

        // exactly at the cutoff is masked
        let h = mode_propagator(0.7, 1.0, limit, limit);
        assert_eq!(h, Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_mask_swallows_non_finite() {
        let limit = stability_cutoff::<f32>();
        let h = mode_propagator(f32::INFINITY, f32::INFINITY, 1.0, limit);
        assert_eq!(h, Complex::new(0.0, 0.0));

        // 0 · ∞ is NaN, which must not pass the mask either
        let h = mode_propagator(1.0_f32, 0.0, f32::INFINITY, limit);
        assert_eq!(h, Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_masked_mode_never_reaches_sum() {
        let spectrum = PhaseCenteredSpectrum::from(array![[
            Complex::new(0.25, -0.5),
            Complex::new(f64::INFINITY, f64::NAN),
        ]]);
        let kernel = PropagatorKernel {
            propagation_rate: array![[0.0, -1.0]],
            decay_rate: array![[0.0, 1.0e6]],
            limit: stability_cutoff::<f64>(),
        };
        let evaluator = AxialEvaluator::new(&spectrum, &kernel);

        let out = evaluator.evaluate(&[1.0, -3.0, 40.0], &SerialBackend).unwrap();
        for e in out {
            assert_eq!(e, Complex::new(0.25, -0.5));
        }
    }

    #[test]
    #[should_panic(expected = "share a frequency grid")]
    fn test_shape_mismatch_panics() {
        let spectrum = PhaseCenteredSpectrum::from(ndarray::Array2::<Complex<f64>>::zeros((2, 2)));
        let kernel = PropagatorKernel {
            propagation_rate: ndarray::Array2::zeros((2, 3)),
            decay_rate: ndarray::Array2::zeros((2, 3)),
            limit: 36.0,
        };
        AxialEvaluator::new(&spectrum, &kernel);
    }
}
