//! Floating-point precision support.
//!
//! The propagation pipeline is generic over the real scalar type so that the
//! underflow guard follows the precision actually in use. [`Real`] is
//! implemented for `f32` and `f64`.

use num_complex::Complex;
use num_traits::Float;
use rustfft::FftNum;

/// A real scalar the pipeline can run in.
pub trait Real: FftNum + Float {
    /// Human-readable type name, used in log output.
    const NAME: &'static str;

    /// Convert an `f64` constant into this precision (rounding if needed).
    fn cast(value: f64) -> Self;

    /// Widen to `f64` for reporting.
    fn as_f64(self) -> f64;
}

impl Real for f64 {
    const NAME: &'static str = "f64";

    fn cast(value: f64) -> Self {
        value
    }

    fn as_f64(self) -> f64 {
        self
    }
}

impl Real for f32 {
    const NAME: &'static str = "f32";

    fn cast(value: f64) -> Self {
        value as f32
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

/// Largest decay exponent `γ|z|` for which `exp(−γ|z|)` still carries
/// information at precision `T`: $|\ln \varepsilon_T|$.
///
/// About 36.04 for `f64` and 15.94 for `f32`.
pub fn stability_cutoff<T: Real>() -> T {
    Float::abs(T::epsilon().ln())
}

/// Principal-branch square root of a real number, taken in the complex plane.
///
/// Negative inputs map onto the positive imaginary axis (`√−4 = 2i`), so
/// evanescent modes get a decay rate instead of a NaN.
pub fn complex_sqrt<T: Real>(x: T) -> Complex<T> {
    Complex::new(x, T::zero()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cutoff_tracks_precision() {
        assert_abs_diff_eq!(stability_cutoff::<f64>(), 36.043_653_389_117_15, epsilon = 1e-12);
        assert_abs_diff_eq!(stability_cutoff::<f32>(), 15.942_385, epsilon = 1e-5);
    }

    #[test]
    fn test_complex_sqrt_positive() {
        let r = complex_sqrt(0.25_f64);
        assert_eq!(r.re, 0.5);
        assert_eq!(r.im, 0.0);
    }

    #[test]
    fn test_complex_sqrt_negative_is_upper_half_plane() {
        let r = complex_sqrt(-4.0_f64);
        assert_abs_diff_eq!(r.re, 0.0);
        assert_abs_diff_eq!(r.im, 2.0, epsilon = 1e-15);

        let r = complex_sqrt(-1.0_f32);
        assert!(r.im > 0.0);
        assert!(!r.re.is_nan() && !r.im.is_nan());
    }

    #[test]
    fn test_complex_sqrt_zero() {
        let r = complex_sqrt(0.0_f64);
        assert_eq!(r.re, 0.0);
        assert_eq!(r.im, 0.0);
    }
}
