//! Centred angular-frequency grid.
//!
//! For an axis of length $N$ the angular frequencies are
//!
//! $$ q_i = \frac{2\pi}{N}\left(i - \lfloor N/2 \rfloor\right), \quad i = 0 \ldots N-1, $$
//!
//! running from $-\pi$ to just below $\pi$. Index $\lfloor N/2 \rfloor$ holds
//! the zero frequency, which is exactly where [`super::spectrum::fftshift`]
//! moves the DC term of the forward transform.

use ndarray::{Array1, Array2};

use crate::precision::Real;

/// Frequency axes for a hologram of shape `(nx, ny)` and wavenumber `k`.
#[derive(Debug, Clone)]
pub struct FrequencyGrid<T> {
    /// Angular frequencies along axis 0 (radians per pixel).
    pub qx: Array1<T>,
    /// Angular frequencies along axis 1 (radians per pixel).
    pub qy: Array1<T>,
    /// Wavenumber in the medium (radians per pixel).
    pub k: T,
}

/// Centred angular-frequency axis of length `n`.
pub fn centered_axis<T: Real>(n: usize) -> Array1<T> {
    let half = (n / 2) as f64;
    let step = 2.0 * std::f64::consts::PI / n as f64;
    Array1::from_shape_fn(n, |i| T::cast(step * (i as f64 - half)))
}

impl<T: Real> FrequencyGrid<T> {
    pub fn new(shape: (usize, usize), k: T) -> Self {
        Self {
            qx: centered_axis(shape.0),
            qy: centered_axis(shape.1),
            k,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.qx.len(), self.qy.len())
    }

    /// Squared frequency normalised by the wavenumber,
    /// `qsq[i, j] = (qx[i]/k)² + (qy[j]/k)²`.
    ///
    /// Modes with `qsq > 1` are evanescent.
    pub fn qsq(&self) -> Array2<T> {
        let k = self.k;
        let sx = self.qx.mapv(|q| (q / k) * (q / k));
        let sy = self.qy.mapv(|q| (q / k) * (q / k));
        Array2::from_shape_fn(self.shape(), |(i, j)| sx[i] + sy[j])
    }

    /// Phase ramp `qrc[i, j] = x·qx[i] + y·qy[j]` that moves the evaluation
    /// point of the inverse transform from the array origin to `center`.
    pub fn qrc(&self, center: [T; 2]) -> Array2<T> {
        let [x, y] = center;
        let rx = self.qx.mapv(|q| x * q);
        let ry = self.qy.mapv(|q| y * q);
        Array2::from_shape_fn(self.shape(), |(i, j)| rx[i] + ry[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_even_axis_spans_minus_pi_to_below_pi() {
        let q: Array1<f64> = centered_axis(8);
        assert_eq!(q.len(), 8);
        assert_eq!(q[0], -PI);
        assert_eq!(q[4], 0.0);
        assert_abs_diff_eq!(q[7], 3.0 * PI / 4.0, epsilon = 1e-15);
        for i in 1..8 {
            assert_abs_diff_eq!(q[i] - q[i - 1], PI / 4.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_odd_axis_is_symmetric() {
        let q: Array1<f64> = centered_axis(5);
        assert_eq!(q[2], 0.0);
        assert_abs_diff_eq!(q[0], -4.0 * PI / 5.0, epsilon = 1e-15);
        assert_abs_diff_eq!(q[0], -q[4], epsilon = 1e-15);
    }

    #[test]
    fn test_qsq_is_outer_sum() {
        let k = 0.5;
        let grid = FrequencyGrid::<f64>::new((4, 6), k);
        let qsq = grid.qsq();
        assert_eq!(qsq.dim(), (4, 6));
        for i in 0..4 {
            for j in 0..6 {
                let expected = (grid.qx[i] / k).powi(2) + (grid.qy[j] / k).powi(2);
                assert_abs_diff_eq!(qsq[[i, j]], expected, epsilon = 1e-12);
            }
        }
        // DC mode sits at the centre index of each axis
        assert_eq!(qsq[[2, 3]], 0.0);
    }

    #[test]
    fn test_qrc_is_outer_sum() {
        let grid = FrequencyGrid::<f64>::new((3, 4), 1.0);
        let qrc = grid.qrc([2.0, -1.5]);
        for i in 0..3 {
            for j in 0..4 {
                let expected = 2.0 * grid.qx[i] - 1.5 * grid.qy[j];
                assert_abs_diff_eq!(qrc[[i, j]], expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_qrc_vanishes_at_origin() {
        let grid = FrequencyGrid::<f32>::new((5, 5), 1.2);
        assert!(grid.qrc([0.0, 0.0]).iter().all(|&v| v == 0.0));
    }
}
