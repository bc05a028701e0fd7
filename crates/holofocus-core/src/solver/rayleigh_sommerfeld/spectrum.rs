//! Forward transform of the hologram and phase centring.
//!
//! The hologram's deviation from a uniform background is transformed with
//!
//! $$ b(\mathbf{q}) = \frac{1}{N_x N_y} \sum_{\mathbf{r}} \bigl(a(\mathbf{r}) - 1\bigr)
//!    e^{-i\mathbf{q}\cdot\mathbf{r}}, $$
//!
//! stored with the zero frequency at the centre of each axis, then multiplied
//! by $e^{i\mathbf{q}\cdot\mathbf{r}_c}$ so that a plain sum over modes is the
//! inverse transform evaluated at $\mathbf{r}_c$.

use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Axis};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::precision::Real;

/// Forward 2D FFT plans for one hologram shape.
pub struct SpectrumTransform<T: Real> {
    fft_x: Arc<dyn Fft<T>>,
    fft_y: Arc<dyn Fft<T>>,
}

impl<T: Real> std::fmt::Debug for SpectrumTransform<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumTransform")
            .field("shape", &self.shape())
            .finish()
    }
}

impl<T: Real> SpectrumTransform<T> {
    pub fn new(shape: (usize, usize)) -> Self {
        let mut planner = FftPlanner::<T>::new();
        Self {
            fft_x: planner.plan_fft_forward(shape.0),
            fft_y: planner.plan_fft_forward(shape.1),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.fft_x.len(), self.fft_y.len())
    }

    /// Centred, normalised transform of `hologram − 1`.
    ///
    /// The caller guarantees `hologram.dim() == self.shape()`.
    pub fn centered_fft(&self, hologram: ArrayView2<'_, T>) -> Array2<Complex<T>> {
        let mut data = hologram.mapv(|v| Complex::new(v - T::one(), T::zero()));

        // Rows are lanes along axis 1, columns are lanes along axis 0.
        transform_lanes(&mut data, Axis(1), self.fft_y.as_ref());
        transform_lanes(&mut data, Axis(0), self.fft_x.as_ref());

        let (nx, ny) = data.dim();
        let norm = T::one() / T::cast((nx * ny) as f64);
        data.mapv_inplace(|c| c * norm);

        fftshift(&data)
    }

    /// Centred transform multiplied by the phase ramp `exp(i·qrc)`.
    pub fn phase_centered(
        &self,
        hologram: ArrayView2<'_, T>,
        qrc: &Array2<T>,
    ) -> PhaseCenteredSpectrum<T> {
        let mut b = self.centered_fft(hologram);
        ndarray::Zip::from(&mut b)
            .and(qrc)
            .for_each(|b, &phase| *b = *b * Complex::new(T::zero(), phase).exp());
        PhaseCenteredSpectrum(b)
    }
}

/// Run a 1D transform over every lane of `data` along `axis`.
fn transform_lanes<T: Real>(data: &mut Array2<Complex<T>>, axis: Axis, fft: &dyn Fft<T>) {
    let zero = Complex::new(T::zero(), T::zero());
    let mut buffer = vec![zero; fft.len()];
    let mut scratch = vec![zero; fft.get_inplace_scratch_len()];

    for mut lane in data.lanes_mut(axis) {
        for (slot, value) in buffer.iter_mut().zip(lane.iter()) {
            *slot = *value;
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for (value, slot) in lane.iter_mut().zip(buffer.iter()) {
            *value = *slot;
        }
    }
}

/// Move the zero-frequency term of each axis from index 0 to index `n / 2`.
pub fn fftshift<V: Copy>(data: &Array2<V>) -> Array2<V> {
    let (nx, ny) = data.dim();
    Array2::from_shape_fn((nx, ny), |(i, j)| {
        data[[(i + nx - nx / 2) % nx, (j + ny - ny / 2) % ny]]
    })
}

/// The background-subtracted, centred, phase-ramped spectrum.
///
/// Computed once per hologram and centre; read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseCenteredSpectrum<T>(Array2<Complex<T>>);

impl<T: Real> PhaseCenteredSpectrum<T> {
    pub fn values(&self) -> &Array2<Complex<T>> {
        &self.0
    }

    pub fn shape(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// Sum over all modes: the field at the centre with no propagation.
    pub fn sum(&self) -> Complex<T> {
        self.0
            .iter()
            .fold(Complex::new(T::zero(), T::zero()), |acc, &b| acc + b)
    }
}

impl<T> From<Array2<Complex<T>>> for PhaseCenteredSpectrum<T> {
    fn from(values: Array2<Complex<T>>) -> Self {
        Self(values)
    }
}
