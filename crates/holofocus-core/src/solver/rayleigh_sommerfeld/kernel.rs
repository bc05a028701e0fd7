//! Depth-independent part of the Rayleigh–Sommerfeld propagator.
//!
//! In the angular-spectrum representation a mode with normalised squared
//! frequency $q^2$ picks up, over an axial distance $z$, the factor
//!
//! $$ H(q, z) = \exp\bigl(i\,\kappa(q)\,z - \gamma(q)\,|z|\bigr), \qquad
//!    \kappa + i\gamma = k\sqrt{1 - q^2} - k. $$
//!
//! Propagating modes ($q^2 \le 1$) have $\gamma = 0$ and only rotate in phase;
//! evanescent modes ($q^2 > 1$) have $\kappa = -k$ and decay at rate $\gamma$.
//! The constant $-k$ removes the carrier phase of the illumination.

use ndarray::Array2;

use super::grid::FrequencyGrid;
use crate::precision::{complex_sqrt, stability_cutoff, Real};

/// Per-mode propagation and decay rates, plus the underflow cutoff.
#[derive(Debug, Clone)]
pub struct PropagatorKernel<T> {
    /// $\kappa$: phase advance per pixel of depth (radians per pixel).
    pub propagation_rate: Array2<T>,
    /// $\gamma \ge 0$: amplitude decay per pixel of depth.
    pub decay_rate: Array2<T>,
    /// Modes with $\gamma|z|$ at or above this value contribute exactly zero.
    pub limit: T,
}

impl<T: Real> PropagatorKernel<T> {
    pub fn from_grid(grid: &FrequencyGrid<T>) -> Self {
        let k = grid.k;
        let qfac = grid
            .qsq()
            .mapv(|q| complex_sqrt(T::one() - q) * k - k);

        Self {
            propagation_rate: qfac.mapv(|c| c.re),
            decay_rate: qfac.mapv(|c| c.im),
            limit: stability_cutoff::<T>(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.propagation_rate.dim()
    }

    /// Number of evanescent modes (non-zero decay).
    pub fn evanescent_modes(&self) -> usize {
        self.decay_rate.iter().filter(|&&g| g > T::zero()).count()
    }
}
