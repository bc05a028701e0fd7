//! # Holofocus Core
//!
//! Back-propagation of in-line holograms onto an axial line. Given a
//! background-normalised hologram (uniform background = 1), a transverse point
//! and a list of depths, this crate computes the complex scattered field at
//! each depth using the Rayleigh–Sommerfeld propagator in the angular-spectrum
//! domain, without reconstructing whole planes.
//!
//! ## Architecture
//!
//! Propagation methods implement the [`solver::AxialPropagator`] trait. The
//! implementation is [`solver::rayleigh_sommerfeld::RayleighSommerfeld`],
//! which runs per-depth reductions on a
//! [`ComputeBackend`](holofocus_compute::ComputeBackend).
//!
//! ## Modules
//!
//! - [`types`]: Depth sets, optics and the axial profile result.
//! - [`validate`]: Argument checks and the [`InvalidArgument`] error.
//! - [`precision`]: The [`Real`] scalar trait and the underflow cutoff.
//! - [`solver`]: Propagator trait and the Rayleigh–Sommerfeld implementation.
//!
//! ## Example
//!
//! ```
//! use holofocus_core::{compute, OpticalOptions};
//! use ndarray::Array2;
//!
//! let mut holo = Array2::<f64>::ones((8, 8));
//! holo[[4, 4]] = 1.2;
//! let field = compute(holo.view(), vec![0.0, 5.0, -5.0], &[4.0, 4.0], &OpticalOptions::default())
//!     .unwrap();
//! assert_eq!(field.len(), 3);
//! assert!((field[0].re - 0.2).abs() < 1e-12);
//! ```

pub mod precision;
pub mod solver;
pub mod types;
pub mod validate;

use ndarray::{ArrayView, Dimension};
use num_complex::Complex;

pub use precision::Real;
pub use solver::rayleigh_sommerfeld::{AxialPlan, DefaultBackend, RayleighSommerfeld};
pub use solver::{AxialPropagator, PropagationError};
pub use types::{AxialProfile, Depths, OpticalOptions, OpticalParams};
pub use validate::{Argument, AxialInputs, InvalidArgument};

/// Back-propagate `hologram` to every depth on the axial line through
/// `center`, using the default compute backend.
///
/// `hologram` may have any rank; anything but a non-empty 2D array is
/// rejected. `center` must hold exactly `(x, y)` in pixels, and `depths` is
/// a single value or a non-empty sequence (pixels). The result has one entry
/// per depth, in the same order.
pub fn compute<'a, T: Real, D: Dimension>(
    hologram: ArrayView<'a, T, D>,
    depths: impl Into<Depths<T>>,
    center: &'a [T],
    options: &OpticalOptions,
) -> Result<Vec<Complex<T>>, PropagationError> {
    let solver = RayleighSommerfeld::<DefaultBackend>::default().with_options(*options);
    let inputs = AxialInputs::new()
        .hologram(hologram)
        .depths(depths)
        .center(center);
    Ok(solver.propagate(inputs)?.field)
}
