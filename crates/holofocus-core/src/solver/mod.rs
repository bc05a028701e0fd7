//! Axial propagation abstraction and implementations.
//!
//! The [`AxialPropagator`] trait defines the interface every refocusing method
//! implements: take a background-normalised hologram, a set of depths and a
//! transverse point, and return the complex field along that axial line. The
//! Rayleigh–Sommerfeld angular-spectrum method
//! ([`rayleigh_sommerfeld::RayleighSommerfeld`]) is the implementation.

pub mod rayleigh_sommerfeld;

use holofocus_compute::ComputeError;
use thiserror::Error;

use crate::precision::Real;
use crate::types::AxialProfile;
use crate::validate::{AxialInputs, InvalidArgument};

/// Errors that can occur during a propagation call.
#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    #[error("Hologram shape {found:?} does not match plan shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Compute backend error: {0}")]
    ComputeError(#[from] ComputeError),
}

/// The trait every axial refocusing method implements.
pub trait AxialPropagator {
    /// Validate `inputs` and compute the field along the axial line through
    /// the requested centre, one value per depth, in depth order.
    fn propagate<T: Real>(
        &self,
        inputs: AxialInputs<'_, T>,
    ) -> Result<AxialProfile<T>, PropagationError>;

    /// Human-readable name of the propagation method.
    fn method_name(&self) -> &str;
}
