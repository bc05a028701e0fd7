//! Core types shared across the Holofocus workspace.
//!
//! This module defines the data passed into and out of the propagation
//! pipeline: depth sets, optical parameters, and the axial profile result.

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::precision::Real;
use crate::validate::InvalidArgument;

/// Default wavelength in the medium (µm). Apparatus calibration, not physics.
pub const DEFAULT_WAVELENGTH: f64 = 0.632;

/// Default pixel pitch (µm per pixel). Apparatus calibration, not physics.
pub const DEFAULT_PIXEL_PITCH: f64 = 0.135;

/// Axial displacements (pixels) at which the field is evaluated.
///
/// Order is significant: output index `i` always corresponds to depth `i`.
#[derive(Debug, Clone, PartialEq)]
pub enum Depths<T> {
    Single(T),
    Sequence(Vec<T>),
}

impl<T> Depths<T> {
    /// View the depths as a slice, whichever form they were given in.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Single(z) => std::slice::from_ref(z),
            Self::Sequence(zs) => zs,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Single(z) => vec![z],
            Self::Sequence(zs) => zs,
        }
    }
}

impl From<f64> for Depths<f64> {
    fn from(z: f64) -> Self {
        Self::Single(z)
    }
}

impl From<f32> for Depths<f32> {
    fn from(z: f32) -> Self {
        Self::Single(z)
    }
}

impl<T> From<Vec<T>> for Depths<T> {
    fn from(zs: Vec<T>) -> Self {
        Self::Sequence(zs)
    }
}

impl<T: Clone> From<&[T]> for Depths<T> {
    fn from(zs: &[T]) -> Self {
        Self::Sequence(zs.to_vec())
    }
}

impl<T, const N: usize> From<[T; N]> for Depths<T> {
    fn from(zs: [T; N]) -> Self {
        Self::Sequence(zs.into())
    }
}

/// Optional optical settings as supplied by a caller or a config file.
///
/// Missing or non-finite entries fall back to [`DEFAULT_WAVELENGTH`] and
/// [`DEFAULT_PIXEL_PITCH`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpticalOptions {
    /// Wavelength of light in the medium (same length unit as `pixel_pitch`).
    #[serde(default)]
    pub wavelength: Option<f64>,
    /// Physical size of one pixel.
    #[serde(default)]
    pub pixel_pitch: Option<f64>,
}

impl OpticalOptions {
    pub fn new(wavelength: f64, pixel_pitch: f64) -> Self {
        Self {
            wavelength: Some(wavelength),
            pixel_pitch: Some(pixel_pitch),
        }
    }

    /// Apply defaults and check the resulting parameters.
    pub fn resolve(&self) -> Result<OpticalParams, InvalidArgument> {
        let pick = |value: Option<f64>, default: f64| match value {
            Some(v) if v.is_finite() => v,
            _ => default,
        };
        let params = OpticalParams {
            wavelength: pick(self.wavelength, DEFAULT_WAVELENGTH),
            pixel_pitch: pick(self.pixel_pitch, DEFAULT_PIXEL_PITCH),
        };
        params.check()?;
        Ok(params)
    }
}

/// Resolved optical parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalParams {
    pub wavelength: f64,
    pub pixel_pitch: f64,
}

impl Default for OpticalParams {
    fn default() -> Self {
        Self {
            wavelength: DEFAULT_WAVELENGTH,
            pixel_pitch: DEFAULT_PIXEL_PITCH,
        }
    }
}

impl OpticalParams {
    /// Wavenumber in the medium, in radians per pixel:
    /// $k = 2\pi \, a / \lambda$ for pixel pitch $a$.
    pub fn wavenumber(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.pixel_pitch / self.wavelength
    }

    pub(crate) fn check(&self) -> Result<(), InvalidArgument> {
        if !(self.wavelength > 0.0) {
            return Err(InvalidArgument::NonPositive {
                name: "wavelength",
                value: self.wavelength,
            });
        }
        if !(self.pixel_pitch > 0.0) {
            return Err(InvalidArgument::NonPositive {
                name: "pixel_pitch",
                value: self.pixel_pitch,
            });
        }
        Ok(())
    }
}

/// Back-propagated field along the axial line through one transverse point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxialProfile<T> {
    /// Transverse point (pixels) the line passes through.
    pub center: [T; 2],
    /// Axial displacements (pixels), in the caller's order.
    pub depths: Vec<T>,
    /// Complex scattered field, one value per depth.
    pub field: Vec<Complex<T>>,
}

impl<T: Real> AxialProfile<T> {
    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    /// Scattered intensity $|E|^2$ at each depth.
    pub fn intensity(&self) -> Vec<T> {
        self.field.iter().map(|e| e.norm_sqr()).collect()
    }

    /// Depth and field value with the largest field magnitude.
    ///
    /// The first of several equal maxima wins. `None` for an empty profile.
    pub fn peak(&self) -> Option<(T, Complex<T>)> {
        let mut best: Option<(usize, T)> = None;
        for (i, e) in self.field.iter().enumerate() {
            let mag = e.norm_sqr();
            match best {
                Some((_, m)) if !(mag > m) => {}
                _ => best = Some((i, mag)),
            }
        }
        best.map(|(i, _)| (self.depths[i], self.field[i]))
    }
}
