//! Input validation.
//!
//! Every precondition of a propagation call is checked here, before any
//! numeric work starts. A failed check produces an [`InvalidArgument`] naming
//! the offending argument; no partial output is ever produced.

use std::fmt;

use ndarray::{ArrayView, ArrayView2, ArrayViewD, Dimension, Ix2};
use thiserror::Error;

use crate::precision::Real;
use crate::types::Depths;

/// The arguments of a propagation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Hologram,
    Depths,
    Center,
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hologram => "hologram",
            Self::Depths => "depths",
            Self::Center => "center",
        })
    }
}

/// A violated precondition on the inputs of a propagation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidArgument {
    #[error("Missing required argument: {0}")]
    Missing(Argument),

    #[error("Argument {argument} is not numeric: element {index} is NaN")]
    NotNumeric { argument: Argument, index: usize },

    #[error("Argument {argument} must be finite: element {index} is infinite")]
    NonFinite { argument: Argument, index: usize },

    #[error("Argument {argument} must be 2-dimensional, got {rank} dimension(s)")]
    Rank { argument: Argument, rank: usize },

    #[error("Argument {argument} must have exactly {expected} elements, got {found}")]
    Count {
        argument: Argument,
        expected: usize,
        found: usize,
    },

    #[error("Argument {argument} must not be empty")]
    Empty { argument: Argument },

    #[error("Optical parameter {name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

impl InvalidArgument {
    /// The call argument this error refers to, if any.
    pub fn argument(&self) -> Option<Argument> {
        match self {
            Self::Missing(argument)
            | Self::NotNumeric { argument, .. }
            | Self::NonFinite { argument, .. }
            | Self::Rank { argument, .. }
            | Self::Count { argument, .. }
            | Self::Empty { argument } => Some(*argument),
            Self::NonPositive { .. } => None,
        }
    }
}

/// Unchecked inputs of a propagation call.
///
/// Arguments are attached one at a time; [`AxialInputs::validate`] reports
/// any that were never supplied.
#[derive(Debug, Clone)]
pub struct AxialInputs<'a, T> {
    hologram: Option<ArrayViewD<'a, T>>,
    depths: Option<Depths<T>>,
    center: Option<&'a [T]>,
}

impl<'a, T> Default for AxialInputs<'a, T> {
    fn default() -> Self {
        Self {
            hologram: None,
            depths: None,
            center: None,
        }
    }
}

impl<'a, T: Real> AxialInputs<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the hologram. Any rank is accepted here; rank is checked on
    /// validation.
    pub fn hologram<D: Dimension>(mut self, hologram: ArrayView<'a, T, D>) -> Self {
        self.hologram = Some(hologram.into_dyn());
        self
    }

    pub fn depths(mut self, depths: impl Into<Depths<T>>) -> Self {
        self.depths = Some(depths.into());
        self
    }

    pub fn center(mut self, center: &'a [T]) -> Self {
        self.center = Some(center);
        self
    }

    /// Check every precondition, in argument order.
    pub fn validate(self) -> Result<ValidatedInputs<'a, T>, InvalidArgument> {
        let hologram = self.hologram.ok_or(InvalidArgument::Missing(Argument::Hologram))?;
        let depths = self.depths.ok_or(InvalidArgument::Missing(Argument::Depths))?;
        let center = self.center.ok_or(InvalidArgument::Missing(Argument::Center))?;

        let hologram = check_hologram(hologram)?;
        check_depths(depths.as_slice())?;
        let center = check_center(center)?;

        Ok(ValidatedInputs {
            hologram,
            depths,
            center,
        })
    }
}

/// Inputs that passed every check.
#[derive(Debug, Clone)]
pub struct ValidatedInputs<'a, T> {
    pub hologram: ArrayView2<'a, T>,
    pub depths: Depths<T>,
    pub center: [T; 2],
}

/// Hologram must be a non-empty 2D array of finite numbers.
pub fn check_hologram<T: Real>(
    hologram: ArrayViewD<'_, T>,
) -> Result<ArrayView2<'_, T>, InvalidArgument> {
    let rank = hologram.ndim();
    if rank != 2 {
        return Err(InvalidArgument::Rank {
            argument: Argument::Hologram,
            rank,
        });
    }
    if hologram.is_empty() {
        return Err(InvalidArgument::Empty {
            argument: Argument::Hologram,
        });
    }
    check_values(hologram.iter(), Argument::Hologram, false)?;
    hologram
        .into_dimensionality::<Ix2>()
        .map_err(|_| InvalidArgument::Rank {
            argument: Argument::Hologram,
            rank,
        })
}

/// Depths must contain at least one number. Infinite depths are allowed.
pub fn check_depths<T: Real>(depths: &[T]) -> Result<(), InvalidArgument> {
    if depths.is_empty() {
        return Err(InvalidArgument::Empty {
            argument: Argument::Depths,
        });
    }
    check_values(depths.iter(), Argument::Depths, true)
}

/// Center must be exactly two finite numbers, `(x, y)`.
pub fn check_center<T: Real>(center: &[T]) -> Result<[T; 2], InvalidArgument> {
    match *center {
        [x, y] => {
            check_values(center.iter(), Argument::Center, false)?;
            Ok([x, y])
        }
        _ => Err(InvalidArgument::Count {
            argument: Argument::Center,
            expected: 2,
            found: center.len(),
        }),
    }
}

fn check_values<'v, T: Real + 'v>(
    values: impl Iterator<Item = &'v T>,
    argument: Argument,
    allow_infinite: bool,
) -> Result<(), InvalidArgument> {
    for (index, v) in values.enumerate() {
        if v.is_nan() {
            return Err(InvalidArgument::NotNumeric { argument, index });
        }
        if !allow_infinite && v.is_infinite() {
            return Err(InvalidArgument::NonFinite { argument, index });
        }
    }
    Ok(())
}
