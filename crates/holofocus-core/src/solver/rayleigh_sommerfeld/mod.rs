//! Rayleigh–Sommerfeld back-propagation in the angular-spectrum domain.
//!
//! The field along the axial line through a transverse point $\mathbf{r}_c$
//! is obtained in four stages:
//!
//! 1. [`validate`](crate::validate): argument checks, before any numeric work.
//! 2. [`grid`]: centred angular-frequency axes $q_x, q_y$ and $q^2/k^2$.
//! 3. [`kernel`]: per-mode propagation rate $\kappa$, decay rate $\gamma$,
//!    and the underflow cutoff.
//! 4. [`spectrum`] + [`axial`]: one forward transform of $a - 1$, phase-centred
//!    on $\mathbf{r}_c$, then one reduction per depth.
//!
//! Stages 2 and 3 depend only on the hologram shape and the optics, so an
//! [`AxialPlan`] can be built once and reused for many holograms and centres.

pub mod axial;
pub mod grid;
pub mod kernel;
pub mod spectrum;

use holofocus_compute::ComputeBackend;
use ndarray::ArrayView2;
use num_complex::Complex;

use self::axial::AxialEvaluator;
use self::grid::FrequencyGrid;
use self::kernel::PropagatorKernel;
use self::spectrum::{PhaseCenteredSpectrum, SpectrumTransform};
use super::{AxialPropagator, PropagationError};
use crate::precision::Real;
use crate::types::{AxialProfile, OpticalOptions, OpticalParams};
use crate::validate::{
    check_center, check_depths, check_hologram, Argument, AxialInputs, InvalidArgument,
};

/// Backend used when none is given explicitly.
#[cfg(feature = "cpu")]
pub type DefaultBackend = holofocus_compute::CpuBackend;

/// Backend used when none is given explicitly.
#[cfg(not(feature = "cpu"))]
pub type DefaultBackend = holofocus_compute::SerialBackend;

/// Depth-independent state for one hologram shape and one set of optics.
#[derive(Debug)]
pub struct AxialPlan<T: Real> {
    params: OpticalParams,
    grid: FrequencyGrid<T>,
    kernel: PropagatorKernel<T>,
    transform: SpectrumTransform<T>,
}

impl<T: Real> AxialPlan<T> {
    /// Build the frequency grid, propagator kernel and FFT plans.
    pub fn new(shape: (usize, usize), params: OpticalParams) -> Result<Self, InvalidArgument> {
        params.check()?;
        if shape.0 == 0 || shape.1 == 0 {
            return Err(InvalidArgument::Empty {
                argument: Argument::Hologram,
            });
        }

        let k = T::cast(params.wavenumber());
        let grid = FrequencyGrid::new(shape, k);
        let kernel = PropagatorKernel::from_grid(&grid);
        let transform = SpectrumTransform::new(shape);

        log::debug!(
            "Rayleigh-Sommerfeld plan: {}x{} modes, k = {:.4} rad/px, \
             {} evanescent, cutoff {:.3} ({})",
            shape.0,
            shape.1,
            k.as_f64(),
            kernel.evanescent_modes(),
            kernel.limit.as_f64(),
            T::NAME
        );

        Ok(Self {
            params,
            grid,
            kernel,
            transform,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    pub fn params(&self) -> &OpticalParams {
        &self.params
    }

    pub fn grid(&self) -> &FrequencyGrid<T> {
        &self.grid
    }

    pub fn kernel(&self) -> &PropagatorKernel<T> {
        &self.kernel
    }

    /// Phase-centred spectrum of `hologram` for evaluation at `center`.
    pub fn spectrum(
        &self,
        hologram: ArrayView2<'_, T>,
        center: [T; 2],
    ) -> Result<PhaseCenteredSpectrum<T>, PropagationError> {
        if hologram.dim() != self.shape() {
            return Err(PropagationError::ShapeMismatch {
                expected: self.shape(),
                found: hologram.dim(),
            });
        }
        let qrc = self.grid.qrc(center);
        Ok(self.transform.phase_centered(hologram, &qrc))
    }

    /// Field along the axial line through `center`, one value per depth.
    pub fn evaluate<B: ComputeBackend>(
        &self,
        hologram: ArrayView2<'_, T>,
        depths: &[T],
        center: [T; 2],
        backend: &B,
    ) -> Result<Vec<Complex<T>>, PropagationError> {
        let hologram = check_hologram(hologram.into_dyn())?;
        check_depths(depths)?;
        check_center(&center)?;
        self.evaluate_checked(hologram, depths, center, backend)
    }

    fn evaluate_checked<B: ComputeBackend>(
        &self,
        hologram: ArrayView2<'_, T>,
        depths: &[T],
        center: [T; 2],
        backend: &B,
    ) -> Result<Vec<Complex<T>>, PropagationError> {
        let spectrum = self.spectrum(hologram, center)?;
        let evaluator = AxialEvaluator::new(&spectrum, &self.kernel);
        let field = evaluator.evaluate(depths, backend)?;
        debug_assert_eq!(field.len(), depths.len());
        Ok(field)
    }
}

/// The Rayleigh–Sommerfeld propagator, holding its optics and compute backend.
#[derive(Debug)]
pub struct RayleighSommerfeld<B = DefaultBackend> {
    /// Executes the per-depth reductions.
    pub backend: B,
    /// Wavelength and pixel pitch; unset entries use the defaults.
    pub options: OpticalOptions,
}

impl<B: Default> Default for RayleighSommerfeld<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B> RayleighSommerfeld<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            options: OpticalOptions::default(),
        }
    }

    /// Replace the optical options.
    pub fn with_options(mut self, options: OpticalOptions) -> Self {
        self.options = options;
        self
    }
}

impl<B: ComputeBackend> RayleighSommerfeld<B> {
    /// Build a reusable plan for holograms of `shape`.
    pub fn plan<T: Real>(&self, shape: (usize, usize)) -> Result<AxialPlan<T>, InvalidArgument> {
        AxialPlan::new(shape, self.options.resolve()?)
    }
}

impl<B: ComputeBackend> AxialPropagator for RayleighSommerfeld<B> {
    fn propagate<T: Real>(
        &self,
        inputs: AxialInputs<'_, T>,
    ) -> Result<AxialProfile<T>, PropagationError> {
        let inputs = inputs.validate()?;
        let plan = self.plan::<T>(inputs.hologram.dim())?;

        log::debug!(
            "Propagating {} depth(s) through ({:.2}, {:.2}) on {}",
            inputs.depths.len(),
            inputs.center[0].as_f64(),
            inputs.center[1].as_f64(),
            self.backend.device_info().name
        );

        let field = plan.evaluate_checked(
            inputs.hologram,
            inputs.depths.as_slice(),
            inputs.center,
            &self.backend,
        )?;

        Ok(AxialProfile {
            center: inputs.center,
            depths: inputs.depths.into_vec(),
            field,
        })
    }

    fn method_name(&self) -> &str {
        "Rayleigh-Sommerfeld (angular spectrum)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use holofocus_compute::SerialBackend;
    use ndarray::Array2;

    #[test]
    fn test_plan_rejects_empty_shape() {
        let err = AxialPlan::<f64>::new((0, 8), OpticalParams::default()).unwrap_err();
        assert_eq!(
            err,
            InvalidArgument::Empty {
                argument: Argument::Hologram
            }
        );
    }

    #[test]
    fn test_plan_rejects_shape_mismatch() {
        let plan = AxialPlan::<f64>::new((8, 8), OpticalParams::default()).unwrap();
        let holo = Array2::<f64>::ones((8, 4));
        let err = plan
            .evaluate(holo.view(), &[0.0], [1.0, 1.0], &SerialBackend)
            .unwrap_err();
        assert!(matches!(
            err,
            PropagationError::ShapeMismatch {
                expected: (8, 8),
                found: (8, 4)
            }
        ));
    }

    #[test]
    fn test_plan_reuse_matches_fresh_plan() {
        let mut holo = Array2::<f64>::ones((8, 8));
        holo[[2, 5]] = 1.3;
        let solver = RayleighSommerfeld::new(SerialBackend);
        let plan = solver.plan::<f64>((8, 8)).unwrap();

        for center in [[2.0, 5.0], [4.0, 4.0]] {
            let reused = plan
                .evaluate(holo.view(), &[0.0, 3.0], center, &SerialBackend)
                .unwrap();
            let fresh = solver
                .propagate(
                    AxialInputs::new()
                        .hologram(holo.view())
                        .depths(vec![0.0, 3.0])
                        .center(&center),
                )
                .unwrap();
            assert_eq!(reused, fresh.field);
        }
    }

    #[test]
    fn test_single_pixel_at_depth_zero() {
        let mut holo = Array2::<f64>::ones((8, 8));
        holo[[3, 6]] = 1.2;
        let solver = RayleighSommerfeld::new(SerialBackend);
        let center = [3.0, 6.0];
        let profile = solver
            .propagate(
                AxialInputs::new()
                    .hologram(holo.view())
                    .depths(0.0_f64)
                    .center(&center),
            )
            .unwrap();
        assert_eq!(profile.len(), 1);
        assert_abs_diff_eq!(profile.field[0].re, 0.2, epsilon = 1e-14);
        assert_abs_diff_eq!(profile.field[0].im, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_invalid_options_fail_before_work() {
        let holo = Array2::<f64>::ones((4, 4));
        let solver = RayleighSommerfeld::new(SerialBackend)
            .with_options(OpticalOptions::new(0.5, -1.0));
        let err = solver
            .propagate(
                AxialInputs::new()
                    .hologram(holo.view())
                    .depths(0.0_f64)
                    .center(&[1.0, 1.0]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PropagationError::InvalidArgument(InvalidArgument::NonPositive {
                name: "pixel_pitch",
                ..
            })
        ));
    }

    #[test]
    fn test_method_name() {
        let solver = RayleighSommerfeld::new(SerialBackend);
        assert_eq!(solver.method_name(), "Rayleigh-Sommerfeld (angular spectrum)");
    }
}
