//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait abstracts over execution strategies (Rayon
//! thread pool, plain serial loop) so that the propagation code in
//! `holofocus-core` does not care how independent work items are scheduled.

use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub compute_units: Option<usize>,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Cpu,
    Serial,
}

/// Abstraction over compute backends.
///
/// Implementations schedule `len` independent work items and gather the
/// results by index. Item `i` of the returned vector is always `f(i)`, no
/// matter in which order or on which thread the items ran.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Evaluate `f` for every index in `0..len`.
    ///
    /// This is the entry point for the per-depth evaluation: each depth only
    /// reads shared, immutable data and writes its own output slot.
    fn parallel_map<T, F>(&self, len: usize, f: F) -> Result<Vec<T>, ComputeError>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync;
}

/// Runtime-selected backend, for callers that pick the strategy from
/// configuration.
#[derive(Debug)]
pub enum Backend {
    #[cfg(feature = "cpu")]
    Cpu(crate::cpu::CpuBackend),
    Serial(crate::serial::SerialBackend),
}

impl Backend {
    /// Build a backend from a preference string: `"auto"`, `"cpu"` or
    /// `"serial"`. `threads` pins the Rayon pool size for the CPU backend.
    pub fn from_preference(preference: &str, threads: Option<usize>) -> Result<Self, ComputeError> {
        match preference {
            #[cfg(feature = "cpu")]
            "auto" | "cpu" => {
                let cpu = match threads {
                    Some(n) => crate::cpu::CpuBackend::with_threads(n)?,
                    None => crate::cpu::CpuBackend::new(),
                };
                Ok(Self::Cpu(cpu))
            }
            #[cfg(not(feature = "cpu"))]
            "auto" => Ok(Self::Serial(crate::serial::SerialBackend)),
            "serial" => Ok(Self::Serial(crate::serial::SerialBackend)),
            other => Err(ComputeError::Unavailable(format!(
                "unknown backend '{}' (expected auto, cpu or serial)",
                other
            ))),
        }
    }
}

impl ComputeBackend for Backend {
    fn device_info(&self) -> DeviceInfo {
        match self {
            #[cfg(feature = "cpu")]
            Self::Cpu(cpu) => cpu.device_info(),
            Self::Serial(serial) => serial.device_info(),
        }
    }

    fn parallel_map<T, F>(&self, len: usize, f: F) -> Result<Vec<T>, ComputeError>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        match self {
            #[cfg(feature = "cpu")]
            Self::Cpu(cpu) => cpu.parallel_map(len, f),
            Self::Serial(serial) => serial.parallel_map(len, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_preference() {
        let backend = Backend::from_preference("serial", None).unwrap();
        assert_eq!(backend.device_info().backend_type, BackendType::Serial);
    }

    #[cfg(feature = "cpu")]
    #[test]
    fn test_auto_prefers_cpu() {
        let backend = Backend::from_preference("auto", Some(2)).unwrap();
        let info = backend.device_info();
        assert_eq!(info.backend_type, BackendType::Cpu);
        assert_eq!(info.compute_units, Some(2));
    }

    #[test]
    fn test_unknown_preference_is_rejected() {
        let err = Backend::from_preference("gpu", None).unwrap_err();
        assert!(err.to_string().contains("unknown backend 'gpu'"));
    }
}
