//! # Holofocus Compute
//!
//! Compute backend abstraction for the Holofocus workspace. This crate
//! provides a [`ComputeBackend`](backend::ComputeBackend) trait that isolates
//! the propagation code from how independent work items are scheduled.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Status |
//! |---------|-------------|--------|
//! | CPU (Rayon) | `cpu` (default) | Implemented |
//! | Serial | always | Implemented |

pub mod backend;

#[cfg(feature = "cpu")]
pub mod cpu;

pub mod serial;

pub use backend::{Backend, BackendType, ComputeBackend, ComputeError, DeviceInfo};

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;

pub use serial::SerialBackend;
