//! Single-threaded backend.
//!
//! Useful as a reference when checking that the parallel backend is
//! bit-identical, and for callers that already parallelise at a coarser level
//! (e.g. one hologram per thread).

use crate::backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo};

/// Evaluates work items one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Serial".into(),
            backend_type: BackendType::Serial,
            compute_units: Some(1),
        }
    }

    fn parallel_map<T, F>(&self, len: usize, f: F) -> Result<Vec<T>, ComputeError>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        Ok((0..len).map(f).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_map() {
        let out = SerialBackend.parallel_map(4, |i| 10 - i).unwrap();
        assert_eq!(out, vec![10, 9, 8, 7]);
    }
}
