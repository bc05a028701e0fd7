//! CPU compute backend using Rayon for shared-memory parallelism.

use rayon::prelude::*;

use crate::backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo};

/// CPU backend that parallelises work across threads via Rayon.
///
/// Without an explicit thread count the global Rayon pool is used.
#[derive(Debug)]
pub struct CpuBackend {
    pool: Option<rayon::ThreadPool>,
}

impl CpuBackend {
    /// Create a new CPU backend on the global Rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Create a CPU backend with a dedicated pool of `num_threads` threads.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }

    /// Number of worker threads this backend schedules onto.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        let threads = self.num_threads();
        DeviceInfo {
            name: format!("CPU ({} threads)", threads),
            backend_type: BackendType::Cpu,
            compute_units: Some(threads),
        }
    }

    fn parallel_map<T, F>(&self, len: usize, f: F) -> Result<Vec<T>, ComputeError>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        // Indexed collect keeps slot i == f(i) regardless of scheduling.
        let run = || (0..len).into_par_iter().map(&f).collect::<Vec<T>>();
        Ok(match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        })
    }
}
