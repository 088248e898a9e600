//! Runtime configuration knobs.
//!
//! On a real GPU backend these would come from a device query
//! (`cudaMemGetInfo`, occupancy calculator, and so on). This CPU/rayon
//! substrate has no such device to query, so [`EngineLimits`] turns them
//! into ordinary configuration the caller can override, while the
//! resource planner (`crate::planner`) runs the identical arithmetic
//! either way.

use serde::{Deserialize, Serialize};

/// Resource-planner knobs that stand in for hardware queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineLimits {
    /// Bytes of working memory the planner is allowed to use for one
    /// chunk's scratch buffers. Defaults to 2 GiB, a conservative slice of
    /// a modern workstation's RAM.
    pub available_memory_bytes: usize,
    /// Upper bound on fits processed concurrently within one chunk,
    /// standing in for a GPU's maximum concurrent block count. Defaults to
    /// 65_536.
    pub max_concurrent_blocks: usize,
    /// Upper bound used by the `n_fits_per_block` halving rule (§4.3),
    /// standing in for a GPU's maximum threads per block. Defaults to the
    /// number of logical CPUs rayon would otherwise use, clamped to a
    /// minimum of 256 so the halving rule still has room to operate on
    /// small machines.
    pub max_threads: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            available_memory_bytes: 2 * 1024 * 1024 * 1024,
            max_concurrent_blocks: 65_536,
            max_threads: rayon::current_num_threads().max(256),
        }
    }
}

/// Levenberg-Marquardt damping constants.
///
/// Mirrors the reference engine's module-level constants, bundled into a
/// struct so a caller can override them per call without recompiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverTuning {
    /// Initial damping factor for every fit at iteration 0.
    pub default_damping: f64,
    /// Upper clamp applied to damping after a rejected step increases it.
    pub max_damping: f64,
    /// Lower clamp applied to damping after an accepted step decreases it.
    pub min_damping: f64,
}

impl Default for SolverTuning {
    fn default() -> Self {
        Self {
            default_damping: 1e-3,
            max_damping: 1e15,
            min_damping: 1e-15,
        }
    }
}
