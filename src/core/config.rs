//! Simulation configuration with documented constants
//!
//! Driver-level tunables live here. Per-actor-type cloak and detector
//! settings come from the rules catalog instead (see `crate::rules`).

/// Configuration for the simulation driver
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // === VISIBILITY QUERIES ===
    /// Minimum unit count before bulk visibility queries go parallel
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    /// Queries are read-only, so the result is identical either way.
    pub parallel_threshold: usize,

    // === DETECTION INDEX ===
    /// Lower bound for the detector grid cell size (cells)
    ///
    /// The actual cell size is max(this, largest detection range), which
    /// keeps a 3x3 neighborhood scan exact. Raising it trades more
    /// detectors per bucket for fewer buckets.
    pub min_grid_cell_size: u32,

    // === EVENT LOG ===
    /// Maximum number of cue events retained in the world log
    ///
    /// Oldest events are dropped first. Consumers are expected to drain
    /// the log every tick; this only bounds memory when nobody does.
    pub max_event_log: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 1000,
            min_grid_cell_size: 8,
            max_event_log: 4096,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.min_grid_cell_size == 0 {
            return Err("min_grid_cell_size must be at least 1".into());
        }

        if self.max_event_log == 0 {
            return Err("max_event_log must be at least 1".into());
        }

        if self.parallel_threshold == 0 {
            return Err("parallel_threshold must be at least 1".into());
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}
