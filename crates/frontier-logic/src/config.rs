//! Pathfinding configuration.
//!
//! Loaded from JSON by hosts (all fields optional, falling back to
//! defaults) and checked with [`validate_config`] before use.
//!
//! ```
//! use frontier_logic::config::{validate_config, PathfindingConfig};
//!
//! let config = PathfindingConfig::default();
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::grid::{DIAGONAL_COST, ORTHOGONAL_COST};

/// Largest grid the pathfinder will size an open set for.
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Tunables for grid and door-graph pathfinding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    /// Allow 8-way movement (corner cutting is never allowed).
    pub allow_diagonal: bool,
    pub orthogonal_cost: u32,
    pub diagonal_cost: u32,
    /// Door-graph path cache size. 0 disables caching.
    pub path_cache_capacity: usize,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            grid_width: 64,
            grid_height: 64,
            allow_diagonal: true,
            orthogonal_cost: ORTHOGONAL_COST,
            diagonal_cost: DIAGONAL_COST,
            path_cache_capacity: 256,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Width or height is zero.
    EmptyGrid { width: usize, height: usize },
    /// Cell count above `MAX_GRID_CELLS` (or overflowing).
    GridTooLarge { width: usize, height: usize },
    /// Orthogonal steps must cost something.
    ZeroOrthogonalCost,
    /// Diagonal step cheaper than an orthogonal one.
    DiagonalTooCheap { orthogonal: u32, diagonal: u32 },
    /// Diagonal step dearer than two orthogonal ones; the octile
    /// estimate would overshoot.
    DiagonalTooDear { orthogonal: u32, diagonal: u32 },
}

/// Validate a pathfinding configuration, returning all errors found.
pub fn validate_config(config: &PathfindingConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let (width, height) = (config.grid_width, config.grid_height);

    if width == 0 || height == 0 {
        errors.push(ConfigError::EmptyGrid { width, height });
    }
    match width.checked_mul(height) {
        Some(cells) if cells <= MAX_GRID_CELLS => {}
        _ => errors.push(ConfigError::GridTooLarge { width, height }),
    }

    if config.orthogonal_cost == 0 {
        errors.push(ConfigError::ZeroOrthogonalCost);
    }
    if config.allow_diagonal {
        let orthogonal = config.orthogonal_cost;
        let diagonal = config.diagonal_cost;
        if diagonal < orthogonal {
            errors.push(ConfigError::DiagonalTooCheap {
                orthogonal,
                diagonal,
            });
        }
        if u64::from(diagonal) > 2 * u64::from(orthogonal) {
            errors.push(ConfigError::DiagonalTooDear {
                orthogonal,
                diagonal,
            });
        }
    }

    errors
}
