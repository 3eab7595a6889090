//! Gate configuration and filter snapshots
//!
//! # Example
//!
//! ```ignore
//! use membership_gate::domain::GateConfigBuilder;
//!
//! let config = GateConfigBuilder::new()
//!     .target_fpp(0.01)
//!     .minimum_capacity(1000)
//!     .build()
//!     .expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::{validate_probability, FilterDimensions};
use crate::error::GateError;

/// Sizing settings used every time the gate is (re)built
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Target false positive probability, strictly inside (0, 1)
    pub target_fpp: f64,
    /// Capacity floor so small stores still get headroom
    pub minimum_capacity: usize,
    /// Expected capacity = max(store count * multiplier, minimum)
    pub capacity_multiplier: usize,
    /// Rebuild once current items reach this fraction of expected capacity
    pub saturation_ratio: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            target_fpp: 0.01,
            minimum_capacity: 1000,
            capacity_multiplier: 2,
            saturation_ratio: 1.0,
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<(), GateError> {
        validate_probability(self.target_fpp)?;

        if self.minimum_capacity == 0 {
            return Err(GateError::InvalidParameter {
                name: "minimum_capacity",
                reason: "cannot be 0".to_string(),
            });
        }

        if self.capacity_multiplier == 0 {
            return Err(GateError::InvalidParameter {
                name: "capacity_multiplier",
                reason: "cannot be 0".to_string(),
            });
        }

        if !(self.saturation_ratio > 0.0 && self.saturation_ratio.is_finite()) {
            return Err(GateError::InvalidParameter {
                name: "saturation_ratio",
                reason: format!("must be a positive finite number, got {}", self.saturation_ratio),
            });
        }

        Ok(())
    }

    /// Capacity to size a filter for, given the store's current count.
    pub fn expected_capacity(&self, total_count: usize) -> usize {
        total_count
            .saturating_mul(self.capacity_multiplier)
            .max(self.minimum_capacity)
    }
}

/// Builder for GateConfig with validation
#[derive(Default)]
pub struct GateConfigBuilder {
    target_fpp: Option<f64>,
    minimum_capacity: Option<usize>,
    capacity_multiplier: Option<usize>,
    saturation_ratio: Option<f64>,
}

impl GateConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_fpp(mut self, fpp: f64) -> Self {
        self.target_fpp = Some(fpp);
        self
    }

    pub fn minimum_capacity(mut self, capacity: usize) -> Self {
        self.minimum_capacity = Some(capacity);
        self
    }

    pub fn capacity_multiplier(mut self, multiplier: usize) -> Self {
        self.capacity_multiplier = Some(multiplier);
        self
    }

    pub fn saturation_ratio(mut self, ratio: f64) -> Self {
        self.saturation_ratio = Some(ratio);
        self
    }

    /// Build the GateConfig, validating all parameters
    pub fn build(self) -> Result<GateConfig, GateError> {
        let defaults = GateConfig::default();

        let config = GateConfig {
            target_fpp: self.target_fpp.unwrap_or(defaults.target_fpp),
            minimum_capacity: self.minimum_capacity.unwrap_or(defaults.minimum_capacity),
            capacity_multiplier: self
                .capacity_multiplier
                .unwrap_or(defaults.capacity_multiplier),
            saturation_ratio: self.saturation_ratio.unwrap_or(defaults.saturation_ratio),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Snapshot of the live filter's configuration.
///
/// `current_items` is approximate: it starts at the store count seen by the
/// last rebuild and grows by one per recorded insertion. Only a rebuild
/// corrects it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub expected_capacity: usize,
    pub target_false_positive_probability: f64,
    pub bits: usize,
    pub hash_count: usize,
    pub current_items: u64,
    /// Incremented by every rebuild; the initial build is generation 1
    pub generation: u64,
}

impl FilterConfig {
    pub fn new(
        expected_capacity: usize,
        target_false_positive_probability: f64,
        dimensions: FilterDimensions,
        current_items: u64,
        generation: u64,
    ) -> Self {
        Self {
            expected_capacity,
            target_false_positive_probability,
            bits: dimensions.bits,
            hash_count: dimensions.hash_count,
            current_items,
            generation,
        }
    }

    /// Whether the counter has reached `ratio` of the sized capacity.
    pub fn is_saturated(&self, ratio: f64) -> bool {
        self.current_items as f64 >= self.expected_capacity as f64 * ratio
    }
}
