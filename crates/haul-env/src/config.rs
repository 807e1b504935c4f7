//! Environment configuration and validation.
//!
//! [`EnvConfig`] is the builder-input for
//! [`LogisticsEnv::new`](crate::LogisticsEnv::new). It is consumed once;
//! [`validate()`](EnvConfig::validate) checks structural invariants before
//! any world is built.

use std::error::Error;
use std::fmt;

// ── ConfigError ─────────────────────────────────────────────────

/// Errors detected during [`EnvConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `warehouse_count` is zero.
    NoWarehouses,
    /// `spawn_probability` is outside `[0, 1]` or NaN.
    InvalidSpawnProbability {
        /// The invalid value.
        value: f64,
    },
    /// `horizon` is zero.
    ZeroHorizon,
    /// `truck_capacity` is zero.
    ZeroCapacity,
    /// A reward parameter is NaN or infinite.
    NonFiniteReward {
        /// Which parameter.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWarehouses => write!(f, "warehouse_count must be at least 1"),
            Self::InvalidSpawnProbability { value } => {
                write!(f, "spawn_probability must be in [0, 1], got {value}")
            }
            Self::ZeroHorizon => write!(f, "horizon must be at least 1"),
            Self::ZeroCapacity => write!(f, "truck_capacity must be at least 1"),
            Self::NonFiniteReward { name, value } => {
                write!(f, "{name} must be finite, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── EnvConfig ───────────────────────────────────────────────────

/// Scenario and reward parameters for a [`LogisticsEnv`](crate::LogisticsEnv).
#[derive(Clone, Debug, PartialEq)]
pub struct EnvConfig {
    /// Warehouses, joined in a ring.
    pub warehouse_count: usize,
    /// Trucks, each placed at a random warehouse on reset.
    pub truck_count: usize,
    /// Cargo slots per truck.
    pub truck_capacity: usize,
    /// Steps after which an episode is truncated.
    pub horizon: u64,
    /// Reward added on every step.
    pub step_cost: f64,
    /// Reward added per delivered task.
    pub delivery_bonus: f64,
    /// Chance per step of spawning one task.
    pub spawn_probability: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            warehouse_count: 3,
            truck_count: 2,
            truck_capacity: 1,
            horizon: 200,
            step_cost: -0.01,
            delivery_bonus: 10.0,
            spawn_probability: 0.1,
        }
    }
}

impl EnvConfig {
    /// Default tunables with the given scenario size.
    pub fn new(truck_count: usize, warehouse_count: usize) -> Self {
        Self {
            truck_count,
            warehouse_count,
            ..Self::default()
        }
    }

    /// Set the cargo slots per truck.
    pub fn with_truck_capacity(mut self, capacity: usize) -> Self {
        self.truck_capacity = capacity;
        self
    }

    /// Set the truncation horizon.
    pub fn with_horizon(mut self, horizon: u64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the per-step reward.
    pub fn with_step_cost(mut self, step_cost: f64) -> Self {
        self.step_cost = step_cost;
        self
    }

    /// Set the per-delivery reward.
    pub fn with_delivery_bonus(mut self, bonus: f64) -> Self {
        self.delivery_bonus = bonus;
        self
    }

    /// Set the per-step spawn chance.
    pub fn with_spawn_probability(mut self, p: f64) -> Self {
        self.spawn_probability = p;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.warehouse_count == 0 {
            return Err(ConfigError::NoWarehouses);
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::InvalidSpawnProbability {
                value: self.spawn_probability,
            });
        }
        if self.horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.truck_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        for (name, value) in [
            ("step_cost", self.step_cost),
            ("delivery_bonus", self.delivery_bonus),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteReward { name, value });
            }
        }
        Ok(())
    }
}
