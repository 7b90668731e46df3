//! Continuous simulation time.
//!
//! Unlike a tick-driven model, every entity clock here is an `f64` "wall
//! clock" that a channel's `schedule` callback may advance by an arbitrary,
//! non-negative amount. There is no fixed step size and no mapping to
//! wall-clock seconds — channels are free to represent Poisson waiting
//! times, deterministic periods, or anything else that resolves to a single
//! `f64` event time.

use crate::error::{CoreError, CoreResult};

/// Validate a clock value: must be finite-or-NaN-free at construction time.
/// `f64::INFINITY` is a legal *event time* (it means "never"), but a clock
/// itself must never be NaN.
pub fn check_clock(t: f64) -> CoreResult<()> {
    if t.is_nan() {
        return Err(CoreError::Simulation("clock time is NaN".into()));
    }
    Ok(())
}

/// Validate that `event_time` is not earlier than `clock`, raising the
/// scheduling-time variant of [`CoreError`] named for `channel` otherwise.
pub fn check_scheduled(channel: &str, clock: f64, event_time: f64) -> CoreResult<()> {
    if event_time < clock {
        return Err(CoreError::Scheduling {
            channel: channel.to_string(),
            clock,
            attempted: event_time,
        });
    }
    Ok(())
}

/// Configuration shared by both simulation drivers.
///
/// | Field                   | Meaning                                               |
/// |--------------------------|-------------------------------------------------------|
/// | `t_start`                | Initial clock value for world and all agents.          |
/// | `seed`                   | Root seed for [`crate::SimRng`]/[`crate::AgentRng`].   |
/// | `constant_number_floor`  | `world.size` threshold for CONSTANT_NUMBER → NORMAL.   |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub t_start: f64,
    pub seed: u64,
    /// Reverse mode-transition threshold: once `world.size` drops to or
    /// below this, CONSTANT_NUMBER mode switches back to NORMAL. `None`
    /// disables the reverse transition entirely (the default).
    pub constant_number_floor: Option<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            seed: 0,
            constant_number_floor: None,
        }
    }
}
