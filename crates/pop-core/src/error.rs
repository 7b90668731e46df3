//! Framework error type.
//!
//! Every failure the core raises is fatal to the run and propagates with
//! `?` to the caller; nothing here is caught or retried internally (see the
//! Failure Semantics section of the design doc). Sub-crates convert their own
//! narrower error enums into [`CoreError`] via `From` rather than stringifying.

use thiserror::Error;

/// The top-level error type shared across `pop-*` crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A channel's `schedule` callback returned a time before the entity's
    /// clock.
    #[error("channel {channel} scheduled event at t={attempted}, but clock is at t={clock}")]
    Scheduling {
        channel: String,
        clock: f64,
        attempted: f64,
    },

    /// A manual/nested fire was requested at a time before the entity's
    /// clock.
    #[error("cannot fire channel {channel} at t={attempted}, clock is already at t={clock}")]
    Firing {
        channel: String,
        clock: f64,
        attempted: f64,
    },

    /// An invariant of the simulator or model registry was violated.
    #[error("simulation error: {0}")]
    Simulation(String),

    /// The population reached zero while in NORMAL mode.
    #[error("the population crashed: no agents remain")]
    ZeroPopulation,

    /// A logger or recorder callback produced a record of the wrong shape.
    #[error("logging error: {0}")]
    Logging(String),
}

/// Shorthand result type for all `pop-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
