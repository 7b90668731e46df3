//! `Recorder`: a population-level observer attached to a [`crate::Model`].
//!
//! The simulator calls `record` at the start and end of a run, and a world
//! channel holding a reference to the same recorder may call it at
//! intervening event times. Concrete backends (CSV, SQLite, Parquet) live
//! in `pop-output`; this crate only defines the seam.

use pop_core::AgentId;

pub trait Recorder<WS, AS> {
    fn record(&mut self, time: f64, world: &WS, agents: &[(AgentId, &AS)]);
}
