//! `pop-core` — foundational types for the population-simulation core.
//!
//! This crate is a dependency of every other `pop-*` crate. It intentionally
//! has no `pop-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                          |
//! |-----------|----------------------------------------------------|
//! | [`ids`]   | `AgentId`, `ChannelSlot`, `ChannelIndex`            |
//! | [`time`]  | continuous clock helpers, `SimConfig`               |
//! | [`rng`]   | `AgentRng` (per-agent), `SimRng` (driver-owned)     |
//! | [`error`] | `CoreError`, `CoreResult`                           |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, ChannelIndex, ChannelSlot};
pub use rng::{AgentRng, SimRng};
pub use time::{check_clock, check_scheduled, SimConfig};
