//! `pop-schedule` — per-entity event-time bookkeeping.
//!
//! | Module              | Contents                                         |
//! |---------------------|----------------------------------------------------|
//! | [`channel_schedule`] | `ChannelSchedule`: channel → event time, cached min |
//! | [`scheduler`]        | `Scheduler`: schedule + dependency graphs + clock   |

pub mod channel_schedule;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use channel_schedule::ChannelSchedule;
pub use scheduler::{DepGraph, Scheduler};
