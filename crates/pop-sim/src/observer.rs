//! Driver callbacks with all-default-no-op methods: implementors override
//! only the hooks they care about.

use pop_core::AgentId;

use crate::mode::PopulationMode;

pub trait SimObserver<WS, AS> {
    /// A channel fired on the world entity.
    fn on_world_event(&mut self, _time: f64, _channel_id: &'static str) {}

    /// A channel fired on a live agent.
    fn on_agent_event(&mut self, _time: f64, _agent: AgentId, _channel_id: &'static str) {}

    /// A birth was finalized into the population.
    fn on_agent_born(&mut self, _time: f64, _parent: AgentId, _child: AgentId) {}

    /// A death was finalized; under CONSTANT_NUMBER this fires on the
    /// substitution event, not on the discarded queue entry.
    fn on_agent_died(&mut self, _time: f64, _agent: AgentId) {}

    /// The driver switched between NORMAL and CONSTANT_NUMBER.
    fn on_mode_switch(&mut self, _time: f64, _mode: PopulationMode) {}

    /// Called once after the run loop exits, successfully or not.
    fn on_sim_end(&mut self, _final_time: f64, _world: &WS, _agents: &[(AgentId, &AS)]) {}
}

/// A [`SimObserver`] that does nothing. Use when a driver must be built but
/// no callbacks are needed.
pub struct NoopObserver;

impl<WS, AS> SimObserver<WS, AS> for NoopObserver {}
