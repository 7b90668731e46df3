//! The channel callback contract: `schedule` + `fire`, specialized per
//! entity kind (world channels see the agent population as cargo; agent
//! channels see the world as cargo).
//!
//! Channel bodies are opaque to the core — user code implements these
//! traits on small value-type structs holding per-channel parameters. Each
//! entity owns its channels in a fixed arena (`Vec<Box<dyn ...Channel<...>>>`);
//! cloning an agent deep-copies every channel instance via
//! [`AgentChannel::clone_box`].

use pop_core::{AgentId, ChannelSlot};

/// Where a reschedule request originated: nowhere (initial scheduling or a
/// manual call), a cross-entity neighbor event, or a specific internal
/// dependent channel that just fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleSource {
    None,
    Neighbor,
    Channel(ChannelSlot),
}

/// A request, queued during `fire`, to fire a sibling channel on the same
/// entity before this event is considered finished. `event_time` is the
/// nested event's own fire time; the clock only advances to it (and the
/// nested channel, plus its internal dependents, only gets rescheduled) if
/// `reschedule` is set — firing without rescheduling is a side-effecting
/// peek at another channel's body that leaves the schedule untouched.
#[derive(Debug, Clone, Copy)]
pub struct NestedFireRequest {
    pub channel: ChannelSlot,
    pub event_time: f64,
    pub reschedule: bool,
    pub source: ScheduleSource,
}

/// A request to recompute a sibling channel's next event time without
/// firing it, optionally cascading to that channel's own internal
/// dependents.
#[derive(Debug, Clone, Copy)]
pub struct RescheduleRequest {
    pub channel: ChannelSlot,
    pub with_dependents: bool,
    pub source: ScheduleSource,
}

/// Side effects a firing agent channel may request. Collected on a scratch
/// area during `fire` and lifted into the `AgentQueue` (or the scheduler) by
/// the caller once `fire` returns, preserving borrow discipline (the channel
/// never touches the queue or the scheduler directly).
pub struct AgentEffects<AS> {
    /// Cloned child states requesting a birth; each becomes one `ADD` entry.
    pub new_children: Vec<AS>,
    /// Set by `kill_self()`; becomes a `DELETE` entry for this agent.
    pub kill_self: bool,
    /// Sibling channels to nested-fire before this event finishes.
    pub nested_fires: Vec<NestedFireRequest>,
    /// Sibling channels to reschedule (without firing) before this event
    /// finishes.
    pub reschedules: Vec<RescheduleRequest>,
}

impl<AS> Default for AgentEffects<AS> {
    fn default() -> Self {
        Self {
            new_children: Vec::new(),
            kill_self: false,
            nested_fires: Vec::new(),
            reschedules: Vec::new(),
        }
    }
}

impl<AS: Clone> AgentEffects<AS> {
    /// Request a birth: `current` is deep-copied and queued as a new agent
    /// whose `parent` marker will be set to this agent's id.
    pub fn clone_self(&mut self, current: &AS) {
        self.new_children.push(current.clone());
    }

    /// Request that this agent be removed from the population.
    pub fn kill_self(&mut self) {
        self.kill_self = true;
    }

    /// Fire another channel on this same agent before the current event
    /// finishes processing.
    pub fn fire_nested(&mut self, channel: ChannelSlot, event_time: f64, reschedule: bool, source: ScheduleSource) {
        self.nested_fires.push(NestedFireRequest {
            channel,
            event_time,
            reschedule,
            source,
        });
    }

    /// Recompute a sibling channel's next event time without firing it.
    pub fn reschedule(&mut self, channel: ChannelSlot, with_dependents: bool, source: ScheduleSource) {
        self.reschedules.push(RescheduleRequest {
            channel,
            with_dependents,
            source,
        });
    }
}

/// Side effects a firing world channel may request.
#[derive(Default)]
pub struct WorldEffects {
    /// Agents to remove, by id.
    pub kills: Vec<AgentId>,
    /// Set by `stop()`; terminates the simulation after this event.
    pub stop: bool,
    /// Sibling channels to nested-fire before this event finishes.
    pub nested_fires: Vec<NestedFireRequest>,
    /// Sibling channels to reschedule (without firing) before this event
    /// finishes.
    pub reschedules: Vec<RescheduleRequest>,
}

impl WorldEffects {
    pub fn kill_agent(&mut self, id: AgentId) {
        self.kills.push(id);
    }

    pub fn stop(&mut self) {
        self.stop = true;
    }

    /// Fire another channel on the world before the current event finishes
    /// processing.
    pub fn fire_nested(&mut self, channel: ChannelSlot, event_time: f64, reschedule: bool, source: ScheduleSource) {
        self.nested_fires.push(NestedFireRequest {
            channel,
            event_time,
            reschedule,
            source,
        });
    }

    /// Recompute a sibling channel's next event time without firing it.
    pub fn reschedule(&mut self, channel: ChannelSlot, with_dependents: bool, source: ScheduleSource) {
        self.reschedules.push(RescheduleRequest {
            channel,
            with_dependents,
            source,
        });
    }
}

/// An agent channel: `WS` is the world's state type (read-only cargo), `AS`
/// is this agent's own state type.
pub trait AgentChannel<WS, AS>: AgentChannelClone<WS, AS> {
    /// Stable identifier used for dependency-graph diagnostics and error
    /// messages.
    fn id(&self) -> &'static str;

    /// Compute the next putative event time. Must return `>= clock`.
    fn schedule(&self, state: &AS, world: &WS, clock: f64, source: ScheduleSource) -> f64;

    /// Execute the event. Returns `true` iff dependents must be rescheduled.
    fn fire(
        &mut self,
        state: &mut AS,
        world: &WS,
        effects: &mut AgentEffects<AS>,
        clock: f64,
        event_time: f64,
    ) -> bool;
}

/// Object-safe clone helper, blanket-implemented for any `Clone` channel.
pub trait AgentChannelClone<WS, AS> {
    fn clone_box(&self) -> Box<dyn AgentChannel<WS, AS>>;
}

impl<WS, AS, T> AgentChannelClone<WS, AS> for T
where
    T: AgentChannel<WS, AS> + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn AgentChannel<WS, AS>> {
        Box::new(self.clone())
    }
}

impl<WS, AS> Clone for Box<dyn AgentChannel<WS, AS>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A world channel: `WS` is the world's own state, `AS` is the agent state
/// type, exposed read-only alongside each agent's id (cargo = the agent
/// population).
pub trait WorldChannel<WS, AS>: WorldChannelClone<WS, AS> {
    fn id(&self) -> &'static str;

    fn schedule(
        &self,
        world: &WS,
        agents: &[(AgentId, &AS)],
        clock: f64,
        source: ScheduleSource,
    ) -> f64;

    fn fire(
        &mut self,
        world: &mut WS,
        agents: &[(AgentId, &AS)],
        effects: &mut WorldEffects,
        clock: f64,
        event_time: f64,
    ) -> bool;
}

pub trait WorldChannelClone<WS, AS> {
    fn clone_box(&self) -> Box<dyn WorldChannel<WS, AS>>;
}

impl<WS, AS, T> WorldChannelClone<WS, AS> for T
where
    T: WorldChannel<WS, AS> + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn WorldChannel<WS, AS>> {
        Box::new(self.clone())
    }
}

impl<WS, AS> Clone for Box<dyn WorldChannel<WS, AS>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
