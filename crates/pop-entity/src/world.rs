//! `World<WS, AS>`: the single shared-state entity, its channel arena, and
//! the population trajectory it accumulates as agents are born and die.
//!
//! The world never spawns agents directly — only `AgentChannel`s can
//! request a birth, since a birth needs a parent to satisfy the `AgentQueue`
//! invariant and the world has no natural parent to offer. A world channel
//! can only kill existing agents by id and request a stop.

use pop_core::{AgentId, ChannelSlot, CoreError, CoreResult};
use pop_schedule::Scheduler;

use crate::channel::{ScheduleSource, WorldChannel, WorldEffects};

/// The shared-state entity. `WS` is its own state; `AS` is the agent state
/// type its channels observe (read-only) alongside each agent's id.
pub struct World<WS, AS> {
    state: WS,
    scheduler: Scheduler,
    channels: Vec<Box<dyn WorldChannel<WS, AS>>>,
    curr_channel: Option<ChannelSlot>,
    is_modified: bool,
    stopped: bool,
    /// Event-time trajectory of population size, appended to on every
    /// world-level firing and every population-size-changing agent event.
    /// `f64`-valued because CONSTANT_NUMBER substitution tracks a fractional
    /// size estimate (`size / nmax` per substitution), not a literal count.
    ts: Vec<f64>,
    size_series: Vec<f64>,
}

impl<WS, AS> World<WS, AS> {
    pub fn new(state: WS, scheduler: Scheduler, channels: Vec<Box<dyn WorldChannel<WS, AS>>>, n0: usize) -> Self {
        let t0 = scheduler.clock();
        Self {
            state,
            scheduler,
            channels,
            curr_channel: None,
            is_modified: false,
            stopped: false,
            ts: vec![t0],
            size_series: vec![n0 as f64],
        }
    }

    pub fn state(&self) -> &WS {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WS {
        &mut self.state
    }

    pub fn clock(&self) -> f64 {
        self.scheduler.clock()
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn curr_channel(&self) -> Option<ChannelSlot> {
        self.curr_channel
    }

    pub fn curr_channel_id(&self) -> Option<&'static str> {
        self.curr_channel.map(|slot| self.channels[slot.index()].id())
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn trajectory(&self) -> (&[f64], &[f64]) {
        (&self.ts, &self.size_series)
    }

    pub fn last_size(&self) -> f64 {
        *self.size_series.last().expect("size series is seeded with n0")
    }

    /// Record a population-size sample at `time`, e.g. right after an agent
    /// birth or death is finalized. Appends only if `time` does not go
    /// backwards relative to the last sample.
    pub fn record_size(&mut self, time: f64, size: f64) {
        debug_assert!(self.ts.last().is_none_or(|&last| time >= last));
        self.ts.push(time);
        self.size_series.push(size);
    }

    pub fn next_event_time(&mut self) -> f64 {
        self.scheduler.earliest().map(|(_, t)| t).unwrap_or(f64::INFINITY)
    }

    pub fn schedule_all(&mut self, agents: &[(AgentId, &AS)]) -> CoreResult<()> {
        for i in 0..self.channels.len() {
            let slot = ChannelSlot(i as u32);
            let t = self.channels[i].schedule(&self.state, agents, self.scheduler.clock(), ScheduleSource::None);
            self.scheduler.set_event_time(slot, t)?;
        }
        Ok(())
    }

    /// Fire the world's earliest-scheduled channel. Kills are returned to
    /// the caller as ids (the driver owns population removal and enqueues
    /// the matching `AgentQueue` deletes, since those carry a size-effect
    /// the world itself does not track per-agent).
    pub fn process_next(&mut self, agents: &[(AgentId, &AS)]) -> CoreResult<WorldEffects> {
        let (slot, event_time) = self
            .scheduler
            .earliest()
            .ok_or_else(|| CoreError::Simulation("world has no channels to fire".into()))?;
        self.curr_channel = Some(slot);

        let clock = self.scheduler.clock();
        let mut effects = WorldEffects::default();
        let modified = self.channels[slot.index()].fire(&mut self.state, agents, &mut effects, clock, event_time);
        self.scheduler.advance_clock(event_time);
        self.is_modified = modified;

        self.apply_requested_effects(agents, &mut effects)?;
        self.stopped = effects.stop;

        let resched = self.channels[slot.index()].schedule(
            &self.state,
            agents,
            self.scheduler.clock(),
            ScheduleSource::None,
        );
        self.scheduler.set_event_time(slot, resched)?;

        if modified {
            for dep in self.scheduler.internal_dependents(slot).to_vec() {
                let t = self.channels[dep.index()].schedule(
                    &self.state,
                    agents,
                    self.scheduler.clock(),
                    ScheduleSource::Channel(slot),
                );
                self.scheduler.set_event_time(dep, t)?;
            }
        }

        Ok(effects)
    }

    /// React to one agent's most recent firing: reschedule every world
    /// channel that agent's `l2g_dependents` name.
    pub fn cross_schedule_from_agent(
        &mut self,
        agents: &[(AgentId, &AS)],
        l2g_dependents: &[ChannelSlot],
    ) -> CoreResult<()> {
        for &slot in l2g_dependents {
            let t = self.channels[slot.index()].schedule(
                &self.state,
                agents,
                self.scheduler.clock(),
                ScheduleSource::Neighbor,
            );
            self.scheduler.set_event_time(slot, t)?;
        }
        Ok(())
    }

    /// Accumulated variant of the above for the AM driver: merge the
    /// l2g-dependent sets of every agent that fired during a barrier pass
    /// before rescheduling, so a world channel invalidated by two different
    /// agents is only rescheduled once.
    pub fn cross_schedule_from_agents_async(
        &mut self,
        agents: &[(AgentId, &AS)],
        l2g_dependents: &[ChannelSlot],
    ) -> CoreResult<()> {
        let mut seen = std::collections::HashSet::new();
        let unique: Vec<ChannelSlot> = l2g_dependents.iter().copied().filter(|s| seen.insert(*s)).collect();
        self.cross_schedule_from_agent(agents, &unique)
    }

    /// Apply the nested-fire and manual-reschedule requests a world
    /// channel's `fire` queued onto its effects, before the caller
    /// processes the remaining kill/stop effects of the outer fire itself.
    fn apply_requested_effects(&mut self, agents: &[(AgentId, &AS)], effects: &mut WorldEffects) -> CoreResult<()> {
        for req in std::mem::take(&mut effects.nested_fires) {
            let mut nested = WorldEffects::default();
            let nested_modified = self.channels[req.channel.index()].fire(
                &mut self.state,
                agents,
                &mut nested,
                self.scheduler.clock(),
                req.event_time,
            );
            effects.kills.extend(nested.kills);
            effects.stop |= nested.stop;

            if req.reschedule {
                self.scheduler.advance_clock(req.event_time);
                let t = self.channels[req.channel.index()].schedule(
                    &self.state,
                    agents,
                    self.scheduler.clock(),
                    req.source,
                );
                self.scheduler.set_event_time(req.channel, t)?;

                if nested_modified {
                    for dep in self.scheduler.internal_dependents(req.channel).to_vec() {
                        let t = self.channels[dep.index()].schedule(
                            &self.state,
                            agents,
                            self.scheduler.clock(),
                            ScheduleSource::Channel(req.channel),
                        );
                        self.scheduler.set_event_time(dep, t)?;
                    }
                }
            }
        }

        for req in std::mem::take(&mut effects.reschedules) {
            let t = self.channels[req.channel.index()].schedule(&self.state, agents, self.scheduler.clock(), req.source);
            self.scheduler.set_event_time(req.channel, t)?;

            if req.with_dependents {
                for dep in self.scheduler.internal_dependents(req.channel).to_vec() {
                    let t = self.channels[dep.index()].schedule(
                        &self.state,
                        agents,
                        self.scheduler.clock(),
                        req.source,
                    );
                    self.scheduler.set_event_time(dep, t)?;
                }
            }
        }

        Ok(())
    }
}
