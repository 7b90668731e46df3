//! `Agent<WS, AS>`: one population member's state, its private `Scheduler`,
//! its channel arena, and the firing protocol that drives all three.
//!
//! Lineage tracking is an optional component (`Option<LoggerHandle<AS>>`)
//! rather than a subtype, since Rust has no inheritance and a tracked agent
//! only ever needs one extra field plus a different clone path.

use pop_core::{AgentId, ChannelSlot, CoreError, CoreResult};
use pop_schedule::Scheduler;

use crate::channel::{AgentChannel, AgentEffects, ScheduleSource};
use crate::logger::LoggerHandle;
use crate::queue::AgentQueue;

/// A live population member.
pub struct Agent<WS, AS: Clone> {
    state: AS,
    scheduler: Scheduler,
    channels: Vec<Box<dyn AgentChannel<WS, AS>>>,
    curr_channel: Option<ChannelSlot>,
    enabled: bool,
    /// Set by the most recent `fire`; drives whether internal dependents get
    /// rescheduled and whether the world's l2g dependents do too.
    is_modified: bool,
    /// `Some(parent)` for every agent born mid-run; `None` for an
    /// initializer-seeded founder. Cleared once `finalize_prev_event` has
    /// folded the birth event into the lineage log.
    parent: Option<AgentId>,
    logger: Option<LoggerHandle<AS>>,
}

impl<WS, AS: Clone> Agent<WS, AS> {
    /// Build a founder agent with no parent marker.
    pub fn new_founder(
        state: AS,
        scheduler: Scheduler,
        channels: Vec<Box<dyn AgentChannel<WS, AS>>>,
        logger: Option<LoggerHandle<AS>>,
    ) -> Self {
        Self {
            state,
            scheduler,
            channels,
            curr_channel: None,
            enabled: true,
            is_modified: false,
            parent: None,
            logger,
        }
    }

    pub fn state(&self) -> &AS {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AS {
        &mut self.state
    }

    pub fn clock(&self) -> f64 {
        self.scheduler.clock()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
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

    /// `Some(parent)` while this agent is a pending birth awaiting
    /// finalization; `None` once finalized or for a founder.
    pub fn parent_marker(&self) -> Option<AgentId> {
        self.parent
    }

    pub fn logger(&self) -> Option<&LoggerHandle<AS>> {
        self.logger.as_ref()
    }

    /// The time of this agent's next putative event, across all channels.
    pub fn next_event_time(&mut self) -> f64 {
        self.scheduler.earliest().map(|(_, t)| t).unwrap_or(f64::INFINITY)
    }

    /// Schedule every channel from scratch (initializer seeding, or right
    /// after a clone when the new agent's channel set must commit its first
    /// real event times).
    pub fn schedule_all(&mut self, world: &WS) -> CoreResult<()> {
        for i in 0..self.channels.len() {
            let slot = ChannelSlot(i as u32);
            let t = self.channels[i].schedule(&self.state, world, self.scheduler.clock(), ScheduleSource::None);
            self.scheduler.set_event_time(slot, t)?;
        }
        Ok(())
    }

    /// Fire this agent's earliest-scheduled channel, apply its effects, and
    /// reschedule. Births are deep-copied and pushed onto `queue` with this
    /// agent's id as parent; a self-kill disables the scheduler and pushes a
    /// matching delete. Does not drain `queue` — that is a driver concern.
    pub fn process_next(&mut self, id: AgentId, world: &WS, queue: &mut AgentQueue<WS, AS>) -> CoreResult<()> {
        let (slot, event_time) = self
            .scheduler
            .earliest()
            .ok_or_else(|| CoreError::Simulation(format!("agent {id} has no channels to fire")))?;
        self.curr_channel = Some(slot);

        let clock = self.scheduler.clock();
        let mut effects = AgentEffects::default();
        let modified = self.channels[slot.index()].fire(&mut self.state, world, &mut effects, clock, event_time);
        self.scheduler.advance_clock(event_time);
        self.is_modified = modified;

        self.apply_requested_effects(world, &mut effects)?;

        if let Some(logger) = &self.logger {
            logger.record(event_time, self.channels[slot.index()].id(), self.state.clone());
        }

        for child_state in effects.new_children {
            let child = self.spawn_child(id, child_state);
            queue.enqueue_add(id, child, event_time)?;
        }

        if effects.kill_self {
            self.enabled = false;
            self.scheduler.disable();
            queue.enqueue_delete(id, event_time);
        }

        let resched = self.channels[slot.index()].schedule(
            &self.state,
            world,
            self.scheduler.clock(),
            ScheduleSource::None,
        );
        self.scheduler.set_event_time(slot, resched)?;

        if modified {
            for dep in self.scheduler.internal_dependents(slot).to_vec() {
                let t = self.channels[dep.index()].schedule(
                    &self.state,
                    world,
                    self.scheduler.clock(),
                    ScheduleSource::Channel(slot),
                );
                self.scheduler.set_event_time(dep, t)?;
            }
        }

        Ok(())
    }

    /// Agent-channel slots whose world-side dependents need rescheduling
    /// after this agent's most recent firing. Empty unless `is_modified` and
    /// `curr_channel` is set.
    pub fn l2g_dependents(&self) -> &[ChannelSlot] {
        match self.curr_channel {
            Some(slot) if self.is_modified => self.scheduler.l2g_dependents(slot),
            _ => &[],
        }
    }

    /// React to the world's most recent firing: reschedule every agent
    /// channel the world's channel `world_channel` may have invalidated.
    pub fn cross_schedule_from_world(
        &mut self,
        world: &WS,
        world_channel: ChannelSlot,
        world_is_modified: bool,
    ) -> CoreResult<()> {
        if !world_is_modified {
            return Ok(());
        }
        for slot in self.scheduler.g2l_dependents(world_channel).to_vec() {
            let t = self.channels[slot.index()].schedule(
                &self.state,
                world,
                self.scheduler.clock(),
                ScheduleSource::Neighbor,
            );
            self.scheduler.set_event_time(slot, t)?;
        }
        Ok(())
    }

    /// Fire every sync channel once, in registration order, at the shared
    /// barrier time `tbarrier`, rescheduling each channel (and its internal
    /// dependents, if modified) immediately after it fires. Used by both
    /// drivers at each barrier. Returns the agent-to-world dependents
    /// invalidated by whichever sync channels turned out modified, for the
    /// caller to apply: the FM driver propagates these to the world
    /// immediately per agent, while the AM driver accumulates them across a
    /// whole barrier pass before applying once.
    pub fn synchronize(
        &mut self,
        id: AgentId,
        world: &WS,
        tbarrier: f64,
        queue: &mut AgentQueue<WS, AS>,
    ) -> CoreResult<Vec<ChannelSlot>> {
        let time = self.scheduler.clock();
        self.scheduler.advance_clock(tbarrier);
        let mut l2g = Vec::new();

        for slot in self.scheduler.sync_channels().to_vec() {
            self.curr_channel = Some(slot);
            let mut effects = AgentEffects::default();
            let modified = self.channels[slot.index()].fire(&mut self.state, world, &mut effects, time, tbarrier);
            self.is_modified = modified;

            self.apply_requested_effects(world, &mut effects)?;

            if let Some(logger) = &self.logger {
                logger.record(tbarrier, self.channels[slot.index()].id(), self.state.clone());
            }

            for child_state in effects.new_children {
                let child = self.spawn_child(id, child_state);
                queue.enqueue_add(id, child, tbarrier)?;
            }
            if effects.kill_self {
                self.enabled = false;
                self.scheduler.disable();
                queue.enqueue_delete(id, tbarrier);
            }

            let resched = self.channels[slot.index()].schedule(
                &self.state,
                world,
                self.scheduler.clock(),
                ScheduleSource::None,
            );
            self.scheduler.set_event_time(slot, resched)?;

            if modified {
                for dep in self.scheduler.internal_dependents(slot).to_vec() {
                    let t = self.channels[dep.index()].schedule(
                        &self.state,
                        world,
                        self.scheduler.clock(),
                        ScheduleSource::Channel(slot),
                    );
                    self.scheduler.set_event_time(dep, t)?;
                }
                l2g.extend_from_slice(self.scheduler.l2g_dependents(slot));
            }
        }

        Ok(l2g)
    }

    /// Clear the parent marker once a freshly dequeued birth has had its
    /// current channel (and, if the firing that produced it was modified,
    /// that channel's internal dependents) rescheduled against this agent's
    /// own state and clock. A newborn is deep-copied mid-fire, before its
    /// parent's own post-fire reschedule runs, so without this its current
    /// channel would still carry the parent's stale pre-reschedule event
    /// time and fire again immediately at its own birth instant. Idempotent.
    pub fn finalize_prev_event(&mut self, world: &WS) -> CoreResult<()> {
        if let Some(slot) = self.curr_channel {
            let resched = self.channels[slot.index()].schedule(
                &self.state,
                world,
                self.scheduler.clock(),
                ScheduleSource::None,
            );
            self.scheduler.set_event_time(slot, resched)?;

            if self.is_modified {
                for dep in self.scheduler.internal_dependents(slot).to_vec() {
                    let t = self.channels[dep.index()].schedule(
                        &self.state,
                        world,
                        self.scheduler.clock(),
                        ScheduleSource::Channel(slot),
                    );
                    self.scheduler.set_event_time(dep, t)?;
                }
            }
        }
        self.parent = None;
        Ok(())
    }

    /// Apply the nested-fire and manual-reschedule requests a channel's
    /// `fire` queued onto its effects, before the caller processes the
    /// remaining births/kill/reschedule effects of the outer fire itself.
    fn apply_requested_effects(&mut self, world: &WS, effects: &mut AgentEffects<AS>) -> CoreResult<()> {
        for req in std::mem::take(&mut effects.nested_fires) {
            let mut nested = AgentEffects::default();
            let nested_modified = self.channels[req.channel.index()].fire(
                &mut self.state,
                world,
                &mut nested,
                self.scheduler.clock(),
                req.event_time,
            );
            effects.new_children.extend(nested.new_children);
            effects.kill_self |= nested.kill_self;

            if req.reschedule {
                self.scheduler.advance_clock(req.event_time);
                let t =
                    self.channels[req.channel.index()].schedule(&self.state, world, self.scheduler.clock(), req.source);
                self.scheduler.set_event_time(req.channel, t)?;

                if nested_modified {
                    for dep in self.scheduler.internal_dependents(req.channel).to_vec() {
                        let t = self.channels[dep.index()].schedule(
                            &self.state,
                            world,
                            self.scheduler.clock(),
                            ScheduleSource::Channel(req.channel),
                        );
                        self.scheduler.set_event_time(dep, t)?;
                    }
                }
            }
        }

        for req in std::mem::take(&mut effects.reschedules) {
            let t = self.channels[req.channel.index()].schedule(&self.state, world, self.scheduler.clock(), req.source);
            self.scheduler.set_event_time(req.channel, t)?;

            if req.with_dependents {
                for dep in self.scheduler.internal_dependents(req.channel).to_vec() {
                    let t =
                        self.channels[dep.index()].schedule(&self.state, world, self.scheduler.clock(), req.source);
                    self.scheduler.set_event_time(dep, t)?;
                }
            }
        }

        Ok(())
    }

    fn spawn_child(&mut self, parent: AgentId, child_state: AS) -> Agent<WS, AS> {
        let mut child = self.deep_copy();
        child.state = child_state;
        child.parent = Some(parent);
        child
    }

    /// Deep-copy this agent's scheduler and channel arena into a fresh
    /// entity sharing its current state, branching the lineage logger if
    /// one is attached. Used both for births (`spawn_child`, which then
    /// overwrites the state and sets the parent marker) and for the
    /// CONSTANT_NUMBER death policy's direct slot substitution, which has
    /// no parent to record.
    pub fn deep_copy(&mut self) -> Agent<WS, AS> {
        let scheduler = self.scheduler.clone();
        let channels = self.channels.clone();
        let logger = self.logger.as_mut().map(|handle| handle.branch());
        Agent {
            state: self.state.clone(),
            scheduler,
            channels,
            curr_channel: self.curr_channel,
            enabled: true,
            is_modified: true,
            parent: None,
            logger,
        }
    }
}
