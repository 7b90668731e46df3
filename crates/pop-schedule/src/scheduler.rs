//! The per-entity `Scheduler`: a `ChannelSchedule` plus the three dependency
//! graphs and the ordered list of sync channels.
//!
//! Channels themselves are not stored here — they live in the owning
//! entity's arena (`pop-entity`), referenced only by their [`ChannelSlot`]
//! index. This sidesteps the cyclic-dependency-graph problem the design
//! notes call out (A depends on B, B depends on A): graphs here are plain
//! `index → [index]` adjacency lists, so there is no ownership cycle to
//! untangle, and `Scheduler` is `Clone` for free.

use std::collections::HashSet;

use pop_core::{check_clock, check_scheduled, ChannelSlot, CoreError, CoreResult};

use crate::channel_schedule::ChannelSchedule;

/// `index → [index]` adjacency list over a fixed-size channel arena.
pub type DepGraph = Vec<Vec<ChannelSlot>>;

#[derive(Clone)]
pub struct Scheduler {
    schedule: ChannelSchedule,
    clock: f64,
    enabled: bool,
    /// Internal (same-entity) dependents of each channel.
    dep_graph: DepGraph,
    /// Agent-channel slot → world-channel slots it may invalidate. `None`
    /// for a world scheduler (the world has no local-to-global edges).
    l2g_graph: Option<DepGraph>,
    /// World-channel slot → agent-channel slots it may invalidate. `None`
    /// for an agent scheduler.
    g2l_graph: Option<DepGraph>,
    /// Agent channels that must fire at every world-event barrier, in
    /// registration order.
    sync_channels: Vec<ChannelSlot>,
}

impl Scheduler {
    /// Build a scheduler for an entity with `initial_times.len()` channels.
    ///
    /// Fails if `t_init` is NaN, any initial event time precedes `t_init`,
    /// or a sync channel has another sync channel among its internal
    /// dependents.
    pub fn new(
        t_init: f64,
        initial_times: Vec<f64>,
        dep_graph: DepGraph,
        l2g_graph: Option<DepGraph>,
        g2l_graph: Option<DepGraph>,
        sync_channels: Vec<ChannelSlot>,
    ) -> CoreResult<Self> {
        check_clock(t_init)?;
        for &t in &initial_times {
            check_scheduled("<init>", t_init, t)?;
        }

        let sync_set: HashSet<ChannelSlot> = sync_channels.iter().copied().collect();
        for &s in &sync_channels {
            for dep in &dep_graph[s.index()] {
                if sync_set.contains(dep) {
                    return Err(CoreError::Simulation(format!(
                        "sync channel {s:?} has sync channel {dep:?} as a dependent"
                    )));
                }
            }
        }

        Ok(Self {
            schedule: ChannelSchedule::new(initial_times),
            clock: t_init,
            enabled: true,
            dep_graph,
            l2g_graph,
            g2l_graph,
            sync_channels,
        })
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Advance the clock to `t`. Callers must ensure `t >= clock` (the
    /// firing protocol in `pop-entity` guarantees this).
    pub fn advance_clock(&mut self, t: f64) {
        debug_assert!(t >= self.clock, "clock must be monotonically non-decreasing");
        self.clock = t;
    }

    pub fn event_time(&self, slot: ChannelSlot) -> f64 {
        self.schedule.get(slot)
    }

    /// Write a new event time for `slot`. Fails if `t < clock`.
    pub fn set_event_time(&mut self, slot: ChannelSlot, t: f64) -> CoreResult<()> {
        check_scheduled(&format!("{slot:?}"), self.clock, t)?;
        self.schedule.set(slot, t);
        Ok(())
    }

    /// The earliest `(slot, time)` pair across all channels on this entity.
    pub fn earliest(&mut self) -> Option<(ChannelSlot, f64)> {
        self.schedule.earliest()
    }

    pub fn channel_count(&self) -> usize {
        self.schedule.len()
    }

    pub fn internal_dependents(&self, slot: ChannelSlot) -> &[ChannelSlot] {
        &self.dep_graph[slot.index()]
    }

    /// World-channel slots that become stale when agent channel `slot`
    /// fires and modifies state. Empty for a world scheduler.
    pub fn l2g_dependents(&self, slot: ChannelSlot) -> &[ChannelSlot] {
        self.l2g_graph
            .as_ref()
            .map(|g| g[slot.index()].as_slice())
            .unwrap_or(&[])
    }

    /// Agent-channel slots that become stale when world channel `slot`
    /// fires and modifies state. Empty for an agent scheduler.
    pub fn g2l_dependents(&self, slot: ChannelSlot) -> &[ChannelSlot] {
        self.g2l_graph
            .as_ref()
            .map(|g| g[slot.index()].as_slice())
            .unwrap_or(&[])
    }

    pub fn sync_channels(&self) -> &[ChannelSlot] {
        &self.sync_channels
    }
}
