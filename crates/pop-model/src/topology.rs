//! Compiles a [`crate::Model`]'s by-name dependency declarations into the
//! index-based graphs `pop-schedule::Scheduler` consumes.
//!
//! A channel's `wc_dependents`/`ac_dependents` list the *other* channels
//! that must be rescheduled when it fires. Compiling by name once at
//! model-build time means every per-agent `Scheduler` clone shares the same
//! graph without re-validating names per agent.

use pop_core::{ChannelSlot, CoreError, CoreResult};
use pop_schedule::DepGraph;

use crate::model::Model;

/// The graphs and sync-channel list shared by every entity `Scheduler`
/// instantiated from one model.
pub struct Topology {
    pub world_dep_graph: DepGraph,
    pub agent_dep_graph: DepGraph,
    /// Agent-channel slot → world-channel slots it invalidates.
    pub l2g_graph: DepGraph,
    /// World-channel slot → agent-channel slots it invalidates.
    pub g2l_graph: DepGraph,
    pub sync_channels: Vec<ChannelSlot>,
}

impl Topology {
    pub fn compile<WS, AS: Clone>(model: &Model<WS, AS>) -> CoreResult<Self> {
        let n_world = model.world_channel_count();
        let n_agent = model.agent_channel_count();

        let mut world_dep_graph: DepGraph = vec![Vec::new(); n_world];
        let mut g2l_graph: DepGraph = vec![Vec::new(); n_world];
        for (i, entry) in model.world_channels().enumerate() {
            for name in &entry.wc_dependents {
                let slot = model.world_slot(name)?;
                world_dep_graph[i].push(slot);
            }
            for name in &entry.ac_dependents {
                let slot = model.agent_slot(name)?;
                g2l_graph[i].push(slot);
            }
        }

        let mut agent_dep_graph: DepGraph = vec![Vec::new(); n_agent];
        let mut l2g_graph: DepGraph = vec![Vec::new(); n_agent];
        let mut sync_channels = Vec::new();
        for (i, entry) in model.agent_channels().enumerate() {
            for name in &entry.ac_dependents {
                let slot = model.agent_slot(name)?;
                agent_dep_graph[i].push(slot);
            }
            for name in &entry.wc_dependents {
                let slot = model.world_slot(name)?;
                l2g_graph[i].push(slot);
            }
            if entry.sync {
                sync_channels.push(ChannelSlot(i as u32));
            }
        }

        let sync_set: std::collections::HashSet<ChannelSlot> = sync_channels.iter().copied().collect();
        for &s in &sync_channels {
            for dep in &agent_dep_graph[s.index()] {
                if sync_set.contains(dep) {
                    return Err(CoreError::Simulation(format!(
                        "sync channel {s:?} has sync channel {dep:?} as an internal dependent"
                    )));
                }
            }
        }

        Ok(Self {
            world_dep_graph,
            agent_dep_graph,
            l2g_graph,
            g2l_graph,
            sync_channels,
        })
    }
}
