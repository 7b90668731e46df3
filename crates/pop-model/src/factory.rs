//! Factory functions that turn a [`Model`] into the `World` and founder
//! `Agent`s a driver can run: deep-copy each channel prototype once per
//! entity, wire up a freshly compiled [`Topology`] into each entity's
//! `Scheduler`, and seed every channel's first putative event time before
//! handing entities off to the driver.

use pop_core::{AgentId, CoreResult};
use pop_entity::{Agent, ScheduleSource, World};
use pop_schedule::Scheduler;

use crate::model::Model;
use crate::topology::Topology;

pub struct Factories;

impl Factories {
    pub fn build<WS, AS: Clone>(model: &mut Model<WS, AS>, t_init: f64) -> CoreResult<(World<WS, AS>, Vec<Agent<WS, AS>>)> {
        let topology = Topology::compile(model)?;
        let init_fn = model.take_initializer()?;
        let (world_state, agent_states) = init_fn(model.n0());

        let mut per_agent_channels: Vec<_> = agent_states
            .iter()
            .map(|_| model.agent_channel_protos().map(|c| c.clone()).collect::<Vec<_>>())
            .collect();

        let agent_refs: Vec<(AgentId, &AS)> = agent_states
            .iter()
            .enumerate()
            .map(|(i, s)| (AgentId(i as u32), s))
            .collect();

        let world_times: Vec<f64> = model
            .world_channel_protos()
            .map(|c| c.schedule(&world_state, &agent_refs, t_init, ScheduleSource::None))
            .collect();

        let mut agent_times_per_agent = Vec::with_capacity(agent_states.len());
        for (state, channels) in agent_states.iter().zip(per_agent_channels.iter()) {
            let times: Vec<f64> = channels
                .iter()
                .map(|c| c.schedule(state, &world_state, t_init, ScheduleSource::None))
                .collect();
            agent_times_per_agent.push(times);
        }

        let world_channels: Vec<_> = model.world_channel_protos().map(|c| c.clone()).collect();
        let world_scheduler = Scheduler::new(t_init, world_times, topology.world_dep_graph.clone(), None, None, vec![])?;
        let world = World::new(world_state, world_scheduler, world_channels, model.n0());

        let mut agents = Vec::with_capacity(agent_states.len());
        for (i, (state, times)) in agent_states.into_iter().zip(agent_times_per_agent).enumerate() {
            let scheduler = Scheduler::new(
                t_init,
                times,
                topology.agent_dep_graph.clone(),
                Some(topology.l2g_graph.clone()),
                Some(topology.g2l_graph.clone()),
                topology.sync_channels.clone(),
            )?;
            let channels = std::mem::take(&mut per_agent_channels[i]);
            let logger = if model.is_logged(i) {
                Some(pop_entity::LoggerHandle::new_root())
            } else {
                None
            };
            agents.push(Agent::new_founder(state, scheduler, channels, logger));
        }

        Ok((world, agents))
    }
}
