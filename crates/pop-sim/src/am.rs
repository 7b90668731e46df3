//! Asynchronous-Method driver: every live agent free-runs its own channels
//! up to a shared barrier time before the world fires, instead of a single
//! global timetable interleaving world and agent events one at a time.

use std::collections::HashSet;

use pop_core::{AgentId, ChannelSlot, CoreError, SimRng};
use pop_entity::{AgentQueue, QueueItem, World};

use crate::error::{SimError, SimResult};
use crate::mode::{PopulationBook, PopulationMode};
use crate::observer::SimObserver;
use crate::population::Population;

pub struct AmDriver<WS, AS: Clone, O: SimObserver<WS, AS>> {
    world: World<WS, AS>,
    agents: Population<WS, AS>,
    queue: AgentQueue<WS, AS>,
    book: PopulationBook,
    do_sync: bool,
    rng: SimRng,
    observer: O,
}

impl<WS, AS: Clone, O: SimObserver<WS, AS>> AmDriver<WS, AS, O> {
    pub fn new(
        mut world: World<WS, AS>,
        founders: Vec<pop_entity::Agent<WS, AS>>,
        nmax: usize,
        sizethresh_lo: Option<usize>,
        do_sync: bool,
        seed: u64,
        observer: O,
    ) -> SimResult<Self> {
        let n0 = founders.len();
        let agents = Population::new(founders);
        world.record_size(world.clock(), n0 as f64);

        Ok(Self {
            world,
            agents,
            queue: AgentQueue::new(),
            book: PopulationBook::new(n0, nmax, sizethresh_lo),
            do_sync,
            rng: SimRng::new(seed),
            observer,
        })
    }

    pub fn world(&self) -> &World<WS, AS> {
        &self.world
    }

    pub fn population(&self) -> &Population<WS, AS> {
        &self.agents
    }

    /// Run barrier-synchronized event processing until the world's own
    /// schedule exceeds `tstop`, then drain one final partial barrier up to
    /// `tstop` itself.
    pub fn run(&mut self, tstop: f64) -> SimResult<()> {
        let mut tsync = self.world.next_event_time();

        while tsync <= tstop {
            self.barrier_pass(tsync)?;

            let agent_refs = self.agents.state_refs();
            let effects = self.world.process_next(&agent_refs)?;
            self.observer
                .on_world_event(self.world.clock(), self.world.curr_channel_id().unwrap_or("unknown"));
            for id in effects.kills {
                self.queue.enqueue_delete(id, self.world.clock());
            }
            self.drain_batch()?;

            if self.world.is_stopped() {
                let agent_refs = self.agents.state_refs();
                self.observer.on_sim_end(self.world.clock(), self.world.state(), &agent_refs);
                return Ok(());
            }

            if self.world.is_modified() {
                let world_curr = self.world.curr_channel().unwrap();
                for (_, agent) in self.agents.iter_live_mut() {
                    agent.cross_schedule_from_world(self.world.state(), world_curr, true)?;
                }
            }

            tsync = self.world.next_event_time();
        }

        if tsync > tstop {
            self.barrier_pass(tstop)?;
        }

        let agent_refs = self.agents.state_refs();
        self.observer.on_sim_end(self.world.clock(), self.world.state(), &agent_refs);
        Ok(())
    }

    /// Let every live agent fire channels up to `tbound`, optionally
    /// synchronizing sync channels at the barrier, then drain the resulting
    /// births/deaths and repeat for whatever agents that drain produced
    /// until a pass yields nothing new. Every agent-to-world dependency
    /// invalidated anywhere in the pass is accumulated and applied once,
    /// right before the caller fires the world, rather than per-fire.
    fn barrier_pass(&mut self, tbound: f64) -> SimResult<()> {
        let mut not_done: Vec<AgentId> = self.agents.iter_live().map(|(id, _)| id).collect();
        let mut pending_l2g: Vec<ChannelSlot> = Vec::new();

        while !not_done.is_empty() {
            for id in &not_done {
                if let Some(agent) = self.agents.get_mut(*id) {
                    while agent.is_enabled() && agent.clock() <= tbound {
                        agent.process_next(*id, self.world.state(), &mut self.queue)?;
                        if agent.is_modified() {
                            pending_l2g.extend_from_slice(agent.l2g_dependents());
                        }
                    }
                    if self.do_sync {
                        let l2g = agent.synchronize(*id, self.world.state(), tbound, &mut self.queue)?;
                        pending_l2g.extend(l2g);
                    }
                }
            }
            not_done = self.drain_batch()?;
        }

        if !pending_l2g.is_empty() {
            let refs = self.agents.state_refs();
            self.world.cross_schedule_from_agents_async(&refs, &pending_l2g)?;
        }
        Ok(())
    }

    /// Drain the agent queue accumulated by one barrier's worth of firing.
    /// `replaced` dedups CONSTANT_NUMBER substitutions within this pass: a
    /// birth whose parent slot was already overwritten by an earlier
    /// substitution in the same pass is stale and discarded, and so is a
    /// death queued for a slot that was overwritten the same way.
    fn drain_batch(&mut self) -> SimResult<Vec<AgentId>> {
        let mut not_done = Vec::new();
        let mut replaced: HashSet<AgentId> = HashSet::new();
        let mut size = self.world.last_size();

        while let Some(item) = self.queue.dequeue() {
            match item {
                QueueItem::Add(mut child) => {
                    let parent = child.parent_marker().unwrap_or(AgentId::INVALID);
                    child.finalize_prev_event(self.world.state())?;
                    match self.book.mode {
                        PopulationMode::Normal => {
                            let id = self.agents.push(*child);
                            self.book.num_agents += 1;
                            self.book.nbirths += 1;
                            size += 1.0;
                            not_done.push(id);
                            self.observer.on_agent_born(self.world.clock(), parent, id);
                        }
                        PopulationMode::ConstantNumber => {
                            if replaced.contains(&parent) {
                                // Parent's slot was already overwritten earlier this
                                // pass; this birth's originating context is gone.
                            } else {
                                let target = self
                                    .agents
                                    .random_live_id(&mut self.rng, None)
                                    .ok_or(SimError::PopulationCrashed)?;
                                replaced.insert(target);
                                self.agents.replace(target, *child);
                                self.book.nbirths += 1;
                                size += self.world.last_size() / self.book.num_agents_max as f64;
                                not_done.push(target);
                                self.observer.on_agent_born(self.world.clock(), parent, target);
                            }
                        }
                    }
                }
                QueueItem::Delete(id) => match self.book.mode {
                    PopulationMode::Normal => {
                        self.agents.tombstone(id);
                        self.book.num_agents -= 1;
                        if self.book.num_agents == 0 {
                            return Err(CoreError::ZeroPopulation.into());
                        }
                        self.book.ndeaths += 1;
                        size -= 1.0;
                        self.observer.on_agent_died(self.world.clock(), id);
                    }
                    PopulationMode::ConstantNumber => {
                        if replaced.contains(&id) {
                            // This slot was already overwritten by a birth
                            // substitution earlier this pass; nothing to kill.
                        } else {
                            if self.book.num_agents <= 1 {
                                return Err(SimError::PopulationCrashed);
                            }
                            let source = self
                                .agents
                                .random_live_id(&mut self.rng, Some(id))
                                .ok_or(SimError::AgentNotFound)?;
                            let replacement = self
                                .agents
                                .get_mut(source)
                                .ok_or(SimError::AgentNotFound)?
                                .deep_copy();
                            self.agents.replace(id, replacement);
                            self.book.ndeaths += 1;
                            size -= self.world.last_size() / self.book.num_agents_max as f64;
                            self.observer.on_agent_died(self.world.clock(), id);
                        }
                    }
                },
            }
            if self.book.maybe_switch_up() {
                self.observer.on_mode_switch(self.world.clock(), self.book.mode);
            }
            if self.book.maybe_switch_down(size) {
                self.observer.on_mode_switch(self.world.clock(), self.book.mode);
            }
        }

        self.world.record_size(self.world.clock(), size);
        Ok(not_done)
    }
}
