//! First-Method driver: a single global event-time-ordered timetable over
//! world + all live agents, firing exactly one channel per loop iteration.

use pop_core::{AgentId, CoreError, SimRng};
use pop_entity::{AgentQueue, QueueItem, World};
use pop_ipq::IndexedPriorityQueue;

use crate::error::{SimError, SimResult};
use crate::mode::{PopulationBook, PopulationMode};
use crate::observer::SimObserver;
use crate::population::Population;

pub struct FmDriver<WS, AS: Clone, O: SimObserver<WS, AS>> {
    world: World<WS, AS>,
    agents: Population<WS, AS>,
    timetable: IndexedPriorityQueue<AgentId>,
    queue: AgentQueue<WS, AS>,
    book: PopulationBook,
    do_sync: bool,
    rng: SimRng,
    observer: O,
}

impl<WS, AS: Clone, O: SimObserver<WS, AS>> FmDriver<WS, AS, O> {
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
        let mut agents = Population::new(founders);

        let mut timetable = IndexedPriorityQueue::new();
        for (id, agent) in agents.iter_live_mut() {
            timetable.add(id, agent.next_event_time())?;
        }
        world.record_size(world.clock(), n0 as f64);

        Ok(Self {
            world,
            agents,
            timetable,
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

    /// Run until the earliest pending event exceeds `tstop`.
    pub fn run(&mut self, tstop: f64) -> SimResult<()> {
        loop {
            let t_world = self.world.next_event_time();
            let top_agent = self.timetable.peek().ok();

            // World wins exact ties (authoritative tie-break).
            let fire_world = match top_agent {
                Some((_, t_agent)) => t_agent >= t_world,
                None => true,
            };
            let tmin = match top_agent {
                Some((_, t_agent)) => t_agent.min(t_world),
                None => t_world,
            };
            if tmin > tstop {
                break;
            }

            if fire_world {
                if self.do_sync {
                    self.synchronize_all(tmin)?;
                    self.drain_queue()?;
                    // A sync pass may have changed who is earliest; only
                    // proceed to fire the world if it's still the minimum.
                    let t_world2 = self.world.next_event_time();
                    if self.timetable.peek().map(|(_, t)| t < t_world2).unwrap_or(false) {
                        continue;
                    }
                }

                let agent_refs = self.agents.state_refs();
                let effects = self.world.process_next(&agent_refs)?;
                self.observer
                    .on_world_event(self.world.clock(), self.world.curr_channel_id().unwrap_or("unknown"));
                for id in effects.kills {
                    self.queue.enqueue_delete(id, self.world.clock());
                }
                self.drain_queue()?;

                if self.world.is_modified() {
                    let world_curr = self.world.curr_channel().unwrap();
                    let mut to_update = Vec::new();
                    for (id, agent) in self.agents.iter_live_mut() {
                        agent.cross_schedule_from_world(self.world.state(), world_curr, true)?;
                        to_update.push((id, agent.next_event_time()));
                    }
                    for (id, t) in to_update {
                        let _ = self.timetable.update_key(id, t);
                    }
                }

                if self.world.is_stopped() {
                    break;
                }
            } else {
                let (id, _) = top_agent.unwrap();
                if self.agents.get(id).map(|a| !a.is_enabled()).unwrap_or(true) {
                    let _ = self.timetable.remove(&id);
                    continue;
                }

                let agent = self.agents.get_mut(id).expect("checked enabled above");
                agent.process_next(id, self.world.state(), &mut self.queue)?;
                self.observer
                    .on_agent_event(agent.clock(), id, agent.curr_channel_id().unwrap_or("unknown"));
                let is_modified = agent.is_modified();
                let l2g: Vec<_> = agent.l2g_dependents().to_vec();

                self.drain_queue()?;

                if let Some(agent) = self.agents.get_mut(id) {
                    if !agent.is_enabled() {
                        let _ = self.timetable.remove(&id);
                    } else {
                        let _ = self.timetable.update_key(id, agent.next_event_time());
                        if is_modified && !l2g.is_empty() {
                            let refs = self.agents.state_refs();
                            self.world.cross_schedule_from_agent(&refs, &l2g)?;
                        }
                    }
                }
            }
        }

        let agent_refs = self.agents.state_refs();
        self.observer.on_sim_end(self.world.clock(), self.world.state(), &agent_refs);
        Ok(())
    }

    fn synchronize_all(&mut self, tbarrier: f64) -> SimResult<()> {
        let ids: Vec<AgentId> = self.agents.iter_live().map(|(id, _)| id).collect();
        for id in ids {
            let l2g = if let Some(agent) = self.agents.get_mut(id) {
                let l2g = agent.synchronize(id, self.world.state(), tbarrier, &mut self.queue)?;
                if agent.is_enabled() {
                    let t = agent.next_event_time();
                    let _ = self.timetable.update_key(id, t);
                }
                l2g
            } else {
                Vec::new()
            };
            if !l2g.is_empty() {
                let refs = self.agents.state_refs();
                self.world.cross_schedule_from_agent(&refs, &l2g)?;
            }
        }
        Ok(())
    }

    fn drain_queue(&mut self) -> SimResult<()> {
        let mut size = self.world.last_size();
        while let Some(item) = self.queue.dequeue() {
            match item {
                QueueItem::Add(mut child) => {
                    let parent = child.parent_marker().unwrap_or(AgentId::INVALID);
                    child.finalize_prev_event(self.world.state())?;
                    match self.book.mode {
                        PopulationMode::Normal => {
                            let id = self.agents.push(*child);
                            if let Some(agent) = self.agents.get_mut(id) {
                                let t = agent.next_event_time();
                                self.timetable.add(id, t)?;
                            }
                            self.book.num_agents += 1;
                            self.book.nbirths += 1;
                            size += 1.0;
                            self.observer.on_agent_born(self.world.clock(), parent, id);
                        }
                        PopulationMode::ConstantNumber => {
                            let target = self
                                .agents
                                .random_live_id(&mut self.rng, None)
                                .ok_or(SimError::PopulationCrashed)?;
                            let t = {
                                let mut tmp = *child;
                                let t = tmp.next_event_time();
                                self.agents.replace(target, tmp);
                                t
                            };
                            if self.timetable.replace_item(target, target, Some(t)).is_err() {
                                self.timetable.add(target, t)?;
                            }
                            self.book.nbirths += 1;
                            size += self.world.last_size() / self.book.num_agents_max as f64;
                            self.observer.on_agent_born(self.world.clock(), parent, target);
                        }
                    }
                }
                QueueItem::Delete(id) => match self.book.mode {
                    PopulationMode::Normal => {
                        self.agents.tombstone(id);
                        let _ = self.timetable.remove(&id);
                        self.book.num_agents -= 1;
                        if self.book.num_agents == 0 {
                            return Err(CoreError::ZeroPopulation.into());
                        }
                        self.book.ndeaths += 1;
                        size -= 1.0;
                        self.observer.on_agent_died(self.world.clock(), id);
                    }
                    PopulationMode::ConstantNumber => {
                        if self.book.num_agents <= 1 {
                            return Err(SimError::PopulationCrashed);
                        }
                        let source = self
                            .agents
                            .random_live_id(&mut self.rng, Some(id))
                            .ok_or(SimError::AgentNotFound)?;
                        let mut replacement = self
                            .agents
                            .get_mut(source)
                            .ok_or(SimError::AgentNotFound)?
                            .deep_copy();
                        let t = replacement.next_event_time();
                        self.agents.replace(id, replacement);
                        let _ = self.timetable.update_key(id, t);
                        self.book.ndeaths += 1;
                        size -= self.world.last_size() / self.book.num_agents_max as f64;
                        self.observer.on_agent_died(self.world.clock(), id);
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
        Ok(())
    }
}
