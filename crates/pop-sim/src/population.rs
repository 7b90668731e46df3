//! `Population`: a stable-identity slot map over live agents.
//!
//! A `Vec` with compacting removal would invalidate every other `AgentId`
//! still referenced by the timetable and the dependency graphs, so slots
//! are never compacted: a NORMAL-mode death tombstones its slot, and a
//! CONSTANT_NUMBER substitution overwrites a slot's contents in place while
//! keeping its `AgentId`.

use pop_core::AgentId;
use pop_entity::Agent;

pub struct Population<WS, AS: Clone> {
    slots: Vec<Option<Agent<WS, AS>>>,
}

impl<WS, AS: Clone> Population<WS, AS> {
    pub fn new(founders: Vec<Agent<WS, AS>>) -> Self {
        Self {
            slots: founders.into_iter().map(Some).collect(),
        }
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent<WS, AS>> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent<WS, AS>> {
        self.slots.get_mut(id.index()).and_then(|s| s.as_mut())
    }

    /// Append a new slot (NORMAL-mode birth). Returns its fresh id.
    pub fn push(&mut self, agent: Agent<WS, AS>) -> AgentId {
        let id = AgentId(self.slots.len() as u32);
        self.slots.push(Some(agent));
        id
    }

    /// Clear a slot without compacting (NORMAL-mode death).
    pub fn tombstone(&mut self, id: AgentId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            *slot = None;
        }
    }

    /// Overwrite a slot's contents, keeping its id (CONSTANT_NUMBER
    /// substitution, birth or death).
    pub fn replace(&mut self, id: AgentId, agent: Agent<WS, AS>) {
        self.slots[id.index()] = Some(agent);
    }

    pub fn iter_live(&self) -> impl Iterator<Item = (AgentId, &Agent<WS, AS>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|a| (AgentId(i as u32), a)))
    }

    pub fn iter_live_mut(&mut self) -> impl Iterator<Item = (AgentId, &mut Agent<WS, AS>)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|a| (AgentId(i as u32), a)))
    }

    pub fn state_refs(&self) -> Vec<(AgentId, &AS)> {
        self.iter_live().map(|(id, a)| (id, a.state())).collect()
    }

    /// Pick a uniformly random live slot id, distinct from `excluding` when
    /// more than one live agent exists.
    pub fn random_live_id(&self, rng: &mut pop_core::SimRng, excluding: Option<AgentId>) -> Option<AgentId> {
        let live: Vec<AgentId> = self.iter_live().map(|(id, _)| id).collect();
        if live.is_empty() {
            return None;
        }
        if live.len() == 1 {
            return Some(live[0]);
        }
        loop {
            let pick = live[rng.gen_index(live.len())];
            if Some(pick) != excluding {
                return Some(pick);
            }
        }
    }
}
