//! `Model`: the declarative registry a simulation run is built from.
//!
//! An initializer, a table of world channels, a table of agent channels
//! (each instance is copied once per agent by the factory), an optional set
//! of tracked founder lineages, and a list of population-level recorders.
//! Validation (duplicate names, dependency references to channels that
//! don't exist) happens at registration time and at
//! [`crate::Topology::compile`], not deep inside the run loop.

use rustc_hash::FxHashMap;

use pop_core::{ChannelSlot, CoreError, CoreResult};
use pop_entity::{AgentChannel, WorldChannel};

use crate::recorder::Recorder;

pub(crate) struct WorldChannelEntry<WS, AS> {
    pub(crate) channel: Box<dyn WorldChannel<WS, AS>>,
    pub(crate) wc_dependents: Vec<String>,
    pub(crate) ac_dependents: Vec<String>,
}

pub(crate) struct AgentChannelEntry<WS, AS> {
    pub(crate) channel: Box<dyn AgentChannel<WS, AS>>,
    pub(crate) wc_dependents: Vec<String>,
    pub(crate) ac_dependents: Vec<String>,
    pub(crate) sync: bool,
}

/// A user-supplied function that builds the initial world state and the
/// `n0` founder agent states. State is a concrete, strongly typed struct
/// rather than a dynamic name-tagged bag of variables.
pub type InitFn<WS, AS> = Box<dyn FnOnce(usize) -> (WS, Vec<AS>)>;

pub struct Model<WS, AS: Clone> {
    n0: usize,
    nmax: usize,
    initializer: Option<InitFn<WS, AS>>,
    world_channels: Vec<WorldChannelEntry<WS, AS>>,
    agent_channels: Vec<AgentChannelEntry<WS, AS>>,
    world_index: FxHashMap<String, usize>,
    agent_index: FxHashMap<String, usize>,
    logged: FxHashMap<usize, ()>,
    recorders: Vec<Box<dyn Recorder<WS, AS>>>,
}

impl<WS, AS: Clone> Model<WS, AS> {
    pub fn new(n0: usize, nmax: usize) -> CoreResult<Self> {
        if n0 > nmax {
            return Err(CoreError::Simulation(
                "initial population must not exceed the maximum population".into(),
            ));
        }
        Ok(Self {
            n0,
            nmax,
            initializer: None,
            world_channels: Vec::new(),
            agent_channels: Vec::new(),
            world_index: FxHashMap::default(),
            agent_index: FxHashMap::default(),
            logged: FxHashMap::default(),
            recorders: Vec::new(),
        })
    }

    pub fn n0(&self) -> usize {
        self.n0
    }

    pub fn nmax(&self) -> usize {
        self.nmax
    }

    pub fn add_initializer(&mut self, f: impl FnOnce(usize) -> (WS, Vec<AS>) + 'static) {
        self.initializer = Some(Box::new(f));
    }

    pub fn add_world_channel(
        &mut self,
        name: impl Into<String>,
        channel: impl WorldChannel<WS, AS> + 'static,
        wc_dependents: Vec<String>,
        ac_dependents: Vec<String>,
    ) -> CoreResult<()> {
        let name = name.into();
        if self.world_index.contains_key(&name) {
            return Err(CoreError::Simulation(format!(
                "a world channel named '{name}' is already registered"
            )));
        }
        let slot = self.world_channels.len();
        self.world_index.insert(name, slot);
        self.world_channels.push(WorldChannelEntry {
            channel: Box::new(channel),
            wc_dependents,
            ac_dependents,
        });
        Ok(())
    }

    pub fn add_agent_channel(
        &mut self,
        name: impl Into<String>,
        channel: impl AgentChannel<WS, AS> + 'static,
        wc_dependents: Vec<String>,
        ac_dependents: Vec<String>,
        sync: bool,
    ) -> CoreResult<()> {
        let name = name.into();
        if self.agent_index.contains_key(&name) {
            return Err(CoreError::Simulation(format!(
                "an agent channel named '{name}' is already registered"
            )));
        }
        let slot = self.agent_channels.len();
        self.agent_index.insert(name, slot);
        self.agent_channels.push(AgentChannelEntry {
            channel: Box::new(channel),
            wc_dependents,
            ac_dependents,
            sync,
        });
        Ok(())
    }

    /// Track the lineage descended from founder `agent_index`. Bound is
    /// `0 <= agent_index < nmax`, not `n0`, since a CONSTANT_NUMBER
    /// substitution can route a birth into any slot up to the ceiling.
    pub fn add_logger(&mut self, agent_index: usize) -> CoreResult<()> {
        if agent_index >= self.nmax {
            return Err(CoreError::Simulation(format!(
                "lineage index {agent_index} is out of range (nmax={})",
                self.nmax
            )));
        }
        self.logged.insert(agent_index, ());
        Ok(())
    }

    pub fn is_logged(&self, agent_index: usize) -> bool {
        self.logged.contains_key(&agent_index)
    }

    pub fn add_recorder(&mut self, recorder: impl Recorder<WS, AS> + 'static) {
        self.recorders.push(Box::new(recorder));
    }

    pub fn recorders_mut(&mut self) -> &mut [Box<dyn Recorder<WS, AS>>] {
        &mut self.recorders
    }

    pub(crate) fn take_initializer(&mut self) -> CoreResult<InitFn<WS, AS>> {
        self.initializer
            .take()
            .ok_or_else(|| CoreError::Simulation("model has no initializer registered".into()))
    }

    pub(crate) fn world_channel_count(&self) -> usize {
        self.world_channels.len()
    }

    pub(crate) fn agent_channel_count(&self) -> usize {
        self.agent_channels.len()
    }

    pub(crate) fn world_channels(&self) -> impl Iterator<Item = &WorldChannelEntry<WS, AS>> {
        self.world_channels.iter()
    }

    pub(crate) fn agent_channels(&self) -> impl Iterator<Item = &AgentChannelEntry<WS, AS>> {
        self.agent_channels.iter()
    }

    pub(crate) fn world_channel_protos(&self) -> impl Iterator<Item = &Box<dyn WorldChannel<WS, AS>>> {
        self.world_channels.iter().map(|e| &e.channel)
    }

    pub(crate) fn agent_channel_protos(&self) -> impl Iterator<Item = &Box<dyn AgentChannel<WS, AS>>> {
        self.agent_channels.iter().map(|e| &e.channel)
    }

    pub(crate) fn world_slot(&self, name: &str) -> CoreResult<ChannelSlot> {
        self.world_index
            .get(name)
            .map(|&i| ChannelSlot(i as u32))
            .ok_or_else(|| CoreError::Simulation(format!("no world channel named '{name}'")))
    }

    pub(crate) fn agent_slot(&self, name: &str) -> CoreResult<ChannelSlot> {
        self.agent_index
            .get(name)
            .map(|&i| ChannelSlot(i as u32))
            .ok_or_else(|| CoreError::Simulation(format!("no agent channel named '{name}'")))
    }
}
