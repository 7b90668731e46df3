//! End-to-end driver tests built on hand-rolled channels rather than a full
//! `pop-model` registration.

#[cfg(test)]
mod growth {
    use pop_entity::{AgentChannel, AgentEffects, ScheduleSource};
    use pop_entity::{Agent, World};
    use pop_schedule::Scheduler;

    use crate::{AmDriver, FmDriver, NoopObserver};

    #[derive(Clone)]
    struct Counter(u32);

    /// Fires every tick, always producing exactly one child and never
    /// dying — used to drive a population from `n0` up against `nmax`.
    #[derive(Clone)]
    struct Reproduce;

    impl AgentChannel<(), Counter> for Reproduce {
        fn id(&self) -> &'static str {
            "reproduce"
        }
        fn schedule(&self, _state: &Counter, _world: &(), clock: f64, _source: ScheduleSource) -> f64 {
            clock + 1.0
        }
        fn fire(
            &mut self,
            state: &mut Counter,
            _world: &(),
            effects: &mut AgentEffects<Counter>,
            _clock: f64,
            _event_time: f64,
        ) -> bool {
            effects.clone_self(state);
            true
        }
    }

    fn founder() -> Agent<(), Counter> {
        let scheduler = Scheduler::new(0.0, vec![1.0], vec![vec![]], None, None, vec![]).unwrap();
        let channels: Vec<Box<dyn AgentChannel<(), Counter>>> = vec![Box::new(Reproduce)];
        Agent::new_founder(Counter(0), scheduler, channels, None)
    }

    fn empty_world(n0: usize) -> World<(), Counter> {
        let scheduler = Scheduler::new(0.0, vec![], vec![], None, None, vec![]).unwrap();
        World::new((), scheduler, vec![], n0)
    }

    #[test]
    fn fm_driver_normal_growth_caps_at_population_max() {
        let world = empty_world(1);
        let founders = vec![founder()];
        let mut driver = FmDriver::new(world, founders, 3, None, false, 7, NoopObserver).unwrap();

        driver.run(5.0).unwrap();

        assert_eq!(driver.population().iter_live().count(), 3);
    }

    #[test]
    fn am_driver_normal_growth_caps_at_population_max() {
        let world = empty_world(1);
        let founders = vec![founder()];
        let mut driver = AmDriver::new(world, founders, 3, None, false, 7, NoopObserver).unwrap();

        driver.run(5.0).unwrap();

        assert_eq!(driver.population().iter_live().count(), 3);
    }

    #[test]
    fn fm_driver_constant_number_substitution_preserves_identity_count() {
        let world = empty_world(2);
        let founders = vec![founder(), founder()];
        // nmax == n0: the population starts already at capacity, so every
        // birth must substitute rather than grow the slot count.
        let mut driver = FmDriver::new(world, founders, 2, None, false, 11, NoopObserver).unwrap();

        driver.run(4.0).unwrap();

        assert_eq!(driver.population().iter_live().count(), 2);
        let (_, sizes) = driver.world().trajectory();
        // The accounted size estimate still climbs under CN substitution
        // even though the live slot count never exceeds nmax.
        assert!(sizes.last().copied().unwrap_or(0.0) >= 2.0);
    }
}

#[cfg(test)]
mod crash {
    use pop_entity::{AgentChannel, AgentEffects, ScheduleSource};
    use pop_entity::{Agent, World};
    use pop_schedule::Scheduler;

    use crate::{FmDriver, NoopObserver, SimError};

    #[derive(Clone)]
    struct Unit;

    #[derive(Clone)]
    struct DieImmediately;

    impl AgentChannel<(), Unit> for DieImmediately {
        fn id(&self) -> &'static str {
            "die"
        }
        fn schedule(&self, _state: &Unit, _world: &(), clock: f64, _source: ScheduleSource) -> f64 {
            clock
        }
        fn fire(
            &mut self,
            _state: &mut Unit,
            _world: &(),
            effects: &mut AgentEffects<Unit>,
            _clock: f64,
            _event_time: f64,
        ) -> bool {
            effects.kill_self();
            false
        }
    }

    #[test]
    fn fm_driver_reports_population_crash_on_last_death() {
        let scheduler = Scheduler::new(0.0, vec![0.0], vec![vec![]], None, None, vec![]).unwrap();
        let channels: Vec<Box<dyn AgentChannel<(), Unit>>> = vec![Box::new(DieImmediately)];
        let founder = Agent::new_founder(Unit, scheduler, channels, None);

        let world_scheduler = Scheduler::new(0.0, vec![], vec![], None, None, vec![]).unwrap();
        let world = World::new((), world_scheduler, vec![], 1);

        let mut driver = FmDriver::new(world, vec![founder], 5, None, false, 3, NoopObserver).unwrap();

        let err = driver.run(1.0).unwrap_err();
        assert!(matches!(err, SimError::Core(pop_core::CoreError::ZeroPopulation)));
    }
}

#[cfg(test)]
mod poisson {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use std::cell::RefCell;

    use pop_entity::{AgentChannel, AgentEffects, ScheduleSource};
    use pop_entity::{Agent, World};
    use pop_schedule::Scheduler;

    use crate::{FmDriver, NoopObserver};

    /// Exponential-interarrival channel: `schedule` draws a fresh uniform
    /// each call and returns `clock - ln(U)/lambda`; `fire` just counts.
    /// Interior-mutable RNG since `schedule` only gets `&self`.
    #[derive(Clone)]
    struct Poisson {
        rng: RefCell<SmallRng>,
        lambda: f64,
    }

    impl AgentChannel<(), u32> for Poisson {
        fn id(&self) -> &'static str {
            "poisson"
        }
        fn schedule(&self, _state: &u32, _world: &(), clock: f64, _source: ScheduleSource) -> f64 {
            let u: f64 = self.rng.borrow_mut().r#gen();
            clock - u.ln() / self.lambda
        }
        fn fire(
            &mut self,
            state: &mut u32,
            _world: &(),
            _effects: &mut AgentEffects<u32>,
            _clock: f64,
            _event_time: f64,
        ) -> bool {
            *state += 1;
            false
        }
    }

    #[test]
    fn single_poisson_agent_counts_arrivals_to_tstop() {
        let poisson = Poisson {
            rng: RefCell::new(SmallRng::seed_from_u64(42)),
            lambda: 1.0,
        };
        let t0 = poisson.schedule(&0, &(), 0.0, ScheduleSource::None);
        let scheduler = Scheduler::new(0.0, vec![t0], vec![vec![]], None, None, vec![]).unwrap();
        let channels: Vec<Box<dyn AgentChannel<(), u32>>> = vec![Box::new(poisson)];
        let founder = Agent::new_founder(0u32, scheduler, channels, None);

        let world_scheduler = Scheduler::new(0.0, vec![], vec![], None, None, vec![]).unwrap();
        let world = World::new((), world_scheduler, vec![], 1);

        let mut driver = FmDriver::new(world, vec![founder], 5, None, false, 42, NoopObserver).unwrap();
        driver.run(10.0).unwrap();

        let agent = driver.population().get(pop_core::AgentId(0)).unwrap();
        assert!(agent.clock() <= 10.0);
        // lambda=1 over a duration of 10 gives an expected count around 10;
        // a generous band avoids flaking on the particular PRNG stream.
        assert!(*agent.state() > 0, "expected at least one arrival by t=10");
        assert!(*agent.state() < 40, "arrival count implausibly high for lambda=1");
    }
}

#[cfg(test)]
mod cross_schedule {
    use pop_core::{AgentId, ChannelSlot};
    use pop_entity::{AgentChannel, AgentEffects, ScheduleSource};
    use pop_entity::{Agent, World};
    use pop_schedule::Scheduler;

    use crate::{FmDriver, NoopObserver};

    /// Fires once, flips the agent's flag to primed, and has a single
    /// world-channel l2g dependent.
    #[derive(Clone)]
    struct Prime {
        fired: bool,
    }

    impl AgentChannel<(), bool> for Prime {
        fn id(&self) -> &'static str {
            "prime"
        }
        fn schedule(&self, _state: &bool, _world: &(), clock: f64, _source: ScheduleSource) -> f64 {
            if self.fired {
                f64::INFINITY
            } else {
                clock + 1.0
            }
        }
        fn fire(
            &mut self,
            state: &mut bool,
            _world: &(),
            _effects: &mut AgentEffects<bool>,
            _clock: f64,
            _event_time: f64,
        ) -> bool {
            *state = true;
            self.fired = true;
            true
        }
    }

    /// World channel whose next event time depends on whether any agent has
    /// been primed yet — unscheduled, it sits far in the future; once
    /// `cross_schedule_from_agent` recomputes it after `Prime` fires, it
    /// jumps forward to the agent's primed time.
    #[derive(Clone)]
    struct Census;

    impl pop_entity::WorldChannel<(), bool> for Census {
        fn id(&self) -> &'static str {
            "census"
        }
        fn schedule(&self, _world: &(), agents: &[(AgentId, &bool)], clock: f64, _source: ScheduleSource) -> f64 {
            if agents.iter().any(|(_, primed)| **primed) {
                clock + 1.0
            } else {
                100.0
            }
        }
        fn fire(
            &mut self,
            _world: &mut (),
            _agents: &[(AgentId, &bool)],
            _effects: &mut pop_entity::WorldEffects,
            _clock: f64,
            _event_time: f64,
        ) -> bool {
            true
        }
    }

    #[test]
    fn agent_fire_recomputes_dependent_world_channel_before_next_selection() {
        let l2g_graph = vec![vec![ChannelSlot(0)]];
        let scheduler = Scheduler::new(0.0, vec![1.0], vec![vec![]], Some(l2g_graph), None, vec![]).unwrap();
        let channels: Vec<Box<dyn AgentChannel<(), bool>>> = vec![Box::new(Prime { fired: false })];
        let founder = Agent::new_founder(false, scheduler, channels, None);

        let world_scheduler = Scheduler::new(0.0, vec![100.0], vec![vec![]], None, None, vec![]).unwrap();
        let world_channels: Vec<Box<dyn pop_entity::WorldChannel<(), bool>>> = vec![Box::new(Census)];
        let world = World::new((), world_scheduler, world_channels, 1);

        let mut driver = FmDriver::new(world, vec![founder], 5, None, false, 1, NoopObserver).unwrap();
        driver.run(5.0).unwrap();

        // Without the agent-to-world reschedule, the census channel would
        // stay parked at t=100 and never fire within this run's horizon.
        assert_eq!(driver.world().clock(), 1.0);
    }
}

#[cfg(test)]
mod sync_barrier {
    use pop_core::AgentId;
    use pop_entity::{AgentChannel, AgentEffects, ScheduleSource};
    use pop_entity::{Agent, World};
    use pop_schedule::Scheduler;

    use crate::{FmDriver, NoopObserver};

    #[derive(Clone, Default)]
    struct Flags {
        synced: bool,
        resumed: bool,
    }

    #[derive(Clone)]
    struct Sync {
        fired: bool,
    }

    impl AgentChannel<(), Flags> for Sync {
        fn id(&self) -> &'static str {
            "sync"
        }
        fn schedule(&self, _state: &Flags, _world: &(), clock: f64, _source: ScheduleSource) -> f64 {
            if self.fired {
                f64::INFINITY
            } else {
                clock + 1.0
            }
        }
        fn fire(
            &mut self,
            state: &mut Flags,
            _world: &(),
            _effects: &mut AgentEffects<Flags>,
            _clock: f64,
            _event_time: f64,
        ) -> bool {
            state.synced = true;
            self.fired = true;
            true
        }
    }

    #[derive(Clone)]
    struct Resume {
        fired: bool,
    }

    impl AgentChannel<(), Flags> for Resume {
        fn id(&self) -> &'static str {
            "resume"
        }
        fn schedule(&self, _state: &Flags, _world: &(), _clock: f64, _source: ScheduleSource) -> f64 {
            f64::INFINITY
        }
        fn fire(
            &mut self,
            state: &mut Flags,
            _world: &(),
            _effects: &mut AgentEffects<Flags>,
            _clock: f64,
            _event_time: f64,
        ) -> bool {
            state.resumed = true;
            self.fired = true;
            false
        }
    }

    #[derive(Clone)]
    struct WorldTick {
        fired: bool,
    }

    impl pop_entity::WorldChannel<(), Flags> for WorldTick {
        fn id(&self) -> &'static str {
            "tick"
        }
        fn schedule(&self, _world: &(), _agents: &[(AgentId, &Flags)], _clock: f64, _source: ScheduleSource) -> f64 {
            f64::INFINITY
        }
        fn fire(
            &mut self,
            _world: &mut (),
            _agents: &[(AgentId, &Flags)],
            _effects: &mut pop_entity::WorldEffects,
            _clock: f64,
            _event_time: f64,
        ) -> bool {
            self.fired = true;
            false
        }
    }

    #[test]
    fn world_event_drives_sync_barrier_before_agent_resumes_its_own_channel() {
        use pop_core::ChannelSlot;

        // Sync channel's own schedule is far beyond the barrier; the
        // barrier must still fire it exactly at t=5.0 rather than waiting
        // for that scheduled time. The non-sync channel sits at t=6.0.
        let dep_graph = vec![vec![], vec![]];
        let scheduler =
            Scheduler::new(0.0, vec![100.0, 6.0], dep_graph, None, None, vec![ChannelSlot(0)]).unwrap();
        let channels: Vec<Box<dyn AgentChannel<(), Flags>>> =
            vec![Box::new(Sync { fired: false }), Box::new(Resume { fired: false })];
        let founder = Agent::new_founder(Flags::default(), scheduler, channels, None);

        let world_scheduler = Scheduler::new(0.0, vec![5.0], vec![vec![]], None, None, vec![]).unwrap();
        let world_channels: Vec<Box<dyn pop_entity::WorldChannel<(), Flags>>> = vec![Box::new(WorldTick { fired: false })];
        let world = World::new((), world_scheduler, world_channels, 1);

        let mut driver = FmDriver::new(world, vec![founder], 1, None, true, 5, NoopObserver).unwrap();
        driver.run(6.0).unwrap();

        assert_eq!(driver.world().clock(), 5.0);
        let agent = driver.population().get(AgentId(0)).unwrap();
        assert!(agent.state().synced, "sync channel must fire at the barrier");
        assert!(agent.state().resumed, "agent must resume its own channel after the barrier");
        assert_eq!(agent.clock(), 6.0);
        assert_eq!(agent.curr_channel_id(), Some("resume"));
    }
}
