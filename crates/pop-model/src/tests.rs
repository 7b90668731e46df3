//! Unit tests for `Model` registration, `Topology` compilation, and the
//! `Factories::build` pipeline.

#[cfg(test)]
mod registration {
    use crate::Model;

    type WS = u32;
    type AS = u32;

    #[derive(Clone)]
    struct NoopAgentChannel;
    impl pop_entity::AgentChannel<WS, AS> for NoopAgentChannel {
        fn id(&self) -> &'static str {
            "noop"
        }
        fn schedule(&self, _s: &AS, _w: &WS, clock: f64, _src: pop_entity::ScheduleSource) -> f64 {
            clock + 1.0
        }
        fn fire(
            &mut self,
            _s: &mut AS,
            _w: &WS,
            _e: &mut pop_entity::AgentEffects<AS>,
            _clock: f64,
            _t: f64,
        ) -> bool {
            false
        }
    }

    #[derive(Clone)]
    struct NoopWorldChannel;
    impl pop_entity::WorldChannel<WS, AS> for NoopWorldChannel {
        fn id(&self) -> &'static str {
            "noop-world"
        }
        fn schedule(&self, _w: &WS, _a: &[(pop_core::AgentId, &AS)], clock: f64, _src: pop_entity::ScheduleSource) -> f64 {
            clock + 1.0
        }
        fn fire(
            &mut self,
            _w: &mut WS,
            _a: &[(pop_core::AgentId, &AS)],
            _e: &mut pop_entity::WorldEffects,
            _clock: f64,
            _t: f64,
        ) -> bool {
            false
        }
    }

    #[test]
    fn rejects_n0_greater_than_nmax() {
        assert!(Model::<WS, AS>::new(10, 5).is_err());
    }

    #[test]
    fn rejects_duplicate_channel_names() {
        let mut model = Model::<WS, AS>::new(1, 1).unwrap();
        model.add_agent_channel("a", NoopAgentChannel, vec![], vec![], false).unwrap();
        let err = model.add_agent_channel("a", NoopAgentChannel, vec![], vec![], false);
        assert!(err.is_err());
    }

    #[test]
    fn logger_index_must_be_within_nmax() {
        let mut model = Model::<WS, AS>::new(2, 4).unwrap();
        assert!(model.add_logger(3).is_ok());
        assert!(model.add_logger(4).is_err());
    }

    #[test]
    fn world_channel_rejects_wrong_type_name_clash() {
        let mut model = Model::<WS, AS>::new(1, 1).unwrap();
        model.add_world_channel("w", NoopWorldChannel, vec![], vec![]).unwrap();
        assert!(model.add_world_channel("w", NoopWorldChannel, vec![], vec![]).is_err());
    }
}

#[cfg(test)]
mod topology {
    use crate::{Model, Topology};
    use pop_core::{AgentId, ChannelSlot};
    use pop_entity::{AgentChannel, AgentEffects, ScheduleSource, WorldChannel, WorldEffects};

    type WS = u32;
    type AS = u32;

    #[derive(Clone)]
    struct A;
    impl AgentChannel<WS, AS> for A {
        fn id(&self) -> &'static str {
            "a"
        }
        fn schedule(&self, _s: &AS, _w: &WS, clock: f64, _src: ScheduleSource) -> f64 {
            clock + 1.0
        }
        fn fire(&mut self, _s: &mut AS, _w: &WS, _e: &mut AgentEffects<AS>, _clock: f64, _t: f64) -> bool {
            true
        }
    }

    #[derive(Clone)]
    struct B;
    impl AgentChannel<WS, AS> for B {
        fn id(&self) -> &'static str {
            "b"
        }
        fn schedule(&self, _s: &AS, _w: &WS, clock: f64, _src: ScheduleSource) -> f64 {
            clock + 1.0
        }
        fn fire(&mut self, _s: &mut AS, _w: &WS, _e: &mut AgentEffects<AS>, _clock: f64, _t: f64) -> bool {
            false
        }
    }

    #[derive(Clone)]
    struct Census;
    impl WorldChannel<WS, AS> for Census {
        fn id(&self) -> &'static str {
            "census"
        }
        fn schedule(&self, _w: &WS, _a: &[(AgentId, &AS)], clock: f64, _src: ScheduleSource) -> f64 {
            clock + 1.0
        }
        fn fire(&mut self, _w: &mut WS, _a: &[(AgentId, &AS)], _e: &mut WorldEffects, _clock: f64, _t: f64) -> bool {
            true
        }
    }

    #[test]
    fn resolves_ac_dependents_into_agent_dep_graph() {
        let mut model = Model::<WS, AS>::new(1, 1).unwrap();
        // "a" fires and invalidates "b".
        model.add_agent_channel("a", A, vec![], vec!["b".into()], false).unwrap();
        model.add_agent_channel("b", B, vec![], vec![], false).unwrap();

        let topo = Topology::compile(&model).unwrap();
        assert_eq!(topo.agent_dep_graph[0], vec![ChannelSlot(1)]);
        assert!(topo.agent_dep_graph[1].is_empty());
    }

    #[test]
    fn resolves_wc_dependents_into_l2g_graph() {
        let mut model = Model::<WS, AS>::new(1, 1).unwrap();
        model.add_world_channel("census", Census, vec![], vec![]).unwrap();
        model.add_agent_channel("a", A, vec!["census".into()], vec![], false).unwrap();

        let topo = Topology::compile(&model).unwrap();
        assert_eq!(topo.l2g_graph[0], vec![ChannelSlot(0)]);
    }

    #[test]
    fn unknown_dependent_name_is_an_error() {
        let mut model = Model::<WS, AS>::new(1, 1).unwrap();
        model.add_agent_channel("a", A, vec![], vec!["ghost".into()], false).unwrap();
        assert!(Topology::compile(&model).is_err());
    }

    #[test]
    fn sync_channel_cannot_depend_on_another_sync_channel() {
        let mut model = Model::<WS, AS>::new(1, 1).unwrap();
        model.add_agent_channel("a", A, vec![], vec!["b".into()], true).unwrap();
        model.add_agent_channel("b", B, vec![], vec![], true).unwrap();
        assert!(Topology::compile(&model).is_err());
    }
}

#[cfg(test)]
mod factory {
    use crate::{Factories, Model};
    use pop_core::AgentId;
    use pop_entity::{AgentChannel, AgentEffects, ScheduleSource, WorldChannel, WorldEffects};

    type WS = u32;

    #[derive(Clone, Debug, PartialEq)]
    struct Individual {
        age: f64,
    }

    #[derive(Clone)]
    struct Age;
    impl AgentChannel<WS, Individual> for Age {
        fn id(&self) -> &'static str {
            "age"
        }
        fn schedule(&self, _s: &Individual, _w: &WS, clock: f64, _src: ScheduleSource) -> f64 {
            clock + 1.0
        }
        fn fire(
            &mut self,
            state: &mut Individual,
            _w: &WS,
            _e: &mut AgentEffects<Individual>,
            _clock: f64,
            _t: f64,
        ) -> bool {
            state.age += 1.0;
            false
        }
    }

    #[derive(Clone)]
    struct Census;
    impl WorldChannel<WS, Individual> for Census {
        fn id(&self) -> &'static str {
            "census"
        }
        fn schedule(&self, _w: &WS, _a: &[(AgentId, &Individual)], clock: f64, _src: ScheduleSource) -> f64 {
            clock + 1.0
        }
        fn fire(
            &mut self,
            world: &mut WS,
            agents: &[(AgentId, &Individual)],
            _e: &mut WorldEffects,
            _clock: f64,
            _t: f64,
        ) -> bool {
            *world = agents.len() as u32;
            true
        }
    }

    #[test]
    fn builds_world_and_founder_agents_with_seeded_schedules() {
        let mut model = Model::<WS, Individual>::new(3, 10).unwrap();
        model.add_initializer(|n| (0u32, vec![Individual { age: 0.0 }; n]));
        model.add_world_channel("census", Census, vec![], vec![]).unwrap();
        model.add_agent_channel("age", Age, vec![], vec![], false).unwrap();
        model.add_logger(0).unwrap();

        let (world, agents) = Factories::build(&mut model, 0.0).unwrap();

        assert_eq!(agents.len(), 3);
        assert_eq!(*world.state(), 0);
        assert!(agents[0].logger().is_some());
        assert!(agents[1].logger().is_none());
        for agent in &agents {
            assert_eq!(agent.clock(), 0.0);
        }
    }
}
