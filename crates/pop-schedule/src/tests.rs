//! Unit tests for `ChannelSchedule` and `Scheduler`.

#[cfg(test)]
mod channel_schedule {
    use pop_core::ChannelSlot;

    use crate::ChannelSchedule;

    #[test]
    fn earliest_on_empty_is_none() {
        let mut s = ChannelSchedule::new(vec![]);
        assert_eq!(s.earliest(), None);
    }

    #[test]
    fn earliest_finds_min() {
        let mut s = ChannelSchedule::new(vec![5.0, 1.0, 3.0]);
        assert_eq!(s.earliest(), Some((ChannelSlot(1), 1.0)));
    }

    #[test]
    fn write_invalidates_cache() {
        let mut s = ChannelSchedule::new(vec![5.0, 1.0, 3.0]);
        assert_eq!(s.earliest().unwrap().1, 1.0);
        s.set(ChannelSlot(1), 9.0);
        assert_eq!(s.earliest().unwrap().1, 3.0);
    }

    #[test]
    fn infinity_is_a_legal_event_time() {
        let mut s = ChannelSchedule::new(vec![f64::INFINITY, f64::INFINITY, 2.0]);
        assert_eq!(s.earliest(), Some((ChannelSlot(2), 2.0)));
    }
}

#[cfg(test)]
mod scheduler {
    use pop_core::ChannelSlot;

    use crate::Scheduler;

    fn empty_graph(n: usize) -> Vec<Vec<ChannelSlot>> {
        vec![Vec::new(); n]
    }

    #[test]
    fn rejects_initial_time_before_t_init() {
        let result = Scheduler::new(5.0, vec![4.0], empty_graph(1), None, None, vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_nan_t_init() {
        let result = Scheduler::new(f64::NAN, vec![], empty_graph(0), None, None, vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_sync_channel_depending_on_sync_channel() {
        // channel 0 is a sync channel whose internal dependent is channel 1,
        // also declared a sync channel.
        let mut graph = empty_graph(2);
        graph[0] = vec![ChannelSlot(1)];
        let result = Scheduler::new(
            0.0,
            vec![1.0, 1.0],
            graph,
            None,
            None,
            vec![ChannelSlot(0), ChannelSlot(1)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn set_event_time_rejects_past() {
        let mut sched = Scheduler::new(0.0, vec![1.0], empty_graph(1), None, None, vec![]).unwrap();
        sched.advance_clock(1.0);
        assert!(sched.set_event_time(ChannelSlot(0), 0.5).is_err());
        assert!(sched.set_event_time(ChannelSlot(0), 1.0).is_ok());
    }

    #[test]
    fn clone_is_independent() {
        let sched = Scheduler::new(0.0, vec![1.0, 2.0], empty_graph(2), None, None, vec![]).unwrap();
        let mut clone = sched.clone();
        clone.set_event_time(ChannelSlot(0), 3.0).unwrap();
        assert_eq!(sched.event_time(ChannelSlot(0)), 1.0);
        assert_eq!(clone.event_time(ChannelSlot(0)), 3.0);
    }

    #[test]
    fn l2g_and_g2l_default_empty() {
        let sched = Scheduler::new(0.0, vec![1.0], empty_graph(1), None, None, vec![]).unwrap();
        assert!(sched.l2g_dependents(ChannelSlot(0)).is_empty());
        assert!(sched.g2l_dependents(ChannelSlot(0)).is_empty());
    }
}
