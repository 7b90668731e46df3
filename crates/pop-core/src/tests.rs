//! Unit tests for pop-core primitives.

#[cfg(test)]
mod ids {
    use crate::AgentId;

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
    }

    #[test]
    fn invalid_sentinel_is_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::time::{check_clock, check_scheduled};
    use crate::SimConfig;

    #[test]
    fn rejects_nan_clock() {
        assert!(check_clock(f64::NAN).is_err());
        assert!(check_clock(0.0).is_ok());
        assert!(check_clock(f64::INFINITY).is_ok());
    }

    #[test]
    fn rejects_event_time_before_clock() {
        assert!(check_scheduled("c", 5.0, 4.9).is_err());
        assert!(check_scheduled("c", 5.0, 5.0).is_ok());
        assert!(check_scheduled("c", 5.0, f64::INFINITY).is_ok());
    }

    #[test]
    fn default_config_disables_reverse_transition() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.constant_number_floor, None);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng};
    use rand::Rng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            let a: f32 = r1.random();
            let b: f32 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent agents should diverge");
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = AgentRng::new(0, AgentId(0));
        for _ in 0..1000 {
            let v = rng.gen_range(0.0f64..1.0);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn sim_rng_index_in_bounds() {
        let mut rng = SimRng::new(7);
        for _ in 0..1000 {
            let i = rng.gen_index(5);
            assert!(i < 5);
        }
    }

    #[test]
    fn sim_rng_child_diverges() {
        let mut root = SimRng::new(1);
        let mut a = root.child(1);
        let mut b = root.child(2);
        let x: u64 = a.inner().r#gen();
        let y: u64 = b.inner().r#gen();
        assert_ne!(x, y);
    }
}
