//! Per-entity mapping from channel slot to next event time.
//!
//! Backed by a flat `Vec<f64>` indexed by [`ChannelSlot`] rather than a
//! hash map — per-entity channel counts are small (tens), so a linear scan
//! to find the minimum is cheaper than maintaining a heap here; the
//! expensive global minimum lives one level up, in the IPQ. The minimum is
//! cached and invalidated on every write via a dirty flag.

use pop_core::ChannelSlot;

#[derive(Clone)]
pub struct ChannelSchedule {
    times: Vec<f64>,
    cached_min: Option<(ChannelSlot, f64)>,
}

impl ChannelSchedule {
    pub fn new(times: Vec<f64>) -> Self {
        Self {
            times,
            cached_min: None,
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn get(&self, slot: ChannelSlot) -> f64 {
        self.times[slot.index()]
    }

    /// Overwrite the event time for `slot`, invalidating the cached minimum.
    pub fn set(&mut self, slot: ChannelSlot, t: f64) {
        self.times[slot.index()] = t;
        self.cached_min = None;
    }

    /// The `(slot, time)` pair with the smallest time, recomputed by linear
    /// scan if the cache is dirty. `None` only when the schedule is empty.
    pub fn earliest(&mut self) -> Option<(ChannelSlot, f64)> {
        if self.cached_min.is_none() {
            self.cached_min = self
                .times
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.partial_cmp(b.1).expect("event times are never NaN"))
                .map(|(i, &t)| (ChannelSlot::try_from(i).expect("channel count fits u32"), t));
        }
        self.cached_min
    }
}
