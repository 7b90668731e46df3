//! NORMAL vs. CONSTANT_NUMBER population policy and the bookkeeping shared
//! by both drivers' queue-draining step.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationMode {
    /// Births grow the population, deaths shrink it.
    Normal,
    /// The population size is held fixed: a birth substitutes for a random
    /// live agent, a death substitutes a random live agent's clone in for
    /// the dying one.
    ConstantNumber,
}

/// Size-crossing thresholds and running totals, factored out of
/// `BaseSimulator`'s per-mode dispatch so both drivers share one
/// implementation of the mode-switch rule.
pub struct PopulationBook {
    pub num_agents: usize,
    pub num_agents_max: usize,
    pub mode: PopulationMode,
    sizethresh_hi: usize,
    /// `None` disables the CONSTANT_NUMBER → NORMAL reverse transition
    /// entirely (the default).
    sizethresh_lo: Option<usize>,
    pub nbirths: u64,
    pub ndeaths: u64,
}

impl PopulationBook {
    pub fn new(n0: usize, nmax: usize, sizethresh_lo: Option<usize>) -> Self {
        let mode = if n0 < nmax {
            PopulationMode::Normal
        } else {
            PopulationMode::ConstantNumber
        };
        Self {
            num_agents: n0,
            num_agents_max: nmax,
            mode,
            sizethresh_hi: nmax,
            sizethresh_lo,
            nbirths: 0,
            ndeaths: 0,
        }
    }

    /// NORMAL → CONSTANT_NUMBER once the population fills to capacity.
    pub fn maybe_switch_up(&mut self) -> bool {
        if self.mode == PopulationMode::Normal && self.num_agents == self.sizethresh_hi {
            self.mode = PopulationMode::ConstantNumber;
            true
        } else {
            false
        }
    }

    /// CONSTANT_NUMBER → NORMAL once the (possibly fractional, under CN
    /// substitution accounting) size estimate drops to the floor.
    pub fn maybe_switch_down(&mut self, size_estimate: f64) -> bool {
        if self.mode == PopulationMode::ConstantNumber {
            if let Some(lo) = self.sizethresh_lo {
                if size_estimate <= lo as f64 {
                    self.mode = PopulationMode::Normal;
                    return true;
                }
            }
        }
        false
    }
}
