//! First-Method and Asynchronous-Method simulation drivers over the
//! `pop-entity`/`pop-model` core: the loops that actually run a model to
//! completion, plus the population bookkeeping (NORMAL/CONSTANT_NUMBER) and
//! observer hook shared by both.

mod am;
mod builder;
mod error;
mod fm;
mod mode;
mod observer;
mod population;

#[cfg(test)]
mod tests;

pub use am::AmDriver;
pub use builder::{DriverKind, Sim, SimBuilder};
pub use error::{SimError, SimResult};
pub use fm::FmDriver;
pub use mode::{PopulationBook, PopulationMode};
pub use observer::{NoopObserver, SimObserver};
pub use population::Population;
