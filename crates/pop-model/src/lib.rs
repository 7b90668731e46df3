//! Declarative model registry and the factories that turn it into a runnable
//! `World`/`Agent` population.
//!
//! | module      | contents                                              |
//! |-------------|--------------------------------------------------------|
//! | `model`     | `Model`, the channel/initializer/logger/recorder registry |
//! | `topology`  | compiles by-name dependency declarations into index graphs |
//! | `factory`   | `Factories::build`, instantiating `World`/`Agent`s from a `Model` |
//! | `recorder`  | `Recorder` trait, the population-level observer seam   |

mod factory;
mod model;
mod recorder;
mod topology;

#[cfg(test)]
mod tests;

pub use factory::Factories;
pub use model::{InitFn, Model};
pub use recorder::Recorder;
pub use topology::Topology;
