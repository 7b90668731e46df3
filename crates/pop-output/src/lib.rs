//! `pop-output` — simulation output writers for the population-model core.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                          |
//! |-----------|---------|---------------------------------------------------------|
//! | *(none)*  | CSV     | `trajectory.csv`, `events.csv`, `lineage.csv`          |
//! | `sqlite`  | SQLite  | `output.db`                                            |
//! | `parquet` | Parquet | `trajectory.parquet`, `events.parquet`, `lineage.parquet` |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`PopOutputObserver`], which implements `pop_sim::SimObserver`. Lineage
//! export is a separate, caller-driven step via [`lineage::lineage_rows`]
//! since the observer never sees a `LoggerHandle` directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pop_output::{CsvWriter, PopOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = PopOutputObserver::new(writer);
//! let mut sim = builder.build()?; // observer is consumed by the driver
//! ```

pub mod csv;
pub mod error;
pub mod lineage;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use lineage::lineage_rows;
pub use observer::{write_trajectory, PopOutputObserver};
pub use row::{EventRow, LineageRow, TrajectoryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
