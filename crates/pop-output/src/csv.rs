//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `trajectory.csv`
//! - `events.csv`
//! - `lineage.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EventRow, LineageRow, OutputResult, TrajectoryRow};

fn opt_u32(v: Option<u32>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn opt_str(v: Option<&'static str>) -> &'static str {
    v.unwrap_or("")
}

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    trajectory: Writer<File>,
    events: Writer<File>,
    lineage: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut trajectory = Writer::from_path(dir.join("trajectory.csv"))?;
        trajectory.write_record(["time", "size"])?;

        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(["time", "kind", "agent_id", "related_id", "channel"])?;

        let mut lineage = Writer::from_path(dir.join("lineage.csv"))?;
        lineage.write_record(["node", "parent_node"])?;

        Ok(Self {
            trajectory,
            events,
            lineage,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_trajectory(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()> {
        for row in rows {
            self.trajectory.write_record(&[row.time.to_string(), row.size.to_string()])?;
        }
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.time.to_string(),
                row.kind.to_string(),
                opt_u32(row.agent_id),
                opt_u32(row.related_id),
                opt_str(row.channel).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_lineage(&mut self, rows: &[LineageRow]) -> OutputResult<()> {
        for row in rows {
            self.lineage.write_record(&[row.node.to_string(), opt_u32(row.parent_node)])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.trajectory.flush()?;
        self.events.flush()?;
        self.lineage.flush()?;
        Ok(())
    }
}
