//! Parquet output backend (feature `parquet`).
//!
//! Creates three files in the configured output directory:
//! - `trajectory.parquet`
//! - `events.parquet`
//! - `lineage.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, StringBuilder, UInt32Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{EventRow, LineageRow, OutputResult, TrajectoryRow};

fn trajectory_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("time", DataType::Float64, false),
        Field::new("size", DataType::Float64, false),
    ]))
}

fn events_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("time", DataType::Float64, false),
        Field::new("kind", DataType::Utf8, false),
        Field::new("agent_id", DataType::UInt32, true),
        Field::new("related_id", DataType::UInt32, true),
        Field::new("channel", DataType::Utf8, true),
    ]))
}

fn lineage_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("node", DataType::UInt32, false),
        Field::new("parent_node", DataType::UInt32, true),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

/// Writes simulation output to three Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    trajectory: Option<ArrowWriter<File>>,
    events: Option<ArrowWriter<File>>,
    lineage: Option<ArrowWriter<File>>,
    traj_schema: Arc<Schema>,
    event_schema: Arc<Schema>,
    lineage_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create all three Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let traj_schema = trajectory_schema();
        let event_schema = events_schema();
        let lineage_schema = lineage_schema();

        let traj_file = File::create(dir.join("trajectory.parquet"))?;
        let trajectory = ArrowWriter::try_new(traj_file, Arc::clone(&traj_schema), Some(snappy_props()))?;

        let event_file = File::create(dir.join("events.parquet"))?;
        let events = ArrowWriter::try_new(event_file, Arc::clone(&event_schema), Some(snappy_props()))?;

        let lineage_file = File::create(dir.join("lineage.parquet"))?;
        let lineage = ArrowWriter::try_new(lineage_file, Arc::clone(&lineage_schema), Some(snappy_props()))?;

        Ok(Self {
            trajectory: Some(trajectory),
            events: Some(events),
            lineage: Some(lineage),
            traj_schema,
            event_schema,
            lineage_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_trajectory(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.trajectory.as_mut() else {
            return Ok(());
        };

        let mut times = Float64Builder::new();
        let mut sizes = Float64Builder::new();
        for row in rows {
            times.append_value(row.time);
            sizes.append_value(row.size);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.traj_schema),
            vec![Arc::new(times.finish()), Arc::new(sizes.finish())],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.events.as_mut() else {
            return Ok(());
        };

        let mut times = Float64Builder::new();
        let mut kinds = StringBuilder::new();
        let mut agent_ids = UInt32Builder::new();
        let mut related_ids = UInt32Builder::new();
        let mut channels = StringBuilder::new();

        for row in rows {
            times.append_value(row.time);
            kinds.append_value(row.kind);
            agent_ids.append_option(row.agent_id);
            related_ids.append_option(row.related_id);
            channels.append_option(row.channel);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.event_schema),
            vec![
                Arc::new(times.finish()),
                Arc::new(kinds.finish()),
                Arc::new(agent_ids.finish()),
                Arc::new(related_ids.finish()),
                Arc::new(channels.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_lineage(&mut self, rows: &[LineageRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.lineage.as_mut() else {
            return Ok(());
        };

        let mut nodes = UInt32Builder::new();
        let mut parents = UInt32Builder::new();
        for row in rows {
            nodes.append_value(row.node);
            parents.append_option(row.parent_node);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.lineage_schema),
            vec![Arc::new(nodes.finish()), Arc::new(parents.finish())],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.trajectory.take() {
            w.close()?;
        }
        if let Some(w) = self.events.take() {
            w.close()?;
        }
        if let Some(w) = self.lineage.take() {
            w.close()?;
        }
        Ok(())
    }
}
