//! `PopOutputObserver<W>` — bridges `pop_sim::SimObserver` to an
//! `OutputWriter`. Errors from the writer have no channel back through the
//! observer callbacks, so the first one is stashed and surfaced after the
//! run.

use pop_core::AgentId;
use pop_sim::{PopulationMode, SimObserver};

use crate::row::{EventRow, TrajectoryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes every driver event to an [`OutputWriter`]
/// backend (CSV, SQLite, Parquet, …), plus the final trajectory sample on
/// [`on_sim_end`][SimObserver::on_sim_end].
pub struct PopOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> PopOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `driver.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }

    fn mode_label(mode: PopulationMode) -> &'static str {
        match mode {
            PopulationMode::Normal => "normal",
            PopulationMode::ConstantNumber => "constant_number",
        }
    }
}

impl<WS, AS, W: OutputWriter> SimObserver<WS, AS> for PopOutputObserver<W> {
    fn on_world_event(&mut self, time: f64, channel_id: &'static str) {
        let row = EventRow {
            time,
            kind: "world",
            agent_id: None,
            related_id: None,
            channel: Some(channel_id),
        };
        let result = self.writer.write_events(&[row]);
        self.store_err(result);
    }

    fn on_agent_event(&mut self, time: f64, agent: AgentId, channel_id: &'static str) {
        let row = EventRow {
            time,
            kind: "agent",
            agent_id: Some(agent.0),
            related_id: None,
            channel: Some(channel_id),
        };
        let result = self.writer.write_events(&[row]);
        self.store_err(result);
    }

    fn on_agent_born(&mut self, time: f64, parent: AgentId, child: AgentId) {
        let row = EventRow {
            time,
            kind: "birth",
            agent_id: Some(child.0),
            related_id: Some(parent.0),
            channel: None,
        };
        let result = self.writer.write_events(&[row]);
        self.store_err(result);
    }

    fn on_agent_died(&mut self, time: f64, agent: AgentId) {
        let row = EventRow {
            time,
            kind: "death",
            agent_id: Some(agent.0),
            related_id: None,
            channel: None,
        };
        let result = self.writer.write_events(&[row]);
        self.store_err(result);
    }

    fn on_mode_switch(&mut self, time: f64, mode: PopulationMode) {
        let row = EventRow {
            time,
            kind: "mode_switch",
            agent_id: None,
            related_id: None,
            channel: Some(Self::mode_label(mode)),
        };
        let result = self.writer.write_events(&[row]);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_time: f64, _world: &WS, _agents: &[(AgentId, &AS)]) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}

/// Write a world's full trajectory in one batch. Not folded into
/// `on_sim_end` because `World` isn't reachable from inside the observer
/// callback (the driver only hands `on_sim_end` a state reference) — call
/// this explicitly after `driver.run()` returns, before `take_error`.
pub fn write_trajectory<WS, AS, W: OutputWriter>(
    observer: &mut PopOutputObserver<W>,
    world: &pop_entity::World<WS, AS>,
) {
    let (ts, sizes) = world.trajectory();
    let rows: Vec<TrajectoryRow> = ts
        .iter()
        .zip(sizes.iter())
        .map(|(&time, &size)| TrajectoryRow { time, size })
        .collect();
    let result = observer.writer.write_trajectory(&rows);
    observer.store_err(result);
}
