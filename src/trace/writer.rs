//! Trace file writing

use crate::game::{GameObserver, GameState, RoundResult, StateHashMode};
use crate::trace::record::{
    create_trace_meta, event_records, TraceMetaRecord, TraceRecord, TraceSnapshotRecord,
};
use crate::trace::TraceError;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceWriterOptions {
    pub file_path: PathBuf,
    /// Write a snapshot record after each round
    pub include_snapshots: bool,
    /// Add the front card of every non-empty pile to snapshots
    pub include_top_cards: bool,
}

impl TraceWriterOptions {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        TraceWriterOptions {
            file_path: file_path.into(),
            include_snapshots: false,
            include_top_cards: false,
        }
    }
}

/// Line-delimited JSON writer; one file per game
pub struct TraceWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    include_snapshots: bool,
    include_top_cards: bool,
}

impl TraceWriter {
    /// Create (or truncate) the file and write the meta record
    pub fn create(options: &TraceWriterOptions, meta: &TraceMetaRecord) -> Result<Self, TraceError> {
        if let Some(parent) = options.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&options.file_path)?;
        let mut writer = TraceWriter {
            path: options.file_path.clone(),
            writer: BufWriter::new(file),
            include_snapshots: options.include_snapshots,
            include_top_cards: options.include_top_cards,
        };
        writer.write_record(&TraceRecord::Meta(meta.clone()))?;
        writer.writer.flush()?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&mut self, record: &TraceRecord) -> Result<(), TraceError> {
        let json = serde_json::to_string(record).map_err(|e| TraceError::Serialization(e.to_string()))?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Append the round's events (and snapshot, if enabled)
    pub fn record_round(&mut self, result: &RoundResult) -> Result<(), TraceError> {
        for record in event_records(result) {
            self.write_record(&TraceRecord::Event(record))?;
        }
        if self.include_snapshots {
            let snapshot =
                TraceSnapshotRecord::capture(result.round_number(), &result.state, self.include_top_cards);
            self.write_record(&TraceRecord::Snapshot(snapshot))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), TraceError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Observer that writes a trace of the game it watches
///
/// The file is opened when the game starts, so the meta record carries the
/// dealt state's rules and player names.
pub struct TraceRecorder {
    options: TraceWriterOptions,
    seed: String,
    cli_args: Map<String, Value>,
    state_hash_mode: StateHashMode,
    writer: Option<TraceWriter>,
}

impl TraceRecorder {
    pub fn new(options: TraceWriterOptions, seed: impl Into<String>, state_hash_mode: StateHashMode) -> Self {
        TraceRecorder {
            options,
            seed: seed.into(),
            cli_args: Map::new(),
            state_hash_mode,
            writer: None,
        }
    }

    pub fn with_cli_args(mut self, cli_args: Map<String, Value>) -> Self {
        self.cli_args = cli_args;
        self
    }

    pub fn path(&self) -> &Path {
        &self.options.file_path
    }

    /// Flush and close the file
    pub fn finish(self) -> Result<(), TraceError> {
        match self.writer {
            Some(writer) => writer.finish(),
            None => Ok(()),
        }
    }
}

impl GameObserver for TraceRecorder {
    fn on_game_start(&mut self, state: &GameState) -> crate::Result<()> {
        let meta = create_trace_meta(
            &self.seed,
            state,
            self.cli_args.clone(),
            Some(self.state_hash_mode),
        );
        self.writer = Some(TraceWriter::create(&self.options, &meta)?);
        Ok(())
    }

    fn on_round(&mut self, result: &RoundResult) -> crate::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.record_round(result)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameLoop, RunGameOptions, VerbosityLevel};
    use crate::trace::reader::read_trace_file;

    #[test]
    fn test_recorder_writes_meta_then_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("game.jsonl");
        let options = RunGameOptions::new("recorded").state_hash_mode(StateHashMode::Counts);

        let mut recorder = TraceRecorder::new(
            TraceWriterOptions {
                file_path: path.clone(),
                include_snapshots: true,
                include_top_cards: true,
            },
            "recorded",
            StateHashMode::Counts,
        );
        let result = GameLoop::new(&options)
            .unwrap()
            .with_verbosity(VerbosityLevel::Silent)
            .run(&mut recorder)
            .unwrap();
        recorder.finish().unwrap();

        let trace = read_trace_file(&path).unwrap();
        assert_eq!(trace.meta.seed, "recorded");
        assert_eq!(trace.meta.hash_mode(), StateHashMode::Counts);
        assert_eq!(trace.events.len(), result.events.len());
        assert_eq!(trace.snapshots.len() as u32, result.state.round - 1);
        let events: Vec<_> = trace.events.into_iter().map(|record| record.event).collect();
        assert_eq!(events, result.events);
    }

    #[test]
    fn test_writer_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        std::fs::write(&path, "stale\n").unwrap();

        let state = crate::game::create_game_state(Default::default()).unwrap();
        let meta = create_trace_meta("s", &state, Map::new(), None);
        TraceWriter::create(&TraceWriterOptions::new(&path), &meta)
            .unwrap()
            .finish()
            .unwrap();

        let trace = read_trace_file(&path).unwrap();
        assert_eq!(trace.meta, meta);
        assert!(trace.events.is_empty());
    }
}
