//! Game traces: line-delimited JSON records of a game
//!
//! A trace file holds exactly one `meta` record followed by `event` records
//! (one per round event, in order) and optional `snapshot` records. Traces
//! can be viewed, replayed, and verified against a fresh run of the engine.

pub mod reader;
pub mod record;
pub mod replay;
pub mod writer;

pub use reader::{parse_trace, read_trace_file, read_trace_file_async, LoadedTrace};
pub use record::{
    create_trace_meta, event_records, PileKind, SnapshotPileCount, SnapshotTopCard, TraceEventRecord,
    TraceMetaRecord, TraceRecord, TraceSnapshotRecord, ENGINE_VERSION, TRACE_VERSION,
};
pub use replay::{
    flatten_round_results, generate_round_results, render_trace_view, replay_trace,
    summarize_trace, verify_trace_events, view_trace, ReplayOptions, TraceFilter, TraceSummary,
    ViewOptions,
};
pub use writer::{TraceRecorder, TraceWriter, TraceWriterOptions};

fn truncation_note(truncated: &bool) -> &'static str {
    if *truncated {
        ", truncated"
    } else {
        ""
    }
}

/// Errors from reading, writing or verifying traces
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Trace file not found at {0}")]
    NotFound(String),

    #[error("Failed to parse trace line (length={length}{}): {preview}", truncation_note(.truncated))]
    Parse {
        length: usize,
        truncated: bool,
        preview: String,
    },

    #[error("Trace contains multiple meta records; expected one per file.")]
    MultipleMeta,

    #[error("Trace file is missing a meta record.")]
    MissingMeta,

    #[error("Trace verification failed: expected {expected} events, got {actual}.")]
    LengthMismatch { expected: usize, actual: usize },

    /// `index` is 1-based; `expected`/`actual` are the records as JSON
    #[error("Trace verification failed at event #{index}: expected {expected}, received {actual}.")]
    Mismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Failed to serialize trace record: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
