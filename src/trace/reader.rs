//! Trace file loading

use crate::trace::record::{TraceEventRecord, TraceMetaRecord, TraceRecord, TraceSnapshotRecord};
use crate::trace::TraceError;
use std::io::BufRead;
use std::path::Path;
use tokio::io::AsyncBufReadExt;

const MAX_PREVIEW_LENGTH: usize = 100;

/// A parsed trace file
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrace {
    pub meta: TraceMetaRecord,
    pub events: Vec<TraceEventRecord>,
    pub snapshots: Vec<TraceSnapshotRecord>,
}

impl LoadedTrace {
    /// Distinct round numbers carried by the event records, ascending
    pub fn rounds(&self) -> Vec<u32> {
        let mut rounds: Vec<u32> = self.events.iter().map(|record| record.round).collect();
        rounds.sort_unstable();
        rounds.dedup();
        rounds
    }
}

fn parse_line(line: &str) -> Result<TraceRecord, TraceError> {
    serde_json::from_str(line).map_err(|_| {
        let length = line.chars().count();
        let truncated = length > MAX_PREVIEW_LENGTH;
        let preview = if truncated {
            format!("{}...", line.chars().take(MAX_PREVIEW_LENGTH).collect::<String>())
        } else {
            line.to_string()
        };
        TraceError::Parse {
            length,
            truncated,
            preview,
        }
    })
}

/// Accumulates records in file order
#[derive(Default)]
struct TraceBuilder {
    meta: Option<TraceMetaRecord>,
    events: Vec<TraceEventRecord>,
    snapshots: Vec<TraceSnapshotRecord>,
}

impl TraceBuilder {
    fn push_line(&mut self, line: &str) -> Result<(), TraceError> {
        if line.trim().is_empty() {
            return Ok(());
        }
        match parse_line(line)? {
            TraceRecord::Meta(meta) => {
                if self.meta.is_some() {
                    return Err(TraceError::MultipleMeta);
                }
                self.meta = Some(meta);
            }
            TraceRecord::Event(event) => self.events.push(event),
            TraceRecord::Snapshot(snapshot) => self.snapshots.push(snapshot),
        }
        Ok(())
    }

    fn finish(self) -> Result<LoadedTrace, TraceError> {
        let meta = self.meta.ok_or(TraceError::MissingMeta)?;
        Ok(LoadedTrace {
            meta,
            events: self.events,
            snapshots: self.snapshots,
        })
    }
}

/// Parse trace text that is already in memory
pub fn parse_trace(text: &str) -> Result<LoadedTrace, TraceError> {
    let mut builder = TraceBuilder::default();
    for line in text.lines() {
        builder.push_line(line)?;
    }
    builder.finish()
}

/// Load a trace file, skipping blank lines
pub fn read_trace_file<P: AsRef<Path>>(path: P) -> Result<LoadedTrace, TraceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TraceError::NotFound(path.display().to_string()));
    }

    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let mut builder = TraceBuilder::default();
    for line in reader.lines() {
        builder.push_line(&line?)?;
    }
    builder.finish()
}

/// Async counterpart of [`read_trace_file`]
pub async fn read_trace_file_async<P: AsRef<Path>>(path: P) -> Result<LoadedTrace, TraceError> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await? {
        return Err(TraceError::NotFound(path.display().to_string()));
    }

    let file = tokio::fs::File::open(path).await?;
    let mut lines = tokio::io::BufReader::new(file).lines();
    let mut builder = TraceBuilder::default();
    while let Some(line) = lines.next_line().await? {
        builder.push_line(&line)?;
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r#"{"type":"meta","version":"1.0","engineVersion":"0.1.0","timestamp":"2024-01-01T00:00:00.000Z","seed":"s","rules":{"numDecks":1,"warFaceDownCount":1,"collectMode":"won-pile","shuffleWonPileOnRecycle":true,"maxRounds":10000,"tieResolution":"standard-war","aceHigh":true},"cliArgs":{},"players":["A","B"]}"#;

    #[test]
    fn test_parse_skips_blank_lines() {
        let text = format!(
            "{META}\n\n{}\n   \n{}\n",
            r#"{"type":"event","round":1,"event":{"type":"RoundStarted","round":1}}"#,
            r#"{"type":"snapshot","round":1,"pileCounts":[]}"#
        );
        let trace = parse_trace(&text).unwrap();
        assert_eq!(trace.meta.seed, "s");
        assert_eq!(trace.events.len(), 1);
        assert_eq!(trace.snapshots.len(), 1);
        assert_eq!(trace.rounds(), vec![1]);
    }

    #[test]
    fn test_missing_meta() {
        let err = parse_trace(r#"{"type":"event","round":1,"event":{"type":"RoundStarted","round":1}}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Trace file is missing a meta record.");
    }

    #[test]
    fn test_multiple_meta() {
        let err = parse_trace(&format!("{META}\n{META}\n")).unwrap_err();
        assert!(matches!(err, TraceError::MultipleMeta));
    }

    #[test]
    fn test_parse_error_preview() {
        let err = parse_trace("not json").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse trace line (length=8): not json");

        let long = "x".repeat(150);
        let err = parse_trace(&long).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Failed to parse trace line (length=150, truncated): {}...", "x".repeat(100))
        );
    }

    #[test]
    fn test_missing_file() {
        let err = read_trace_file("/definitely/not/here.jsonl").unwrap_err();
        assert_eq!(err.to_string(), "Trace file not found at /definitely/not/here.jsonl");
    }
}
