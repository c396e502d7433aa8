//! Leveled text output for rounds, trace views and simulation reports
//!
//! Every line carries a [`VerbosityLevel`]. Printed lines are filtered by the
//! logger's verbosity; captured lines are kept whatever their level, so a
//! test can check both what was said and what a user would have seen.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// How much a game narrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Nothing at all
    Silent = 0,
    /// Outcomes only
    Minimal = 1,
    /// Every flip, war, trick and recycle
    #[default]
    Normal = 2,
    /// Adds state hashes
    Verbose = 3,
}

impl VerbosityLevel {
    /// Printed prefix; outcome lines stay flush left
    fn indent(self) -> &'static str {
        match self {
            VerbosityLevel::Minimal => "",
            _ => "  ",
        }
    }
}

/// Where lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    #[default]
    Stdout,
    /// Kept in memory, never printed
    Memory,
    Both,
}

impl OutputMode {
    fn prints(self) -> bool {
        matches!(self, OutputMode::Stdout | OutputMode::Both)
    }

    fn captures(self) -> bool {
        matches!(self, OutputMode::Memory | OutputMode::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Source of the line, e.g. "round" or "replay"
    pub category: Option<String>,
}

pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    captured: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_mode: OutputMode::default(),
            captured: RefCell::new(Vec::new()),
        }
    }

    /// Memory-only logger for tests and embedding
    pub fn capturing(verbosity: VerbosityLevel) -> Self {
        Self::with_verbosity(verbosity).with_output_mode(OutputMode::Memory)
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn is_capturing(&self) -> bool {
        self.output_mode.captures()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Copy of everything captured so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.captured.borrow().clone()
    }

    /// Drain the capture buffer
    pub fn take_entries(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.captured.borrow_mut())
    }

    /// Captured messages a user at the current verbosity would have seen
    pub fn visible_lines(&self) -> Vec<String> {
        self.captured
            .borrow()
            .iter()
            .filter(|entry| entry.level <= self.verbosity)
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Record `message` at `level`; `Silent` messages are dropped
    pub fn log(&self, level: VerbosityLevel, message: &str, category: Option<&str>) {
        if level == VerbosityLevel::Silent {
            return;
        }

        if self.output_mode.captures() {
            self.captured.borrow_mut().push(LogEntry {
                level,
                message: message.to_string(),
                category: category.map(str::to_string),
            });
        }

        if self.output_mode.prints() && level <= self.verbosity {
            println!("{}{}", level.indent(), message);
        }
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.log(VerbosityLevel::Minimal, message, None);
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        self.log(VerbosityLevel::Normal, message, None);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.log(VerbosityLevel::Verbose, message, None);
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("captured", &self.captured.borrow().len())
            .finish()
    }
}

impl Clone for GameLogger {
    /// Settings only; the clone starts with nothing captured
    fn clone(&self) -> Self {
        GameLogger {
            verbosity: self.verbosity,
            output_mode: self.output_mode,
            captured: RefCell::new(Vec::new()),
        }
    }
}
