//! Session recording: the one-row summary captured when an attempt ends.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::consts::TIMESTAMP_FORMAT;

/// Where the attempt ended, with how much experience, and when. The field
/// order is the contract the log's consumers rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_location: String,
    pub current_experience: u32,
    pub current_date: String,
}

/// Collaborator that persists attempt summaries. The core records one
/// snapshot per attempt-ending event (win, death, quit); implementations
/// write out only the last one.
pub trait SessionRecorder {
    fn record(&mut self, snapshot: SessionSnapshot);
}

/// Source of snapshot timestamps. Tests substitute a fixed one.
pub trait Clock {
    fn timestamp(&self) -> String;
}

/// The local wall clock, formatted the way the session log expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn timestamp(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Recorder that keeps every snapshot in memory. Used by tests and as a sink
/// when no log file is wanted.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    pub snapshots: Vec<SessionSnapshot>,
}

impl SessionRecorder for MemoryRecorder {
    fn record(&mut self, snapshot: SessionSnapshot) {
        self.snapshots.push(snapshot);
    }
}
