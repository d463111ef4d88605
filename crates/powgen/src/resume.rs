//! Resumable job state for longitude-at-a-time runs.
//!
//! The persisted form is an append-only text log: one completed longitude
//! index per line, followed by a `done` line once the final column finishes.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PowGenError, Result};

/// Line marking that every longitude column has been processed.
pub const DONE_SENTINEL: &str = "done";

/// Progress through the longitude columns of a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobState {
    /// Last fully processed longitude index
    pub last_completed: Option<usize>,
    /// All columns have been processed
    pub complete: bool,
}

impl JobState {
    /// Longitude index the next run should process.
    pub fn next_index(&self) -> usize {
        self.last_completed.map_or(0, |idx| idx + 1)
    }

    /// State after finishing column `lon_idx` of `num_lons`.
    pub fn after_column(&self, lon_idx: usize, num_lons: usize) -> Self {
        Self {
            last_completed: Some(lon_idx),
            complete: lon_idx + 1 >= num_lons,
        }
    }

    /// Parse the text log. Blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut state = Self::default();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == DONE_SENTINEL {
                state.complete = true;
                continue;
            }
            let idx = line.parse::<usize>().map_err(|_| {
                PowGenError::ResumeLog(format!("line {}: unexpected entry {line:?}", line_no + 1))
            })?;
            state.last_completed = Some(idx);
        }
        Ok(state)
    }

    /// Log lines recording the transition into this state.
    pub fn log_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(idx) = self.last_completed {
            lines.push(idx.to_string());
        }
        if self.complete {
            lines.push(DONE_SENTINEL.to_string());
        }
        lines
    }
}

/// Loads and records job state on behalf of the pipeline.
pub trait JobStateStore {
    fn load(&self) -> Result<JobState>;

    /// Record a newly reached state.
    fn record(&mut self, state: &JobState) -> Result<()>;
}

/// Job state kept in a plain text log file.
#[derive(Debug, Clone)]
pub struct FileJobStateStore {
    path: PathBuf,
}

impl FileJobStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JobStateStore for FileJobStateStore {
    fn load(&self) -> Result<JobState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No resume log, starting from the first column");
            return Ok(JobState::default());
        }
        let text = fs::read_to_string(&self.path)?;
        JobState::parse(&text)
    }

    fn record(&mut self, state: &JobState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for line in state.log_lines() {
            writeln!(file, "{line}")?;
        }
        file.sync_all()?;

        debug!(
            path = %self.path.display(),
            last_completed = ?state.last_completed,
            complete = state.complete,
            "Recorded job state"
        );
        Ok(())
    }
}

/// In-memory job state log.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStateStore {
    lines: Vec<String>,
}

impl MemoryJobStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing log content.
    pub fn from_log(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl JobStateStore for MemoryJobStateStore {
    fn load(&self) -> Result<JobState> {
        JobState::parse(&self.lines.join("\n"))
    }

    fn record(&mut self, state: &JobState) -> Result<()> {
        self.lines.extend(state.log_lines());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log_starts_at_zero() {
        let state = JobState::parse("").unwrap();
        assert_eq!(state, JobState::default());
        assert_eq!(state.next_index(), 0);
        assert!(!state.complete);
    }

    #[test]
    fn test_resume_after_three() {
        let state = JobState::parse("3").unwrap();
        assert_eq!(state.last_completed, Some(3));
        assert_eq!(state.next_index(), 4);
    }

    #[test]
    fn test_last_entry_wins() {
        let state = JobState::parse("0\n1\n2\n\n5\n").unwrap();
        assert_eq!(state.next_index(), 6);
    }

    #[test]
    fn test_done_sentinel() {
        let state = JobState::parse("29\n30\ndone").unwrap();
        assert!(state.complete);
        assert_eq!(state.last_completed, Some(30));
    }

    #[test]
    fn test_malformed_log() {
        let err = JobState::parse("3\nfour\n").unwrap_err();
        assert!(matches!(err, PowGenError::ResumeLog(_)));
    }

    #[test]
    fn test_after_column() {
        let state = JobState::default().after_column(0, 3);
        assert_eq!(state.last_completed, Some(0));
        assert!(!state.complete);

        let last = state.after_column(2, 3);
        assert!(last.complete);
        assert_eq!(last.log_lines(), vec!["2".to_string(), "done".to_string()]);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryJobStateStore::from_log("3");
        let state = store.load().unwrap();
        store.record(&state.after_column(4, 10)).unwrap();
        assert_eq!(store.lines(), &["3".to_string(), "4".to_string()]);
        assert_eq!(store.load().unwrap().next_index(), 5);
    }

    #[test]
    fn test_file_store_appends() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileJobStateStore::new(dir.path().join("logs").join("resume.log"));

        assert_eq!(store.load().unwrap(), JobState::default());

        store.record(&JobState::default().after_column(0, 2)).unwrap();
        store.record(&JobState::default().after_column(1, 2)).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "0\n1\ndone\n");

        let state = store.load().unwrap();
        assert!(state.complete);
        assert_eq!(state.last_completed, Some(1));
    }
}
