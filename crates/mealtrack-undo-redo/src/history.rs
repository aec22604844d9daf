//! History management and navigation

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::change::{ChangeEntry, ChangeSummary};
use crate::error::UndoRedoError;

/// History limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest entries are discarded beyond this many; unbounded when `None`
    pub max_entries: Option<usize>,
}

/// Listing view of one entry in the log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The change associated with this entry
    pub change: ChangeSummary,
    /// Position in the history
    pub index: usize,
    /// Whether this change is currently undone
    pub is_undone: bool,
}

/// Linear undo/redo log
///
/// `entries[..cursor]` are done, `entries[cursor..]` are undone and available
/// to redo. Recording a new entry discards the undone tail.
pub struct HistoryLog {
    entries: Vec<Rc<ChangeEntry>>,
    cursor: usize,
    config: HistoryConfig,
}

impl HistoryLog {
    /// Create an unbounded log
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Create a log with explicit limits
    pub fn with_config(config: HistoryConfig) -> Self {
        HistoryLog {
            entries: Vec::new(),
            cursor: 0,
            config,
        }
    }

    /// Record a new entry, dropping anything that was undone
    pub fn push(&mut self, entry: ChangeEntry) {
        if self.cursor < self.entries.len() {
            tracing::debug!(
                discarded = self.entries.len() - self.cursor,
                "new edit discards redo tail"
            );
            self.entries.truncate(self.cursor);
        }

        tracing::debug!(field = entry.field_name(), kind = %entry.kind(), "recording change");
        self.entries.push(Rc::new(entry));

        if let Some(max) = self.config.max_entries {
            if self.entries.len() > max {
                let excess = self.entries.len() - max;
                self.entries.drain(..excess);
            }
        }

        self.cursor = self.entries.len();
    }

    /// Revert the most recent done entry
    pub fn undo(&mut self) -> Result<(), UndoRedoError> {
        self.step_back()?.revert()
    }

    /// Re-apply the first undone entry
    pub fn redo(&mut self) -> Result<(), UndoRedoError> {
        self.step_forward()?.apply()
    }

    /// Move the cursor back one entry and hand out that entry for reverting
    fn step_back(&mut self) -> Result<Rc<ChangeEntry>, UndoRedoError> {
        if !self.can_undo() {
            return Err(UndoRedoError::NoMoreUndos);
        }
        self.cursor -= 1;
        Ok(Rc::clone(&self.entries[self.cursor]))
    }

    /// Move the cursor forward one entry and hand out that entry for applying
    fn step_forward(&mut self) -> Result<Rc<ChangeEntry>, UndoRedoError> {
        if !self.can_redo() {
            return Err(UndoRedoError::NoMoreRedos);
        }
        let entry = Rc::clone(&self.entries[self.cursor]);
        self.cursor += 1;
        Ok(entry)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Boundary between done and undone entries
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total entries, done and undone
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was ever recorded (or everything was cleared)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the number of undoable changes
    pub fn undoable_count(&self) -> usize {
        self.cursor
    }

    /// Get the number of redoable changes
    pub fn redoable_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Get paginated history, oldest first
    pub fn history(&self, limit: usize, offset: usize) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(limit)
            .map(|(index, entry)| HistoryEntry {
                change: entry.summary(),
                index,
                is_undone: index >= self.cursor,
            })
            .collect()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryLog")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("config", &self.config)
            .finish()
    }
}

/// Clears the replay flag even if replay panics
struct ReplayGuard<'a>(&'a Cell<bool>);

impl<'a> ReplayGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        ReplayGuard(flag)
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Handle to the log an editor and its sessions record into
///
/// Replay runs with the log borrow released, so listeners reacting to a
/// replayed change may query the history. While a replay is in progress,
/// [`SharedHistory::record`] refuses new entries: undo/redo never records
/// itself.
#[derive(Clone)]
pub struct SharedHistory {
    log: Rc<RefCell<HistoryLog>>,
    replaying: Rc<Cell<bool>>,
}

impl SharedHistory {
    /// Create an unbounded shared log
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Create a shared log with explicit limits
    pub fn with_config(config: HistoryConfig) -> Self {
        SharedHistory {
            log: Rc::new(RefCell::new(HistoryLog::with_config(config))),
            replaying: Rc::new(Cell::new(false)),
        }
    }

    /// Record an entry; returns false when refused during replay
    pub fn record(&self, entry: ChangeEntry) -> bool {
        if self.replaying.get() {
            tracing::debug!(
                field = entry.field_name(),
                "ignoring change recorded during undo/redo replay"
            );
            return false;
        }
        self.log.borrow_mut().push(entry);
        true
    }

    /// Whether an undo/redo is being replayed right now
    pub fn is_replaying(&self) -> bool {
        self.replaying.get()
    }

    /// Revert the most recent done entry
    pub fn undo(&self) -> Result<(), UndoRedoError> {
        let entry = self.log.borrow_mut().step_back()?;
        let _guard = ReplayGuard::enter(&self.replaying);
        tracing::debug!(description = entry.description(), "undo");
        entry.revert()
    }

    /// Re-apply the first undone entry
    pub fn redo(&self) -> Result<(), UndoRedoError> {
        let entry = self.log.borrow_mut().step_forward()?;
        let _guard = ReplayGuard::enter(&self.replaying);
        tracing::debug!(description = entry.description(), "redo");
        entry.apply()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.log.borrow().can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.log.borrow().can_redo()
    }

    /// Total entries, done and undone
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Boundary between done and undone entries
    pub fn cursor(&self) -> usize {
        self.log.borrow().cursor()
    }

    /// Get paginated history, oldest first
    pub fn history(&self, limit: usize, offset: usize) -> Vec<HistoryEntry> {
        self.log.borrow().history(limit, offset)
    }

    /// Forget everything
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Default for SharedHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHistory")
            .field("log", &*self.log.borrow())
            .field("replaying", &self.replaying.get())
            .finish()
    }
}
