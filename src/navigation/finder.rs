//! Column browser state: built columns plus the selection path through them.
//!
//! `path[i]` selects a row of `columns[i]`. When the last selection has
//! children, one extra column is kept as a preview, so
//! `columns.len() == path.len() + 1`; otherwise `columns.len() == path.len()`
//! (the root column is always present).
//!
//! Path operations are synchronous and pure. Operations that change which
//! entry is selected return a [`ColumnRequest`] for the preview column; the
//! caller builds it (possibly while the user keeps navigating) and hands the
//! result back through [`Finder::publish`], which drops it if the path has
//! moved on in the meantime.

use serde::{Deserialize, Serialize};

use super::keys::PathCommand;
use crate::error::AppError;
use crate::schema::keywords::is_json_schema_keyword;
use crate::schema::SchemaEntry;

/// Work order for the preview column of the current selection.
#[derive(Debug, Clone)]
pub struct ColumnRequest {
    /// Path at the time of the request; the result only applies to this path.
    pub path: Vec<usize>,
    /// The selected entry whose children make up the column.
    pub parent: SchemaEntry,
}

impl ColumnRequest {
    pub async fn build(&self) -> Result<Vec<SchemaEntry>, AppError> {
        self.parent.expand().await
    }
}

/// One breadcrumb per selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Column of the selection; clicking jumps here.
    pub depth: usize,
    pub label: String,
    pub pointer: String,
}

/// Serializable navigation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderState {
    pub path: Vec<usize>,
}

/// Column browser over a root column of entries.
#[derive(Debug, Clone)]
pub struct Finder {
    columns: Vec<Vec<SchemaEntry>>,
    path: Vec<usize>,
}

impl Finder {
    pub fn new(root_column: Vec<SchemaEntry>) -> Self {
        Self {
            columns: vec![root_column],
            path: Vec::new(),
        }
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Currently built columns, root first.
    pub fn columns(&self) -> &[Vec<SchemaEntry>] {
        &self.columns
    }

    pub fn state(&self) -> FinderState {
        FinderState {
            path: self.path.clone(),
        }
    }

    /// The last selected entry.
    pub fn selected(&self) -> Option<&SchemaEntry> {
        let col = self.path.len().checked_sub(1)?;
        self.columns.get(col)?.get(self.path[col])
    }

    /// Select `row` of column `col`, dropping any deeper selections.
    ///
    /// Out-of-range positions leave the state unchanged.
    pub fn descend(&mut self, col: usize, row: usize) -> Option<ColumnRequest> {
        if col > self.path.len() || self.columns.get(col).map_or(true, |c| row >= c.len()) {
            tracing::debug!(col, row, "Ignoring out-of-range selection");
            return None;
        }

        self.path.truncate(col);
        self.path.push(row);
        self.columns.truncate(col + 1);
        self.pending_request()
    }

    /// Drop the last selection, reusing the column it was made in.
    pub fn ascend(&mut self) {
        if self.path.pop().is_some() {
            self.columns.truncate(self.path.len() + 1);
        }
    }

    /// Keep selections up to and including column `depth`.
    pub fn jump_to(&mut self, depth: usize) {
        if depth < self.path.len() {
            self.path.truncate(depth + 1);
            self.columns.truncate(depth + 2);
        }
    }

    /// Select the first row of the preview column, if there is one.
    pub fn expand(&mut self) -> Option<ColumnRequest> {
        let next_col = self.path.len();
        if next_col > 0 && !self.selected().is_some_and(|e| e.has_children) {
            return None;
        }
        match self.columns.get(next_col) {
            Some(column) if !column.is_empty() => self.descend(next_col, 0),
            _ => None,
        }
    }

    /// Move the last selection within its column, clamped to its bounds.
    pub fn step(&mut self, command: PathCommand) -> Option<ColumnRequest> {
        let col = self.path.len().saturating_sub(1);
        let len = self.columns.get(col).map_or(0, Vec::len);
        if len == 0 {
            return None;
        }
        let last = len - 1;

        let target = match (self.path.last().copied(), command) {
            (_, PathCommand::First) => 0,
            (_, PathCommand::Last) => last,
            (None, PathCommand::Next) => last,
            (None, _) => 0,
            (Some(row), PathCommand::Previous) => row.saturating_sub(1),
            (Some(row), PathCommand::Next) => (row + 1).min(last),
            (Some(_), _) => return None,
        };

        if self.path.last() == Some(&target) {
            return None;
        }
        self.descend(col, target)
    }

    /// Apply a key command.
    pub fn apply(&mut self, command: PathCommand) -> Option<ColumnRequest> {
        match command {
            PathCommand::Ascend => {
                self.ascend();
                None
            }
            PathCommand::Expand => self.expand(),
            PathCommand::Home => {
                self.jump_to(0);
                None
            }
            PathCommand::Previous | PathCommand::Next | PathCommand::First | PathCommand::Last => {
                self.step(command)
            }
        }
    }

    /// Request for the preview column, if the selection has children and the
    /// column is not built yet.
    pub fn pending_request(&self) -> Option<ColumnRequest> {
        let selected = self.selected()?;
        if !selected.has_children || self.columns.len() > self.path.len() {
            return None;
        }
        Some(ColumnRequest {
            path: self.path.clone(),
            parent: selected.clone(),
        })
    }

    /// Install a built column for `request_path`.
    ///
    /// Returns `false` and leaves the state alone if the path has changed
    /// since the request was made, or if the column is empty.
    pub fn publish(&mut self, request_path: &[usize], column: Vec<SchemaEntry>) -> bool {
        if self.path != request_path {
            tracing::debug!(
                requested = ?request_path,
                current = ?self.path,
                "Discarding stale column"
            );
            return false;
        }
        if column.is_empty() {
            return false;
        }

        self.columns.truncate(self.path.len());
        self.columns.push(column);
        true
    }

    /// Build and publish the preview column for the current path.
    ///
    /// A failed build leaves every existing column in place.
    pub async fn refresh(&mut self) -> Result<bool, AppError> {
        let Some(request) = self.pending_request() else {
            return Ok(false);
        };

        match request.build().await {
            Ok(column) => Ok(self.publish(&request.path, column)),
            Err(err) => {
                tracing::debug!(error = %err, pointer = %request.parent.pointer(), "Column build abandoned");
                Err(err)
            }
        }
    }

    /// Replay a saved path, building columns along the way.
    ///
    /// Stops at the first selection that no longer exists.
    pub async fn restore(&mut self, state: &FinderState) -> Result<(), AppError> {
        self.path.clear();
        self.columns.truncate(1);

        for (col, &row) in state.path.iter().enumerate() {
            if self.columns.len() <= col {
                break;
            }
            if self.descend(col, row).is_none() && self.path.len() != col + 1 {
                break;
            }
            self.refresh().await?;
        }
        Ok(())
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.path
            .iter()
            .enumerate()
            .filter_map(|(depth, &row)| {
                let entry = self.columns.get(depth)?.get(row)?;
                let label = if show_name(&entry.key) {
                    entry.name.clone()
                } else {
                    entry.key.clone()
                };
                Some(Breadcrumb {
                    depth,
                    label,
                    pointer: entry.pointer(),
                })
            })
            .collect()
    }
}

/// Positional and keyword keys carry no meaning of their own; show the
/// entry's name instead.
pub fn show_name(key: &str) -> bool {
    key.parse::<i64>().is_ok() || is_json_schema_keyword(key)
}
