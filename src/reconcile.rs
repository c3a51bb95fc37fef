//! Change reconciliation
//!
//! Turns a grid change batch (edits keyed by row position, appended rows,
//! removed positions) into store calls. Positions are resolved to ids once,
//! against the snapshot the grid rendered, and the store is called in a
//! fixed order:
//!
//! 1. `update_many` with every edited row
//! 2. `insert_many` with the added rows, in order
//! 3. `delete_by_ids` with the removed rows
//!
//! The whole batch is coerced before the first store call, so a batch with a
//! malformed cell writes nothing.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::record::{GridEdit, GridRow, PartialRecord, Record};
use crate::storage::RecordStore;

/// Changes reported by the grid since the last commit.
///
/// Owned by the caller, valid only against the snapshot it was produced
/// from, and cleared by [`Reconciler::commit`] on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    /// Snapshot position -> changed cells
    #[serde(default, alias = "edited_rows")]
    pub edited: BTreeMap<usize, GridEdit>,
    /// New rows, without ids
    #[serde(default, alias = "added_rows")]
    pub added: Vec<GridEdit>,
    /// Snapshot positions to remove
    #[serde(default, alias = "deleted_rows")]
    pub deleted: BTreeSet<usize>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit at `position`
    pub fn edit(mut self, position: usize, edit: GridEdit) -> Self {
        self.edited.insert(position, edit);
        self
    }

    /// Append a new row
    pub fn add(mut self, row: GridEdit) -> Self {
        self.added.push(row);
        self
    }

    /// Mark `position` for removal
    pub fn delete(mut self, position: usize) -> Self {
        self.deleted.insert(position);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.edited.is_empty() && self.added.is_empty() && self.deleted.is_empty()
    }

    pub fn clear(&mut self) {
        self.edited.clear();
        self.added.clear();
        self.deleted.clear();
    }

    /// The rows the grid displays for `snapshot` with this batch pending.
    ///
    /// Deleted positions are dropped, edits are overlaid and added rows come
    /// last. Cells that do not coerce are shown as missing.
    pub fn preview(&self, snapshot: &[Record]) -> Vec<GridRow> {
        let mut rows: Vec<GridRow> = snapshot
            .iter()
            .enumerate()
            .filter(|(position, _)| !self.deleted.contains(position))
            .map(|(position, record)| {
                let mut row = GridRow::from(record);
                if let Some(edit) = self.edited.get(&position) {
                    row.overlay(edit);
                }
                row
            })
            .collect();

        rows.extend(self.added.iter().map(|edit| {
            let mut row = GridRow::default();
            row.overlay(edit);
            row
        }));

        rows
    }
}

/// Immutable position -> id table built from one snapshot
#[derive(Debug, Clone)]
pub struct PositionMap {
    ids: Vec<i64>,
}

impl PositionMap {
    pub fn from_snapshot(snapshot: &[Record]) -> Self {
        Self {
            ids: snapshot.iter().map(|record| record.id).collect(),
        }
    }

    /// Id of the record displayed at `position`
    pub fn resolve(&self, position: usize) -> Result<i64> {
        self.ids
            .get(position)
            .copied()
            .ok_or(Error::UnknownPosition(position))
    }
}

/// Store operations resolved from one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcilePlan {
    pub updates: Vec<(i64, PartialRecord)>,
    pub inserts: Vec<PartialRecord>,
    pub deletes: Vec<i64>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty() && self.deletes.is_empty()
    }
}

/// Outcome of a committed batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Rows actually changed by updates
    pub updated: usize,
    /// Ids assigned to inserted rows, in order
    pub inserted: Vec<i64>,
    /// Rows actually removed
    pub deleted: usize,
}

impl std::fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} updated, {} inserted, {} deleted",
            self.updated,
            self.inserted.len(),
            self.deleted
        )
    }
}

/// Applies change batches relative to one snapshot
pub struct Reconciler {
    positions: PositionMap,
}

impl Reconciler {
    /// Capture the position -> id table for `snapshot`
    pub fn new(snapshot: &[Record]) -> Self {
        Self {
            positions: PositionMap::from_snapshot(snapshot),
        }
    }

    /// Resolve and coerce `batch` without touching any store
    pub fn plan(&self, batch: &ChangeBatch) -> Result<ReconcilePlan> {
        let updates = batch
            .edited
            .iter()
            .map(|(position, edit)| -> Result<(i64, PartialRecord)> {
                Ok((self.positions.resolve(*position)?, edit.to_update()?))
            })
            .collect::<Result<Vec<_>>>()?;

        let inserts = batch
            .added
            .iter()
            .map(GridEdit::to_insert)
            .collect::<Result<Vec<_>>>()?;

        let deletes = batch
            .deleted
            .iter()
            .map(|position| self.positions.resolve(*position))
            .collect::<Result<BTreeSet<_>>>()?
            .into_iter()
            .collect();

        Ok(ReconcilePlan { updates, inserts, deletes })
    }

    /// Apply `batch` to `store` and clear it.
    ///
    /// On error the batch is left as it was. The caller must re-read the
    /// store before building the next batch.
    pub fn commit<S>(&self, store: &mut S, batch: &mut ChangeBatch) -> Result<ReconcileReport>
    where
        S: RecordStore + ?Sized,
    {
        let plan = self.plan(batch)?;
        let report = Self::submit(store, &plan)?;
        batch.clear();

        tracing::info!("Committed change batch: {}", report);
        Ok(report)
    }

    /// Submit a resolved plan in update, insert, delete order
    pub fn submit<S>(store: &mut S, plan: &ReconcilePlan) -> Result<ReconcileReport>
    where
        S: RecordStore + ?Sized,
    {
        let mut report = ReconcileReport::default();

        if !plan.updates.is_empty() {
            report.updated = store.update_many(&plan.updates)?;
        }
        if !plan.inserts.is_empty() {
            report.inserted = store.insert_many(&plan.inserts)?;
        }
        if !plan.deletes.is_empty() {
            report.deleted = store.delete_by_ids(&plan.deletes)?;
        }

        Ok(report)
    }
}
