// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic persistence and version reconciliation
//!
//! Local mutations apply immediately and queue a `WriteOp`. `sync` drains
//! the queue into the store; a failed write rolls that record back to the
//! snapshot it had before the first unacknowledged mutation. The change
//! feed is merged by `apply_remote`: newer store versions win, stale ones
//! are discarded, and the echo of our own acknowledged write completes the
//! assignment lifecycle.

use crate::error::{BoardError, PersistFailure};
use crate::service::Board;
use mb_core::conflict;
use mb_core::{Assignment, AssignmentId, IdGen, Job, PhaseEvent};
use mb_store::{ChangeEvent, ChangeKind, Record, RecordKey, Store, Version};
use std::collections::BTreeSet;

/// One queued write, payload captured at mutation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    CreateAssignment(Assignment),
    UpdateAssignment(Assignment),
    DeleteAssignment(AssignmentId),
    PutJob(Job),
}

impl WriteOp {
    pub fn key(&self) -> RecordKey {
        match self {
            WriteOp::CreateAssignment(a) | WriteOp::UpdateAssignment(a) => {
                RecordKey::Assignment(a.id.clone())
            }
            WriteOp::DeleteAssignment(id) => RecordKey::Assignment(id.clone()),
            WriteOp::PutJob(j) => RecordKey::Job(j.id.clone()),
        }
    }
}

/// Rollback state for one record with a write in flight
#[derive(Debug, Clone)]
pub(crate) struct PendingWrite {
    /// The record as it was before the first unacknowledged mutation,
    /// refreshed to the persisted record once the store acks; `None` means
    /// the store does not hold it and rollback removes it
    pub before: Option<Record>,
    /// Version we expect the store to assign, for ordering against
    /// concurrent remote changes
    pub provisional: Version,
    pub state: PendingState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingState {
    AwaitingAck,
    /// The store acknowledged with this version; the feed echo is pending
    Acked(Version),
}

impl<I: IdGen> Board<I> {
    /// Push every queued write to the store, in order.
    ///
    /// Each failure rolls its record back and skips the rest of that
    /// record's queued writes; other records keep going. The only await
    /// point in the whole board.
    pub async fn sync<S: Store>(&mut self, store: &S) -> Result<(), BoardError> {
        let mut failures = Vec::new();
        let mut poisoned: BTreeSet<RecordKey> = BTreeSet::new();

        while let Some(op) = self.outbox.pop_front() {
            let key = op.key();
            if poisoned.contains(&key) {
                continue;
            }
            let result = match &op {
                WriteOp::CreateAssignment(a) => store.create_assignment(a).await,
                WriteOp::UpdateAssignment(a) => store.update_assignment(a).await,
                WriteOp::DeleteAssignment(id) => store.delete_assignment(id).await,
                WriteOp::PutJob(j) => store.put_job(j).await,
            };
            match result {
                Ok(version) => self.acknowledge(&op, version),
                Err(error) => {
                    tracing::warn!(%error, ?key, "write failed, rolling back");
                    self.rollback(&key);
                    poisoned.insert(key.clone());
                    failures.push(PersistFailure { key, error });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BoardError::Persistence { failures })
        }
    }

    fn acknowledge(&mut self, op: &WriteOp, version: Version) {
        let key = op.key();
        self.versions.insert(key.clone(), version);
        // The store now holds the op's payload; rollback of a later failed
        // write for this key must restore that, not the pre-create state.
        let persisted = match op {
            WriteOp::CreateAssignment(a) | WriteOp::UpdateAssignment(a) => {
                let mut persisted = a.clone();
                persisted.version = Some(version.0);
                persisted.phase = persisted.phase.transition(PhaseEvent::Persist);
                Some(Record::Assignment(persisted))
            }
            WriteOp::DeleteAssignment(_) => None,
            WriteOp::PutJob(j) => Some(Record::Job(j.clone())),
        };
        if let Some(pending) = self.journal.get_mut(&key) {
            pending.state = PendingState::Acked(version);
            pending.before = persisted;
        }
        if let RecordKey::Assignment(id) = &key {
            if let Some(assignment) = self.snapshot_mut().assignment_mut(id) {
                assignment.phase = assignment.phase.transition(PhaseEvent::Persist);
                assignment.version = Some(version.0);
            }
        }
    }

    /// Restore a record to its pre-mutation state after a failed write
    pub(crate) fn rollback(&mut self, key: &RecordKey) {
        let Some(pending) = self.journal.remove(key) else {
            return;
        };
        match (pending.before, key) {
            (Some(Record::Assignment(before)), _) => {
                let resource_id = before.resource_id.clone();
                self.snapshot_mut().upsert_assignment(before);
                self.recompute_magnet(&resource_id);
            }
            (None, RecordKey::Assignment(id)) => {
                let id = id.clone();
                if let Some(removed) = self.snapshot_mut().remove_assignment(&id) {
                    self.recompute_magnet(&removed.resource_id);
                }
            }
            (Some(Record::Job(before)), _) => {
                self.snapshot_mut().upsert_job(before);
            }
            (None, RecordKey::Job(id)) => {
                let id = id.clone();
                self.snapshot_mut().remove_job(&id);
            }
            // Resources are never written optimistically
            (Some(Record::Resource(_)), _) | (None, RecordKey::Resource(_)) => {}
        }
    }

    /// Merge one change-feed event into local state.
    ///
    /// With a write in flight for the record the store version decides: a
    /// newer remote change supersedes the optimistic value, the echo of our
    /// own acknowledged write completes it, and anything older is stale and
    /// dropped without disturbing local state.
    pub fn apply_remote(&mut self, event: ChangeEvent) {
        let key = event.key();
        let Some(pending) = self.journal.get(&key) else {
            self.apply_event(event);
            return;
        };
        let provisional = pending.provisional;

        match pending.state {
            PendingState::Acked(acked) if event.version == acked => {
                self.journal.remove(&key);
                if let RecordKey::Assignment(id) = &key {
                    if let Some(assignment) = self.snapshot_mut().assignment_mut(id) {
                        assignment.phase = assignment.phase.transition(PhaseEvent::Reconcile);
                    }
                }
            }
            PendingState::Acked(acked) if event.version > acked => {
                self.discard_pending(&key);
                self.apply_event(event);
            }
            PendingState::AwaitingAck if event.version > provisional => {
                // A concurrent remote write landed first; it wins
                self.discard_pending(&key);
                self.apply_event(event);
            }
            _ => {
                tracing::warn!(version = %event.version, ?key, "stale change event discarded");
            }
        }
    }

    /// Apply a change event with no local write in flight
    fn apply_event(&mut self, event: ChangeEvent) {
        let ChangeEvent {
            kind,
            record,
            version,
        } = event;
        self.versions.insert(record.key(), version);

        match (kind, record) {
            (ChangeKind::Insert | ChangeKind::Update, Record::Assignment(mut assignment)) => {
                let previous_resource = self
                    .snapshot()
                    .assignment(&assignment.id)
                    .map(|a| a.resource_id.clone());
                assignment.version = Some(version.0);
                assignment.phase = assignment
                    .phase
                    .transition(PhaseEvent::Persist)
                    .transition(PhaseEvent::Reconcile);
                let resource_id = assignment.resource_id.clone();
                self.snapshot_mut().upsert_assignment(assignment);
                if let Some(previous) = previous_resource {
                    if previous != resource_id {
                        self.recompute_magnet(&previous);
                    }
                }
                self.recompute_magnet(&resource_id);
                self.audit_attachment_counts();
            }
            (ChangeKind::Delete, Record::Assignment(assignment)) => {
                if let Some(removed) = self.snapshot_mut().remove_assignment(&assignment.id) {
                    self.recompute_magnet(&removed.resource_id);
                }
            }
            (ChangeKind::Insert | ChangeKind::Update, Record::Resource(resource)) => {
                let id = resource.id.clone();
                self.snapshot_mut().upsert_resource(resource.clone());
                self.registry_mut().upsert_resource(resource);
                self.recompute_magnet(&id);
            }
            (ChangeKind::Delete, Record::Resource(resource)) => {
                let doomed: Vec<AssignmentId> = self
                    .snapshot()
                    .assignments_for_resource(&resource.id)
                    .iter()
                    .map(|a| a.id.clone())
                    .collect();
                for id in doomed {
                    self.snapshot_mut().remove_assignment(&id);
                }
                self.snapshot_mut().remove_resource(&resource.id);
                self.registry_mut().remove_resource(&resource.id);
            }
            (ChangeKind::Insert | ChangeKind::Update, Record::Job(job)) => {
                self.snapshot_mut().upsert_job(job);
            }
            (ChangeKind::Delete, Record::Job(job)) => {
                self.snapshot_mut().remove_job(&job.id);
            }
        }
    }

    /// Recount attachment limits after an assignment merged from the feed.
    ///
    /// Local attaches are validated up front; a merge can still push a
    /// target past its rule. The store is authoritative, so excess is
    /// logged rather than reverted.
    fn audit_attachment_counts(&self) {
        let rules = self.rules().snapshot();
        for violation in conflict::attachment_count_violations(&rules, self.snapshot()) {
            tracing::warn!(
                target = %violation.target,
                source_type = %violation.source_type,
                count = violation.count,
                max = violation.max,
                "remote merge exceeded attachment limit"
            );
        }
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
