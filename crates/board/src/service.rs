// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The board service: every user-facing mutation in one place
//!
//! All operations validate against the current snapshot, apply locally on
//! acceptance, and queue the write for the next `sync`. Nothing here blocks;
//! the store is only touched from the reconciler.

use crate::error::BoardError;
use crate::reconcile::{PendingState, PendingWrite, WriteOp};
use crate::registry::MagnetRegistry;
use chrono::NaiveTime;
use mb_core::{
    conflict, validate, Assignment, AssignmentId, AssignmentPhase, BoardSnapshot, Decision,
    FinalizeViolation, IdGen, Job, JobId, MagnetStatus, PhaseEvent, RejectReason, Resource,
    ResourceId, ResourceType, RowKind, RuleStore, Shift, TimeSlot, UuidIdGen,
};
use mb_store::{Record, RecordKey, Version};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Caller intent for a single drop
#[derive(Debug, Clone, Default)]
pub struct AssignOptions {
    /// Take the double booking on purpose instead of rejecting it
    pub multi_shift: bool,
    /// Explicit position within the row; defaults to the end
    pub position: Option<u32>,
}

/// What a successful assign produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignOutcome {
    pub assignment_id: AssignmentId,
    pub secondary: SecondaryOutcome,
}

/// Result of the best-effort follow-up action after the primary assign.
///
/// A failed follow-up never rolls the primary back; the caller gets the
/// reason and the board keeps the primary assignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SecondaryOutcome {
    #[default]
    None,
    /// The truck's last known driver was free and came along
    AutoAttached {
        driver: ResourceId,
        assignment_id: AssignmentId,
    },
    Failed {
        reason: String,
    },
}

/// A board session: materialized snapshot, magnet registry, rule store, and
/// the optimistic write journal.
///
/// Single-writer by construction. Concurrent sessions converge through the
/// store's change feed, not through shared memory.
pub struct Board<I: IdGen = UuidIdGen> {
    snapshot: BoardSnapshot,
    registry: MagnetRegistry,
    rules: RuleStore,
    id_gen: I,
    /// Writes accepted locally but not yet pushed to the store, in order
    pub(crate) outbox: VecDeque<WriteOp>,
    /// Rollback state per record with an optimistic write in flight
    pub(crate) journal: HashMap<RecordKey, PendingWrite>,
    /// Last store version seen per record, from acks and the change feed
    pub(crate) versions: HashMap<RecordKey, Version>,
}

impl Board<UuidIdGen> {
    pub fn new(rules: RuleStore) -> Self {
        Board::with_id_gen(rules, UuidIdGen)
    }
}

impl<I: IdGen> Board<I> {
    pub fn with_id_gen(rules: RuleStore, id_gen: I) -> Self {
        Board {
            snapshot: BoardSnapshot::new(),
            registry: MagnetRegistry::new(),
            rules,
            id_gen,
            outbox: VecDeque::new(),
            journal: HashMap::new(),
            versions: HashMap::new(),
        }
    }

    // ---- roster and job intake -------------------------------------------

    /// Ingest or refresh a resource. Resources are owned upstream, so this
    /// never queues a write.
    pub fn upsert_resource(&mut self, resource: Resource) {
        let id = resource.id.clone();
        self.snapshot.upsert_resource(resource.clone());
        self.registry.upsert_resource(resource);
        self.registry
            .recompute(&id, self.snapshot.assignment_count(&id));
    }

    /// Remove a resource, cascading deletion of all its assignments
    pub fn remove_resource(&mut self, id: &ResourceId) {
        let doomed: Vec<AssignmentId> = self
            .snapshot
            .assignments_for_resource(id)
            .iter()
            .map(|a| a.id.clone())
            .collect();
        for assignment_id in doomed {
            self.delete_assignment_local(&assignment_id);
        }
        self.snapshot.remove_resource(id);
        self.registry.remove_resource(id);
        tracing::debug!(resource = %id, "resource removed");
    }

    pub fn upsert_job(&mut self, job: Job) {
        self.snapshot.upsert_job(job);
    }

    // ---- assignment operations -------------------------------------------

    /// Drop a resource onto a job row.
    ///
    /// Runs the drop rules and the double-booking check, applies locally on
    /// acceptance, and follows up with the best-effort driver auto-attach
    /// for trucks.
    pub fn assign(
        &mut self,
        resource_id: &ResourceId,
        job_id: &JobId,
        row: RowKind,
        options: AssignOptions,
    ) -> Result<AssignOutcome, BoardError> {
        let assignment_id = self.assign_one(resource_id, job_id, row, &options)?;
        let secondary = self.auto_attach_driver(resource_id, &assignment_id);
        Ok(AssignOutcome {
            assignment_id,
            secondary,
        })
    }

    fn assign_one(
        &mut self,
        resource_id: &ResourceId,
        job_id: &JobId,
        row: RowKind,
        options: &AssignOptions,
    ) -> Result<AssignmentId, BoardError> {
        let resource = self
            .snapshot
            .resource(resource_id)
            .cloned()
            .ok_or_else(|| BoardError::ResourceNotFound(resource_id.clone()))?;
        let job = self
            .snapshot
            .job(job_id)
            .cloned()
            .ok_or_else(|| BoardError::JobNotFound(job_id.clone()))?;

        let rules = self.rules.snapshot();
        if let Decision::Rejected(reason) =
            validate::validate_drop(resource.resource_type, &job, row, &rules, &self.snapshot)
        {
            return Err(BoardError::Rejected(reason));
        }

        let slot = slot_for_job(&job);
        if let Some(conflicting) =
            conflict::double_shift_conflict(resource_id, &slot, &self.snapshot)
        {
            if !options.multi_shift {
                return Err(BoardError::Rejected(RejectReason::DoubleShiftConflict {
                    conflicting_assignment: conflicting,
                }));
            }
        }

        let id = AssignmentId::from(self.id_gen.next());
        let position = options
            .position
            .unwrap_or(self.snapshot.row_occupancy(job_id, row) as u32);
        let mut assignment = Assignment::new(
            id.clone(),
            resource_id.clone(),
            job_id.clone(),
            row,
            position,
            slot,
        );
        assignment.multi_shift = options.multi_shift;
        assignment.phase = AssignmentPhase::Proposed
            .transition(PhaseEvent::Validate)
            .transition(PhaseEvent::Commit);

        self.journal_write(RecordKey::Assignment(id.clone()), None);
        self.snapshot.upsert_assignment(assignment.clone());
        self.registry
            .recompute(resource_id, self.snapshot.assignment_count(resource_id));
        self.outbox.push_back(WriteOp::CreateAssignment(assignment));
        tracing::debug!(resource = %resource_id, job = %job_id, %row, "assigned");
        Ok(id)
    }

    /// If the assigned resource is a truck whose last known driver is still
    /// available, bring the driver along and attach them.
    fn auto_attach_driver(
        &mut self,
        resource_id: &ResourceId,
        truck_assignment: &AssignmentId,
    ) -> SecondaryOutcome {
        let is_truck = self
            .snapshot
            .resource(resource_id)
            .map(|r| r.resource_type == ResourceType::Truck)
            .unwrap_or(false);
        if !is_truck {
            return SecondaryOutcome::None;
        }
        let Some(driver) = self.registry.last_pairing(resource_id).cloned() else {
            return SecondaryOutcome::None;
        };
        if self.registry.status(&driver) != Some(MagnetStatus::Available) {
            return SecondaryOutcome::None;
        }
        let Some(truck) = self.snapshot.assignment(truck_assignment).cloned() else {
            return SecondaryOutcome::None;
        };

        let driver_assignment =
            match self.assign_one(&driver, &truck.job_id, truck.row, &AssignOptions::default()) {
                Ok(id) => id,
                Err(error) => {
                    tracing::debug!(%driver, %error, "driver auto-assign declined");
                    return SecondaryOutcome::Failed {
                        reason: error.to_string(),
                    };
                }
            };
        match self.attach(&driver_assignment, truck_assignment) {
            Ok(()) => SecondaryOutcome::AutoAttached {
                driver,
                assignment_id: driver_assignment,
            },
            Err(error) => {
                // The half-done follow-up is withdrawn; the truck stays
                self.delete_assignment_local(&driver_assignment);
                self.discard_pending(&RecordKey::Assignment(driver_assignment));
                tracing::debug!(%driver, %error, "driver auto-attach declined");
                SecondaryOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Attach one assignment onto another in the same job
    pub fn attach(
        &mut self,
        source_id: &AssignmentId,
        target_id: &AssignmentId,
    ) -> Result<(), BoardError> {
        let source = self
            .snapshot
            .assignment(source_id)
            .cloned()
            .ok_or_else(|| BoardError::AssignmentNotFound(source_id.clone()))?;
        let target = self
            .snapshot
            .assignment(target_id)
            .cloned()
            .ok_or_else(|| BoardError::AssignmentNotFound(target_id.clone()))?;

        let rules = self.rules.snapshot();
        if let Decision::Rejected(reason) =
            validate::validate_attach(&source, &target, &rules, &self.snapshot)
        {
            return Err(BoardError::Rejected(reason));
        }
        if source.attached_to.as_ref() == Some(target_id) {
            return Ok(());
        }

        self.journal_write(
            RecordKey::Assignment(source_id.clone()),
            Some(Record::Assignment(source.clone())),
        );
        self.snapshot.set_attached(source_id, Some(target_id.clone()));

        // Remember employee/equipment pairings for the assign follow-up
        if let (Some(src_res), Some(tgt_res)) = (
            self.snapshot.resource(&source.resource_id),
            self.snapshot.resource(&target.resource_id),
        ) {
            if src_res.resource_type.is_employee() && tgt_res.resource_type.is_equipment() {
                self.registry
                    .record_pairing(target.resource_id.clone(), source.resource_id.clone());
            }
        }

        if let Some(updated) = self.snapshot.assignment(source_id).cloned() {
            self.outbox.push_back(WriteOp::UpdateAssignment(updated));
        }
        tracing::debug!(source = %source_id, target = %target_id, "attached");
        Ok(())
    }

    /// Detach an assignment from its parent. Always succeeds for an
    /// existing assignment; detaching an unattached one is a no-op.
    pub fn detach(&mut self, id: &AssignmentId) -> Result<(), BoardError> {
        let before = self
            .snapshot
            .assignment(id)
            .cloned()
            .ok_or_else(|| BoardError::AssignmentNotFound(id.clone()))?;
        if !before.is_attached() {
            return Ok(());
        }

        self.journal_write(
            RecordKey::Assignment(id.clone()),
            Some(Record::Assignment(before)),
        );
        self.snapshot.set_attached(id, None);
        if let Some(updated) = self.snapshot.assignment(id).cloned() {
            self.outbox.push_back(WriteOp::UpdateAssignment(updated));
        }
        tracing::debug!(assignment = %id, "detached");
        Ok(())
    }

    /// Remove an assignment from the board and queue its deletion.
    /// Children are detached, never deleted with it.
    pub fn unassign(&mut self, id: &AssignmentId) -> Result<(), BoardError> {
        if self.snapshot.assignment(id).is_none() {
            return Err(BoardError::AssignmentNotFound(id.clone()));
        }
        self.delete_assignment_local(id);
        Ok(())
    }

    fn delete_assignment_local(&mut self, id: &AssignmentId) {
        let orphans: Vec<AssignmentId> = self
            .snapshot
            .children_of(id)
            .iter()
            .map(|c| c.id.clone())
            .collect();
        for orphan in &orphans {
            if let Some(child) = self.snapshot.assignment(orphan).cloned() {
                self.journal_write(
                    RecordKey::Assignment(orphan.clone()),
                    Some(Record::Assignment(child)),
                );
            }
        }

        let Some(before) = self.snapshot.assignment(id).cloned() else {
            return;
        };
        self.journal_write(
            RecordKey::Assignment(id.clone()),
            Some(Record::Assignment(before.clone())),
        );
        self.snapshot.remove_assignment(id);
        self.registry.recompute(
            &before.resource_id,
            self.snapshot.assignment_count(&before.resource_id),
        );

        // The detached children changed too and must be written back
        for orphan in orphans {
            if let Some(child) = self.snapshot.assignment(&orphan).cloned() {
                self.outbox.push_back(WriteOp::UpdateAssignment(child));
            }
        }
        self.outbox.push_back(WriteOp::DeleteAssignment(id.clone()));
    }

    /// Move an assignment together with everything attached under it.
    ///
    /// The whole group is validated against the destination row before any
    /// member moves; a rejection leaves the board untouched.
    pub fn move_assignment(
        &mut self,
        id: &AssignmentId,
        new_job_id: &JobId,
        new_row: RowKind,
    ) -> Result<(), BoardError> {
        let root = self
            .snapshot
            .assignment(id)
            .cloned()
            .ok_or_else(|| BoardError::AssignmentNotFound(id.clone()))?;
        let job = self
            .snapshot
            .job(new_job_id)
            .cloned()
            .ok_or_else(|| BoardError::JobNotFound(new_job_id.clone()))?;

        let members = self.snapshot.subtree_of(id);
        let moving: BTreeSet<AssignmentId> = members.iter().cloned().collect();
        let mut member_types = Vec::with_capacity(members.len());
        for member in &members {
            let resource_type = self
                .snapshot
                .assignment(member)
                .and_then(|a| self.snapshot.resource(&a.resource_id))
                .map(|r| r.resource_type);
            match resource_type {
                Some(rt) => member_types.push(rt),
                None => {
                    return Err(BoardError::Rejected(RejectReason::RowTypeMismatch {
                        resource_type: None,
                        row: new_row,
                    }))
                }
            }
        }

        let rules = self.rules.snapshot();
        if let Decision::Rejected(reason) = validate::validate_group_move(
            &member_types,
            &job,
            new_row,
            &rules,
            &self.snapshot,
            &moving,
        ) {
            return Err(BoardError::Rejected(reason));
        }

        // The root leaves its parent behind when the parent stays put
        if let Some(parent) = &root.attached_to {
            if !moving.contains(parent) {
                self.journal_write(
                    RecordKey::Assignment(id.clone()),
                    Some(Record::Assignment(root.clone())),
                );
                self.snapshot.set_attached(id, None);
            }
        }

        let base = self
            .snapshot
            .assignments_for_job(new_job_id)
            .iter()
            .filter(|a| a.row == new_row && !moving.contains(&a.id))
            .count() as u32;
        let slot = slot_for_job(&job);

        for (offset, member) in members.iter().enumerate() {
            let Some(before) = self.snapshot.assignment(member).cloned() else {
                continue;
            };
            self.journal_write(
                RecordKey::Assignment(member.clone()),
                Some(Record::Assignment(before.clone())),
            );
            let mut moved = before;
            moved.job_id = new_job_id.clone();
            moved.row = new_row;
            moved.position = base + offset as u32;
            moved.time_slot = slot;
            self.snapshot.upsert_assignment(moved.clone());
            self.outbox.push_back(WriteOp::UpdateAssignment(moved));
        }
        tracing::debug!(assignment = %id, job = %new_job_id, %new_row, group = members.len(), "group moved");
        Ok(())
    }

    // ---- finalization ----------------------------------------------------

    /// Lock a job once every required attachment is in place.
    ///
    /// On failure the complete violation list comes back in the error so the
    /// caller can show all of it at once.
    pub fn finalize_job(&mut self, job_id: &JobId) -> Result<(), BoardError> {
        let mut job = self
            .snapshot
            .job(job_id)
            .cloned()
            .ok_or_else(|| BoardError::JobNotFound(job_id.clone()))?;

        let rules = self.rules.snapshot();
        let violations = validate::validate_finalize(&job, &rules, &self.snapshot);
        if !violations.is_empty() {
            return Err(BoardError::Rejected(
                RejectReason::MissingRequiredAttachment(violations),
            ));
        }
        if job.finalized {
            return Ok(());
        }

        self.journal_write(
            RecordKey::Job(job_id.clone()),
            Some(Record::Job(job.clone())),
        );
        job.finalized = true;
        self.snapshot.upsert_job(job.clone());
        self.outbox.push_back(WriteOp::PutJob(job));
        tracing::info!(job = %job_id, "job finalized");
        Ok(())
    }

    /// Unlock a finalized job. No preconditions.
    pub fn unfinalize_job(&mut self, job_id: &JobId) -> Result<(), BoardError> {
        let mut job = self
            .snapshot
            .job(job_id)
            .cloned()
            .ok_or_else(|| BoardError::JobNotFound(job_id.clone()))?;
        if !job.finalized {
            return Ok(());
        }

        self.journal_write(
            RecordKey::Job(job_id.clone()),
            Some(Record::Job(job.clone())),
        );
        job.finalized = false;
        self.snapshot.upsert_job(job.clone());
        self.outbox.push_back(WriteOp::PutJob(job));
        Ok(())
    }

    /// The finalization violations a job currently has, without mutating
    pub fn finalize_violations(&self, job_id: &JobId) -> Result<Vec<FinalizeViolation>, BoardError> {
        let job = self
            .snapshot
            .job(job_id)
            .ok_or_else(|| BoardError::JobNotFound(job_id.clone()))?;
        let rules = self.rules.snapshot();
        Ok(validate::validate_finalize(job, &rules, &self.snapshot))
    }

    // ---- drag lifecycle --------------------------------------------------

    pub fn begin_drag(&mut self, id: &ResourceId) {
        self.registry.begin_drag(id);
    }

    pub fn end_drag(&mut self, id: &ResourceId) {
        self.registry.end_drag(id);
    }

    // ---- read views ------------------------------------------------------

    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    pub fn registry(&self) -> &MagnetRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn magnet_status(&self, id: &ResourceId) -> Option<MagnetStatus> {
        self.registry.status(id)
    }

    /// Assignments of a job in display order (row, then position)
    pub fn assignments_for_job(&self, job_id: &JobId) -> Vec<Assignment> {
        self.snapshot
            .assignments_for_job(job_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Number of writes waiting for the next sync
    pub fn pending_writes(&self) -> usize {
        self.outbox.len()
    }

    // ---- journal bookkeeping (shared with the reconciler) ----------------

    /// Record rollback state for a key.
    ///
    /// Within one unacknowledged window the earliest `before` is kept. An
    /// entry the store already acked is replaced wholesale: its write is
    /// durable, so the new mutation opens a fresh window on top of it.
    pub(crate) fn journal_write(&mut self, key: RecordKey, before: Option<Record>) {
        if let Some(pending) = self.journal.get(&key) {
            if matches!(pending.state, PendingState::AwaitingAck) {
                return;
            }
        }
        let provisional = Version(self.versions.get(&key).map(|v| v.0).unwrap_or(0) + 1);
        self.journal.insert(
            key,
            PendingWrite {
                before,
                provisional,
                state: PendingState::AwaitingAck,
            },
        );
    }

    /// Forget the journal entry and queued writes for a key
    pub(crate) fn discard_pending(&mut self, key: &RecordKey) {
        self.journal.remove(key);
        self.outbox.retain(|op| op.key() != *key);
    }

    pub(crate) fn snapshot_mut(&mut self) -> &mut BoardSnapshot {
        &mut self.snapshot
    }

    pub(crate) fn registry_mut(&mut self) -> &mut MagnetRegistry {
        &mut self.registry
    }

    pub(crate) fn recompute_magnet(&mut self, id: &ResourceId) {
        let count = self.snapshot.assignment_count(id);
        self.registry.recompute(id, count);
    }
}

/// The concrete window an assignment occupies, derived from its job
fn slot_for_job(job: &Job) -> TimeSlot {
    let (start, end) = match job.shift {
        Shift::Day => (hms(7, 0), hms(15, 0)),
        Shift::Night => (hms(19, 0), hms(23, 59)),
    };
    TimeSlot {
        date: job.schedule_date,
        shift: job.shift,
        start,
        end,
    }
}

fn hms(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
