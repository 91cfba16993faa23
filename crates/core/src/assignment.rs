// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assignments and their lifecycle state machine
//!
//! An assignment places one resource into one job row. Assignments form a
//! forest: `attached_to` points at the parent assignment (an operator riding
//! an excavator, a driver with their truck). The parent link is an id, never
//! a live reference; cycle checks walk the ancestor chain by lookup.

use crate::id::{AssignmentId, JobId, ResourceId};
use crate::job::{RowKind, Shift};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// The scheduled window an assignment occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub shift: Shift,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Whether two slots book the same resource twice.
    ///
    /// Any second booking on the same date is a double booking, even with
    /// disjoint shift windows; the caller's explicit multi-shift flag is the
    /// only way to hold both.
    pub fn conflicts_with(&self, other: &TimeSlot) -> bool {
        self.date == other.date
    }

    /// Whether the clock windows of two slots intersect
    pub fn windows_intersect(&self, other: &TimeSlot) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }
}

/// Lifecycle phase of an assignment.
///
/// Local mutations commit optimistically; persistence and the remote echo
/// advance the phase, failure before `Persisted` rolls it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentPhase {
    /// Proposed by a gesture, not yet validated
    Proposed,
    /// Validation passed, mutation not yet applied
    Validated,
    /// Applied to local state, write queued
    Committed,
    /// Backing store acknowledged the write
    Persisted,
    /// Store echo observed, lifecycle complete
    Reconciled,
    /// Validation rejected the operation
    Rejected { reason: String },
    /// Optimistic mutation reverted after a write failure
    RolledBack { reason: String },
}

/// Events that advance an assignment's phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEvent {
    Validate,
    Commit,
    Persist,
    Reconcile,
    Reject { reason: String },
    RollBack { reason: String },
}

impl AssignmentPhase {
    /// Pure transition function. Invalid transitions leave the phase as-is.
    pub fn transition(&self, event: PhaseEvent) -> AssignmentPhase {
        match (self, event) {
            (AssignmentPhase::Proposed, PhaseEvent::Validate) => AssignmentPhase::Validated,
            (AssignmentPhase::Validated, PhaseEvent::Commit) => AssignmentPhase::Committed,
            (AssignmentPhase::Committed, PhaseEvent::Persist) => AssignmentPhase::Persisted,
            (AssignmentPhase::Persisted, PhaseEvent::Reconcile) => AssignmentPhase::Reconciled,

            // Rejection is only possible before the local commit
            (
                AssignmentPhase::Proposed | AssignmentPhase::Validated,
                PhaseEvent::Reject { reason },
            ) => AssignmentPhase::Rejected { reason },

            // Rollback is only possible before the store acknowledges
            (
                AssignmentPhase::Validated | AssignmentPhase::Committed,
                PhaseEvent::RollBack { reason },
            ) => AssignmentPhase::RolledBack { reason },

            (phase, _) => phase.clone(),
        }
    }

    /// Whether this phase is terminal for a failed operation
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            AssignmentPhase::Rejected { .. } | AssignmentPhase::RolledBack { .. }
        )
    }
}

/// One resource placed into one job row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub resource_id: ResourceId,
    pub job_id: JobId,
    pub row: RowKind,
    /// Ordering within the row
    pub position: u32,
    /// Parent assignment this one is physically attached to
    pub attached_to: Option<AssignmentId>,
    pub time_slot: TimeSlot,
    /// Set when the caller explicitly requested a second booking
    #[serde(default)]
    pub multi_shift: bool,
    pub phase: AssignmentPhase,
    /// Store-assigned version of the last acknowledged write
    pub version: Option<u64>,
}

impl Assignment {
    pub fn new(
        id: impl Into<AssignmentId>,
        resource_id: impl Into<ResourceId>,
        job_id: impl Into<JobId>,
        row: RowKind,
        position: u32,
        time_slot: TimeSlot,
    ) -> Self {
        Assignment {
            id: id.into(),
            resource_id: resource_id.into(),
            job_id: job_id.into(),
            row,
            position,
            attached_to: None,
            time_slot,
            multi_shift: false,
            phase: AssignmentPhase::Proposed,
            version: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached_to.is_some()
    }
}

#[cfg(test)]
#[path = "assignment_tests.rs"]
mod tests;
