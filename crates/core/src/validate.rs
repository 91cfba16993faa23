// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The validation engine: pure accept/reject decisions over a snapshot
//!
//! Every function here is side-effect free and evaluates against the
//! pre-operation snapshot only. Rejections are values, not errors; they are
//! expected outcomes surfaced verbatim to the caller. An unknown row or
//! resource type is always a rejection, never a silent accept.

use crate::assignment::Assignment;
use crate::id::AssignmentId;
use crate::job::{Job, RowKind};
use crate::resource::ResourceType;
use crate::rules::RuleSet;
use crate::snapshot::BoardSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Why a proposed operation was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The resource type may not occupy this row (or no rule exists).
    /// `resource_type` is `None` when the resource itself is unknown.
    RowTypeMismatch {
        resource_type: Option<ResourceType>,
        row: RowKind,
    },
    /// The row is already at its configured max count
    RowFull { row: RowKind, max: u32 },
    /// The attachment would exceed the pair's max count
    MaxAttachmentExceeded {
        source: ResourceType,
        target: ResourceType,
        max: u32,
    },
    /// The operator is not authorized for this equipment type
    NotAuthorizedEquipment {
        operator: ResourceType,
        equipment: ResourceType,
    },
    /// The attachment would make an assignment its own ancestor
    CycleDetected,
    /// Source and target belong to different jobs
    CrossJobAttachment,
    /// The resource already works an overlapping slot
    DoubleShiftConflict {
        conflicting_assignment: AssignmentId,
    },
    /// Finalization requirements unmet (all violations, not just the first)
    MissingRequiredAttachment(Vec<FinalizeViolation>),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::RowTypeMismatch { resource_type, row } => match resource_type {
                Some(rt) => write!(f, "{} may not occupy the {} row", rt, row),
                None => write!(f, "unknown resource may not occupy the {} row", row),
            },
            RejectReason::RowFull { row, max } => {
                write!(f, "the {} row is full ({} max)", row, max)
            }
            RejectReason::MaxAttachmentExceeded { source, target, max } => {
                write!(f, "at most {} {}(s) may attach to a {}", max, source, target)
            }
            RejectReason::NotAuthorizedEquipment { operator, equipment } => {
                write!(f, "{} is not authorized to run a {}", operator, equipment)
            }
            RejectReason::CycleDetected => write!(f, "attachment would create a cycle"),
            RejectReason::CrossJobAttachment => {
                write!(f, "cannot attach across different jobs")
            }
            RejectReason::DoubleShiftConflict { conflicting_assignment } => {
                write!(
                    f,
                    "resource already booked by assignment {}",
                    conflicting_assignment
                )
            }
            RejectReason::MissingRequiredAttachment(violations) => {
                let list: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                write!(f, "missing required attachments: {}", list.join(", "))
            }
        }
    }
}

/// One unmet finalization requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeViolation {
    /// The assignment missing an attachment
    pub assignment_id: AssignmentId,
    /// Its resource type
    pub target_type: ResourceType,
    /// The required attached type that is absent
    pub missing_type: ResourceType,
}

impl std::fmt::Display for FinalizeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} requires {}", self.target_type, self.missing_type)
    }
}

/// Outcome of a validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected(RejectReason),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted)
    }

    /// The rejection reason, if any
    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            Decision::Accepted => None,
            Decision::Rejected(reason) => Some(reason),
        }
    }
}

/// Validate dropping a resource of the given type into a job row
pub fn validate_drop(
    resource_type: ResourceType,
    job: &Job,
    row: RowKind,
    rules: &RuleSet,
    snapshot: &BoardSnapshot,
) -> Decision {
    let Some(rule) = rules.drop_rule(job.job_type, row) else {
        return Decision::Rejected(RejectReason::RowTypeMismatch {
            resource_type: Some(resource_type),
            row,
        });
    };
    if !rule.allows(resource_type) {
        return Decision::Rejected(RejectReason::RowTypeMismatch {
            resource_type: Some(resource_type),
            row,
        });
    }
    if let Some(max) = rule.max_count {
        if snapshot.row_occupancy(&job.id, row) >= max as usize {
            return Decision::Rejected(RejectReason::RowFull { row, max });
        }
    }
    Decision::Accepted
}

/// Validate moving a whole attachment group into a job row.
///
/// Every member must be allowed in the new row (the invariant holds for
/// attached kin, not just the dragged root), and the row must have room for
/// the entire group. `moving` is excluded from the occupancy count so a move
/// within the same row does not count against itself.
pub fn validate_group_move(
    member_types: &[ResourceType],
    job: &Job,
    row: RowKind,
    rules: &RuleSet,
    snapshot: &BoardSnapshot,
    moving: &BTreeSet<AssignmentId>,
) -> Decision {
    let Some(rule) = rules.drop_rule(job.job_type, row) else {
        return Decision::Rejected(RejectReason::RowTypeMismatch {
            resource_type: member_types.first().copied(),
            row,
        });
    };
    for &member in member_types {
        if !rule.allows(member) {
            return Decision::Rejected(RejectReason::RowTypeMismatch {
                resource_type: Some(member),
                row,
            });
        }
    }
    if let Some(max) = rule.max_count {
        let occupancy = snapshot
            .assignments_for_job(&job.id)
            .iter()
            .filter(|a| a.row == row && !moving.contains(&a.id))
            .count();
        if occupancy + member_types.len() > max as usize {
            return Decision::Rejected(RejectReason::RowFull { row, max });
        }
    }
    Decision::Accepted
}

/// Validate attaching `source` onto `target`
pub fn validate_attach(
    source: &Assignment,
    target: &Assignment,
    rules: &RuleSet,
    snapshot: &BoardSnapshot,
) -> Decision {
    if source.job_id != target.job_id {
        return Decision::Rejected(RejectReason::CrossJobAttachment);
    }
    if source.id == target.id || snapshot.is_ancestor(&source.id, &target.id) {
        return Decision::Rejected(RejectReason::CycleDetected);
    }

    // Resource types come from the snapshot; an unknown resource is a
    // mismatch, never a silent accept
    let (Some(source_res), Some(target_res)) = (
        snapshot.resource(&source.resource_id),
        snapshot.resource(&target.resource_id),
    ) else {
        return Decision::Rejected(RejectReason::RowTypeMismatch {
            resource_type: None,
            row: source.row,
        });
    };
    let source_type = source_res.resource_type;
    let target_type = target_res.resource_type;

    // Already attached to this target: nothing to validate
    if source.attached_to.as_ref() == Some(&target.id) {
        return Decision::Accepted;
    }

    let Some(rule) = rules.interaction_rule(source_type, target_type) else {
        return Decision::Rejected(RejectReason::MaxAttachmentExceeded {
            source: source_type,
            target: target_type,
            max: 0,
        });
    };

    let existing = snapshot
        .children_of(&target.id)
        .iter()
        .filter(|child| {
            snapshot
                .resource(&child.resource_id)
                .map(|r| r.resource_type == source_type)
                .unwrap_or(false)
        })
        .count();
    if existing >= rule.max_count as usize {
        return Decision::Rejected(RejectReason::MaxAttachmentExceeded {
            source: source_type,
            target: target_type,
            max: rule.max_count,
        });
    }

    // Equipment-authorization safety rule: an employee with a non-empty
    // whitelist may only attach to listed equipment
    if source_type.is_employee()
        && target_type.is_equipment()
        && !source_res.authorized_for(target_type)
    {
        return Decision::Rejected(RejectReason::NotAuthorizedEquipment {
            operator: source_type,
            equipment: target_type,
        });
    }

    Decision::Accepted
}

/// Collect every unmet finalization requirement of a job.
///
/// Never fails fast: the caller gets the complete list for display.
pub fn validate_finalize(
    job: &Job,
    rules: &RuleSet,
    snapshot: &BoardSnapshot,
) -> Vec<FinalizeViolation> {
    let mut violations = Vec::new();

    for assignment in snapshot.assignments_for_job(&job.id) {
        let Some(resource) = snapshot.resource(&assignment.resource_id) else {
            continue;
        };
        let target_type = resource.resource_type;

        for (required_type, _rule) in rules.required_attachments_for(target_type) {
            let satisfied = snapshot.children_of(&assignment.id).iter().any(|child| {
                snapshot
                    .resource(&child.resource_id)
                    .map(|r| r.resource_type == required_type)
                    .unwrap_or(false)
            });
            if !satisfied {
                violations.push(FinalizeViolation {
                    assignment_id: assignment.id.clone(),
                    target_type,
                    missing_type: required_type,
                });
            }
        }
    }

    violations
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
