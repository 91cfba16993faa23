// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-assignment conflict detection
//!
//! Checks that cannot be made from a single proposed change alone: double
//! bookings across the whole board, and a whole-graph audit of attachment
//! counts as defense in depth alongside per-attach validation.

use crate::assignment::TimeSlot;
use crate::id::{AssignmentId, ResourceId};
use crate::resource::ResourceType;
use crate::rules::RuleSet;
use crate::snapshot::BoardSnapshot;
use std::collections::HashMap;

/// Find an existing assignment of the resource whose slot overlaps the
/// proposed one.
///
/// Scans only the assignments of that resource. The caller decides whether
/// an overlap is a conflict or an intentional multi-shift booking.
pub fn double_shift_conflict(
    resource_id: &ResourceId,
    proposed: &TimeSlot,
    snapshot: &BoardSnapshot,
) -> Option<AssignmentId> {
    snapshot
        .assignments_for_resource(resource_id)
        .iter()
        .find(|existing| existing.time_slot.conflicts_with(proposed))
        .map(|existing| existing.id.clone())
}

/// A live attachment count in excess of its rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountViolation {
    pub target: AssignmentId,
    pub source_type: ResourceType,
    pub count: usize,
    pub max: u32,
}

/// Audit the whole attachment graph against the configured max counts.
///
/// Per-attach validation already rejects excess attachments; this recount
/// catches divergence introduced by remote merges.
pub fn attachment_count_violations(
    rules: &RuleSet,
    snapshot: &BoardSnapshot,
) -> Vec<CountViolation> {
    let mut violations = Vec::new();

    for target in snapshot.assignments() {
        let Some(target_res) = snapshot.resource(&target.resource_id) else {
            continue;
        };

        let mut counts: HashMap<ResourceType, usize> = HashMap::new();
        for child in snapshot.children_of(&target.id) {
            if let Some(child_res) = snapshot.resource(&child.resource_id) {
                *counts.entry(child_res.resource_type).or_default() += 1;
            }
        }

        for (source_type, count) in counts {
            let max = rules
                .interaction_rule(source_type, target_res.resource_type)
                .map(|rule| rule.max_count)
                .unwrap_or(0);
            if count > max as usize {
                violations.push(CountViolation {
                    target: target.id.clone(),
                    source_type,
                    count,
                    max,
                });
            }
        }
    }

    violations
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
