// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The board snapshot: an indexed arena of resources, jobs, and assignments
//!
//! Assignments reference each other by id only (`attached_to`), so the
//! attachment graph needs no live pointers and cycle checks are bounded id
//! walks. Secondary indexes (by resource, by job, by parent) are maintained
//! on every mutation so status recomputation touches only the assignments
//! of the affected resource.

use crate::assignment::Assignment;
use crate::id::{AssignmentId, JobId, ResourceId};
use crate::job::{Job, RowKind};
use crate::resource::Resource;
use std::collections::{BTreeSet, HashMap};

/// Materialized board state all validations read
#[derive(Debug, Default, Clone)]
pub struct BoardSnapshot {
    resources: HashMap<ResourceId, Resource>,
    jobs: HashMap<JobId, Job>,
    assignments: HashMap<AssignmentId, Assignment>,
    by_resource: HashMap<ResourceId, BTreeSet<AssignmentId>>,
    by_job: HashMap<JobId, BTreeSet<AssignmentId>>,
    by_parent: HashMap<AssignmentId, BTreeSet<AssignmentId>>,
}

impl BoardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    // --- resources ---

    pub fn upsert_resource(&mut self, resource: Resource) {
        self.resources.insert(resource.id.clone(), resource);
    }

    pub fn remove_resource(&mut self, id: &ResourceId) -> Option<Resource> {
        self.resources.remove(id)
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    // --- jobs ---

    pub fn upsert_job(&mut self, job: Job) {
        self.jobs.insert(job.id.clone(), job);
    }

    pub fn remove_job(&mut self, id: &JobId) -> Option<Job> {
        self.jobs.remove(id)
    }

    pub fn job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn job_mut(&mut self, id: &JobId) -> Option<&mut Job> {
        self.jobs.get_mut(id)
    }

    // --- assignments ---

    pub fn assignment(&self, id: &AssignmentId) -> Option<&Assignment> {
        self.assignments.get(id)
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    /// Insert or replace an assignment, keeping all indexes consistent
    pub fn upsert_assignment(&mut self, assignment: Assignment) {
        if let Some(old) = self.assignments.remove(&assignment.id) {
            self.unindex(&old);
        }
        self.index(&assignment);
        self.assignments.insert(assignment.id.clone(), assignment);
    }

    /// Remove an assignment. Children of the removed assignment are
    /// detached so no `attached_to` link dangles.
    pub fn remove_assignment(&mut self, id: &AssignmentId) -> Option<Assignment> {
        let removed = self.assignments.remove(id)?;
        self.unindex(&removed);

        let orphans: Vec<AssignmentId> =
            self.by_parent.remove(id).into_iter().flatten().collect();
        for child_id in orphans {
            if let Some(child) = self.assignments.get_mut(&child_id) {
                child.attached_to = None;
            }
        }
        Some(removed)
    }

    /// Set or clear the parent link of an assignment
    pub fn set_attached(&mut self, id: &AssignmentId, parent: Option<AssignmentId>) {
        let old_parent = match self.assignments.get_mut(id) {
            Some(assignment) => assignment.attached_to.take(),
            None => return,
        };
        if let Some(old) = old_parent {
            if let Some(children) = self.by_parent.get_mut(&old) {
                children.remove(id);
            }
        }
        if let Some(parent_id) = parent {
            if let Some(assignment) = self.assignments.get_mut(id) {
                assignment.attached_to = Some(parent_id.clone());
            }
            self.by_parent
                .entry(parent_id)
                .or_default()
                .insert(id.clone());
        }
    }

    pub fn assignment_mut(&mut self, id: &AssignmentId) -> Option<&mut Assignment> {
        self.assignments.get_mut(id)
    }

    // --- queries ---

    /// Assignments referencing a resource
    pub fn assignments_for_resource(&self, id: &ResourceId) -> Vec<&Assignment> {
        self.by_resource
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|aid| self.assignments.get(aid))
            .collect()
    }

    /// Live assignment count for a resource (O(1) via index)
    pub fn assignment_count(&self, id: &ResourceId) -> usize {
        self.by_resource.get(id).map_or(0, |set| set.len())
    }

    /// Assignments in a job, ordered by row then position
    pub fn assignments_for_job(&self, id: &JobId) -> Vec<&Assignment> {
        let mut list: Vec<&Assignment> = self
            .by_job
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|aid| self.assignments.get(aid))
            .collect();
        list.sort_by_key(|a| (a.row, a.position, a.id.clone()));
        list
    }

    /// Occupant count of one row of a job
    pub fn row_occupancy(&self, id: &JobId, row: RowKind) -> usize {
        self.by_job
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|aid| self.assignments.get(aid))
            .filter(|a| a.row == row)
            .count()
    }

    /// Direct children attached to an assignment
    pub fn children_of(&self, id: &AssignmentId) -> Vec<&Assignment> {
        self.by_parent
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|aid| self.assignments.get(aid))
            .collect()
    }

    /// The full attachment subtree rooted at an assignment, root first.
    ///
    /// Bounded by total assignment count; the arena holds no cycles by
    /// construction but the walk guards against one anyway.
    pub fn subtree_of(&self, id: &AssignmentId) -> Vec<AssignmentId> {
        let mut result = Vec::new();
        let mut queue = vec![id.clone()];
        let mut seen = BTreeSet::new();
        while let Some(next) = queue.pop() {
            if !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(
                self.by_parent
                    .get(&next)
                    .into_iter()
                    .flatten()
                    .cloned(),
            );
            result.push(next);
        }
        result
    }

    /// Whether `candidate` appears on the ancestor chain of `id`
    pub fn is_ancestor(&self, candidate: &AssignmentId, id: &AssignmentId) -> bool {
        let mut hops = self.assignments.len() + 1;
        let mut current = self.assignments.get(id).and_then(|a| a.attached_to.as_ref());
        while let Some(parent) = current {
            if parent == candidate {
                return true;
            }
            hops = hops.saturating_sub(1);
            if hops == 0 {
                return false;
            }
            current = self
                .assignments
                .get(parent)
                .and_then(|a| a.attached_to.as_ref());
        }
        false
    }

    fn index(&mut self, assignment: &Assignment) {
        self.by_resource
            .entry(assignment.resource_id.clone())
            .or_default()
            .insert(assignment.id.clone());
        self.by_job
            .entry(assignment.job_id.clone())
            .or_default()
            .insert(assignment.id.clone());
        if let Some(parent) = &assignment.attached_to {
            self.by_parent
                .entry(parent.clone())
                .or_default()
                .insert(assignment.id.clone());
        }
    }

    fn unindex(&mut self, assignment: &Assignment) {
        if let Some(set) = self.by_resource.get_mut(&assignment.resource_id) {
            set.remove(&assignment.id);
        }
        if let Some(set) = self.by_job.get_mut(&assignment.job_id) {
            set.remove(&assignment.id);
        }
        if let Some(parent) = &assignment.attached_to {
            if let Some(set) = self.by_parent.get_mut(parent) {
                set.remove(&assignment.id);
            }
        }
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
