// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The magnet registry: id -> live magnet, with derived status upkeep
//!
//! One registry exists per board session and is passed by reference to the
//! components that need it; there is no global instance, so tests get
//! isolated registries for free.

use mb_core::{Magnet, MagnetStatus, Resource, ResourceId};
use std::collections::HashMap;

/// Maps resources to their live magnets
#[derive(Debug, Default)]
pub struct MagnetRegistry {
    magnets: HashMap<ResourceId, Magnet>,
    /// Last employee seen attached to a piece of equipment, kept for the
    /// auto-reattach convenience on assign
    last_pairing: HashMap<ResourceId, ResourceId>,
}

impl MagnetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or refresh the magnet for a resource, preserving its status
    pub fn upsert_resource(&mut self, resource: Resource) {
        match self.magnets.get_mut(&resource.id) {
            Some(magnet) => magnet.resource = resource,
            None => {
                let id = resource.id.clone();
                self.magnets.insert(id, Magnet::new(resource));
            }
        }
    }

    /// Drop the magnet with its resource; a magnet never outlives its
    /// resource
    pub fn remove_resource(&mut self, id: &ResourceId) -> Option<Magnet> {
        self.last_pairing.remove(id);
        self.magnets.remove(id)
    }

    pub fn get(&self, id: &ResourceId) -> Option<&Magnet> {
        self.magnets.get(id)
    }

    pub fn status(&self, id: &ResourceId) -> Option<MagnetStatus> {
        self.magnets.get(id).map(|m| m.status())
    }

    pub fn all_magnets(&self) -> impl Iterator<Item = &Magnet> {
        self.magnets.values()
    }

    /// Recompute one magnet's status from its live assignment count.
    /// O(assignments touching that resource), via the board's index.
    pub fn recompute(&mut self, id: &ResourceId, assignment_count: usize) {
        if let Some(magnet) = self.magnets.get_mut(id) {
            magnet.set_assignment_count(assignment_count);
        }
    }

    pub fn begin_drag(&mut self, id: &ResourceId) {
        if let Some(magnet) = self.magnets.get_mut(id) {
            magnet.begin_drag();
        }
    }

    pub fn end_drag(&mut self, id: &ResourceId) {
        if let Some(magnet) = self.magnets.get_mut(id) {
            magnet.end_drag();
        }
    }

    /// Remember which employee last rode this piece of equipment
    pub fn record_pairing(&mut self, equipment: ResourceId, employee: ResourceId) {
        self.last_pairing.insert(equipment, employee);
    }

    pub fn last_pairing(&self, equipment: &ResourceId) -> Option<&ResourceId> {
        self.last_pairing.get(equipment)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
