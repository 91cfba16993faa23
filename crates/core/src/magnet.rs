// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Magnets: runtime views over resources with derived assignment status

use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// Derived status of a magnet.
///
/// Status is computed from the current assignment count, never stored
/// durably. `Dragging` is transient: it overrides the count only while a
/// drag gesture targeting this magnet is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnetStatus {
    Available,
    Assigned,
    MultiAssigned,
    Dragging,
}

impl MagnetStatus {
    /// Status derived from an assignment count
    pub fn from_count(count: usize) -> MagnetStatus {
        match count {
            0 => MagnetStatus::Available,
            1 => MagnetStatus::Assigned,
            _ => MagnetStatus::MultiAssigned,
        }
    }
}

/// Runtime wrapper around a resource.
///
/// Created and destroyed by the registry as the backing resource set
/// changes; a magnet never outlives its resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Magnet {
    pub resource: Resource,
    status: MagnetStatus,
    dragging: bool,
}

impl Magnet {
    pub fn new(resource: Resource) -> Self {
        Magnet {
            resource,
            status: MagnetStatus::Available,
            dragging: false,
        }
    }

    pub fn status(&self) -> MagnetStatus {
        if self.dragging {
            MagnetStatus::Dragging
        } else {
            self.status
        }
    }

    /// Recompute status from the live assignment count
    pub fn set_assignment_count(&mut self, count: usize) {
        self.status = MagnetStatus::from_count(count);
    }

    /// Mark a drag gesture in progress
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Clear the drag flag, restoring the count-derived status
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }
}

#[cfg(test)]
#[path = "magnet_tests.rs"]
mod tests;
