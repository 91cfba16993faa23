// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resources: the people and equipment assigned onto job rows

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};

/// The closed set of resource types known to the board.
///
/// Unknown names fail at deserialization time, so a misspelled type in a
/// rule file is a load error rather than a rule that silently never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Operator,
    Driver,
    Foreman,
    Laborer,
    Truck,
    Excavator,
    Paver,
    Roller,
    Skidsteer,
    Sweeper,
}

/// Broad classification of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    Employee,
    Equipment,
}

impl ResourceType {
    /// The class a resource type belongs to
    pub fn class_type(&self) -> ClassType {
        match self {
            ResourceType::Operator
            | ResourceType::Driver
            | ResourceType::Foreman
            | ResourceType::Laborer => ClassType::Employee,
            ResourceType::Truck
            | ResourceType::Excavator
            | ResourceType::Paver
            | ResourceType::Roller
            | ResourceType::Skidsteer
            | ResourceType::Sweeper => ClassType::Equipment,
        }
    }

    pub fn is_employee(&self) -> bool {
        self.class_type() == ClassType::Employee
    }

    pub fn is_equipment(&self) -> bool {
        self.class_type() == ClassType::Equipment
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceType::Operator => "operator",
            ResourceType::Driver => "driver",
            ResourceType::Foreman => "foreman",
            ResourceType::Laborer => "laborer",
            ResourceType::Truck => "truck",
            ResourceType::Excavator => "excavator",
            ResourceType::Paver => "paver",
            ResourceType::Roller => "roller",
            ResourceType::Skidsteer => "skidsteer",
            ResourceType::Sweeper => "sweeper",
        };
        write!(f, "{}", name)
    }
}

/// A person or piece of equipment with immutable identity.
///
/// Attributes other than `id` are owned by external collaborators and
/// updated through the registry on upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub resource_type: ResourceType,
    /// Equipment types this resource (an operator) is authorized to run.
    ///
    /// Empty means unrestricted: older records predate the whitelist and
    /// must keep working.
    #[serde(default)]
    pub allowed_equipment: Vec<ResourceType>,
    /// Whether the resource is currently on site
    #[serde(default)]
    pub on_site: bool,
}

impl Resource {
    pub fn new(id: impl Into<ResourceId>, name: impl Into<String>, rt: ResourceType) -> Self {
        Resource {
            id: id.into(),
            name: name.into(),
            resource_type: rt,
            allowed_equipment: Vec::new(),
            on_site: false,
        }
    }

    /// Restrict the equipment this resource may operate
    pub fn with_allowed_equipment(mut self, allowed: Vec<ResourceType>) -> Self {
        self.allowed_equipment = allowed;
        self
    }

    /// Whether this resource may operate the given equipment type.
    ///
    /// An empty whitelist authorizes everything.
    pub fn authorized_for(&self, equipment: ResourceType) -> bool {
        self.allowed_equipment.is_empty() || self.allowed_equipment.contains(&equipment)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
