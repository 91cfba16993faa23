// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned change events from the backing store

use mb_core::{Assignment, AssignmentId, Job, JobId, Resource, ResourceId};
use serde::{Deserialize, Serialize};

/// Store-assigned record version, monotonically increasing per store
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Version(pub u64);

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// The table a change event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Assignments,
    Resources,
    Jobs,
}

/// Kind of remote change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A persisted record, as carried by change events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum Record {
    Assignment(Assignment),
    Resource(Resource),
    Job(Job),
}

/// Key identifying a record across tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    Assignment(AssignmentId),
    Resource(ResourceId),
    Job(JobId),
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Record::Assignment(_) => Table::Assignments,
            Record::Resource(_) => Table::Resources,
            Record::Job(_) => Table::Jobs,
        }
    }

    pub fn key(&self) -> RecordKey {
        match self {
            Record::Assignment(a) => RecordKey::Assignment(a.id.clone()),
            Record::Resource(r) => RecordKey::Resource(r.id.clone()),
            Record::Job(j) => RecordKey::Job(j.id.clone()),
        }
    }
}

/// A change observed on the backing store, echoed to every subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub record: Record,
    pub version: Version,
}

impl ChangeEvent {
    pub fn table(&self) -> Table {
        self.record.table()
    }

    pub fn key(&self) -> RecordKey {
        self.record.key()
    }
}
