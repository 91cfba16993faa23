// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store fake for testing

use crate::event::{ChangeEvent, ChangeKind, Record, RecordKey, Version};
use crate::store::{ChangeReceiver, Store, StoreError};
use async_trait::async_trait;
use mb_core::{Assignment, AssignmentId, Job, Resource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateAssignment { id: AssignmentId },
    UpdateAssignment { id: AssignmentId },
    DeleteAssignment { id: AssignmentId },
    PutResource { id: String },
    PutJob { id: String },
}

#[derive(Default)]
struct Inner {
    records: HashMap<RecordKey, (Record, Version)>,
    next_version: u64,
    subscribers: Vec<mpsc::UnboundedSender<ChangeEvent>>,
    calls: Vec<StoreCall>,
    scripted_failures: Vec<StoreError>,
}

impl Inner {
    fn next_version(&mut self) -> Version {
        self.next_version += 1;
        Version(self.next_version)
    }

    fn broadcast(&mut self, event: ChangeEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn take_failure(&mut self) -> Option<StoreError> {
        if self.scripted_failures.is_empty() {
            None
        } else {
            Some(self.scripted_failures.remove(0))
        }
    }

    fn commit(&mut self, kind: ChangeKind, record: Record) -> Version {
        let version = self.next_version();
        let key = record.key();
        tracing::debug!(?kind, ?key, %version, "store commit");
        match kind {
            ChangeKind::Delete => {
                self.records.remove(&key);
            }
            _ => {
                self.records.insert(key, (record.clone(), version));
            }
        }
        self.broadcast(ChangeEvent {
            kind,
            record,
            version,
        });
        version
    }
}

/// In-memory store assigning monotonic versions and echoing every write to
/// all subscribers. Failures can be scripted for rollback tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Fail the next write with a rejection
    pub fn fail_next(&self, reason: &str) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .scripted_failures
            .push(StoreError::Rejected {
                reason: reason.to_string(),
            });
    }

    /// Time out the next write
    pub fn timeout_next(&self) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .scripted_failures
            .push(StoreError::Timeout);
    }

    /// Current version of a stored record, if present
    pub fn version_of(&self, key: &RecordKey) -> Option<Version> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .get(key)
            .map(|(_, v)| *v)
    }

    /// Stored record, if present
    pub fn record(&self, key: &RecordKey) -> Option<Record> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .get(key)
            .map(|(r, _)| r.clone())
    }

    /// Simulate a write from another client: commits the record with a
    /// fresh version and echoes it to every subscriber.
    pub fn emit_remote(&self, kind: ChangeKind, record: Record) -> Version {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .commit(kind, record)
    }

    fn write(
        &self,
        call: StoreCall,
        kind: ChangeKind,
        record: Record,
    ) -> Result<Version, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.calls.push(call);
        if let Some(failure) = inner.take_failure() {
            return Err(failure);
        }
        Ok(inner.commit(kind, record))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_assignment(&self, assignment: &Assignment) -> Result<Version, StoreError> {
        self.write(
            StoreCall::CreateAssignment {
                id: assignment.id.clone(),
            },
            ChangeKind::Insert,
            Record::Assignment(assignment.clone()),
        )
    }

    async fn update_assignment(&self, assignment: &Assignment) -> Result<Version, StoreError> {
        self.write(
            StoreCall::UpdateAssignment {
                id: assignment.id.clone(),
            },
            ChangeKind::Update,
            Record::Assignment(assignment.clone()),
        )
    }

    async fn delete_assignment(&self, id: &AssignmentId) -> Result<Version, StoreError> {
        let existing = self.record(&RecordKey::Assignment(id.clone()));
        let record = match existing {
            Some(record) => record,
            None => {
                return Err(StoreError::Rejected {
                    reason: format!("no such assignment: {}", id),
                })
            }
        };
        self.write(
            StoreCall::DeleteAssignment { id: id.clone() },
            ChangeKind::Delete,
            record,
        )
    }

    async fn put_resource(&self, resource: &Resource) -> Result<Version, StoreError> {
        self.write(
            StoreCall::PutResource {
                id: resource.id.to_string(),
            },
            ChangeKind::Update,
            Record::Resource(resource.clone()),
        )
    }

    async fn put_job(&self, job: &Job) -> Result<Version, StoreError> {
        self.write(
            StoreCall::PutJob {
                id: job.id.to_string(),
            },
            ChangeKind::Update,
            Record::Job(job.clone()),
        )
    }

    fn subscribe(&self) -> ChangeReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .push(tx);
        rx
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
