// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The abstract store contract

use crate::event::{ChangeEvent, Version};
use async_trait::async_trait;
use mb_core::{Assignment, AssignmentId, Job, Resource};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from the backing store.
///
/// A timeout is handled identically to a rejection by callers: the
/// optimistic mutation is rolled back either way.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store rejected the write: {reason}")]
    Rejected { reason: String },
    #[error("store write timed out")]
    Timeout,
    #[error("store connection lost")]
    Disconnected,
}

/// Receiver half of the change feed
pub type ChangeReceiver = mpsc::UnboundedReceiver<ChangeEvent>;

/// Async write API of the persistence collaborator.
///
/// Every successful write returns the store-assigned version and is echoed
/// on the change feed of every subscriber, including the writer.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_assignment(&self, assignment: &Assignment) -> Result<Version, StoreError>;

    async fn update_assignment(&self, assignment: &Assignment) -> Result<Version, StoreError>;

    async fn delete_assignment(&self, id: &AssignmentId) -> Result<Version, StoreError>;

    async fn put_resource(&self, resource: &Resource) -> Result<Version, StoreError>;

    async fn put_job(&self, job: &Job) -> Result<Version, StoreError>;

    /// Subscribe to the change feed. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> ChangeReceiver;
}
