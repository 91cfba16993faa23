// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for board operations

use mb_core::{AssignmentId, JobId, RejectReason, ResourceId};
use mb_store::{RecordKey, StoreError};
use thiserror::Error;

/// One failed persist, reported after its rollback completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistFailure {
    pub key: RecordKey,
    pub error: StoreError,
}

/// Errors surfaced by board operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    /// Validation rejected the operation; board state is untouched
    #[error("rejected: {0}")]
    Rejected(RejectReason),
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),
    #[error("job not found: {0}")]
    JobNotFound(JobId),
    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),
    /// One or more writes failed; each was rolled back individually
    #[error("{} write(s) failed and were rolled back", failures.len())]
    Persistence { failures: Vec<PersistFailure> },
}

impl BoardError {
    /// The validation rejection, if that is what this error is
    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            BoardError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}
