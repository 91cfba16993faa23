// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs and the rows resources are dropped into

use crate::id::JobId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Work shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Day,
    Night,
}

/// The closed set of job types rule sets are keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Paving,
    Milling,
    Drainage,
    General,
}

/// The closed set of named row slots a job exposes.
///
/// Row names are not free-form strings: an unknown row in a rule file is a
/// configuration error, and a row with no drop rule rejects every drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Equipment,
    Crew,
    Trucks,
    Foreman,
    Sweeper,
    Tack,
    Mpt,
}

impl std::fmt::Display for RowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RowKind::Equipment => "equipment",
            RowKind::Crew => "crew",
            RowKind::Trucks => "trucks",
            RowKind::Foreman => "foreman",
            RowKind::Sweeper => "sweeper",
            RowKind::Tack => "tack",
            RowKind::Mpt => "mpt",
        };
        write!(f, "{}", name)
    }
}

/// A scheduled job on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub job_type: JobType,
    pub shift: Shift,
    pub schedule_date: NaiveDate,
    /// Set once every finalization-required attachment is in place
    #[serde(default)]
    pub finalized: bool,
}

impl Job {
    pub fn new(
        id: impl Into<JobId>,
        name: impl Into<String>,
        job_type: JobType,
        shift: Shift,
        schedule_date: NaiveDate,
    ) -> Self {
        Job {
            id: id.into(),
            name: name.into(),
            job_type,
            shift,
            schedule_date,
            finalized: false,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
