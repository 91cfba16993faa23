//! mb-core: Core library for the Magnet Board scheduling system
//!
//! This crate provides:
//! - A typed domain model for resources, jobs, and row assignments
//! - The assignment lifecycle state machine
//! - The drop/interaction rule schema and atomic rule store
//! - Pure validation over board snapshots
//! - Cross-assignment conflict detection

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod id;

pub mod resource;
pub mod job;
pub mod assignment;
pub mod magnet;

pub mod rules;
pub mod config;

pub mod snapshot;
pub mod validate;
pub mod conflict;

// Re-exports
pub use id::{AssignmentId, IdGen, JobId, ResourceId, SequentialIdGen, UuidIdGen};
pub use resource::{ClassType, Resource, ResourceType};
pub use job::{Job, JobType, RowKind, Shift};
pub use assignment::{Assignment, AssignmentPhase, PhaseEvent, TimeSlot};
pub use magnet::{Magnet, MagnetStatus};
pub use rules::{DropRule, InteractionRule, RuleError, RuleSet, RuleStore};
pub use snapshot::BoardSnapshot;
pub use validate::{Decision, FinalizeViolation, RejectReason};
