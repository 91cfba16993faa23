//! mb-board: Stateful orchestration layer for the Magnet Board
//!
//! This crate provides:
//! - The magnet registry mapping resources to live magnets
//! - The assignment service: assign, attach, detach, group move, finalize
//! - The optimistic write outbox drained at the store boundary
//! - The sync reconciler merging remote change events by version
//!
//! All validation and local mutation run synchronously to completion; the
//! only suspension point is `Board::sync`, which talks to the store.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod registry;
pub mod service;
pub mod reconcile;

pub use error::{BoardError, PersistFailure};
pub use registry::MagnetRegistry;
pub use reconcile::WriteOp;
pub use service::{AssignOptions, AssignOutcome, Board, SecondaryOutcome};
