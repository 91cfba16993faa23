//! mb-store: Persistence boundary for the Magnet Board
//!
//! The concrete transport is out of scope; this crate defines the abstract
//! contract the board writes through: an async store assigning monotonic
//! versions, and a change feed echoing every committed write to all
//! subscribers.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod event;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use event::{ChangeEvent, ChangeKind, Record, RecordKey, Table, Version};
pub use store::{ChangeReceiver, Store, StoreError};

#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryStore, StoreCall};
