// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drop rules, interaction rules, and the atomic rule store
//!
//! Drop rules state which resource types may occupy which row of which job
//! type. Interaction rules state which resource type may attach to which,
//! with a per-pair maximum and optional finalization/safety flags. Rule sets
//! are immutable snapshots; replacing one is atomic.

use crate::job::{JobType, RowKind};
use crate::resource::ResourceType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors raised while building or loading a rule set
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("duplicate drop rule for {job_type:?}/{row}")]
    DuplicateDropRule { job_type: JobType, row: RowKind },
    #[error("duplicate interaction rule for {source_type} -> {target}")]
    DuplicateInteractionRule {
        source_type: ResourceType,
        target: ResourceType,
    },
    #[error("drop rule for {job_type:?}/{row} allows no resource types")]
    EmptyAllowedSet { job_type: JobType, row: RowKind },
    #[error("interaction rule for {source_type} -> {target} has max_count 0")]
    ZeroMaxCount {
        source_type: ResourceType,
        target: ResourceType,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which resource types may occupy a row, and how many
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRule {
    pub allowed: BTreeSet<ResourceType>,
    /// Maximum occupants of the row; `None` is unbounded
    pub max_count: Option<u32>,
}

impl DropRule {
    pub fn new(allowed: impl IntoIterator<Item = ResourceType>) -> Self {
        DropRule {
            allowed: allowed.into_iter().collect(),
            max_count: None,
        }
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max_count = Some(max);
        self
    }

    pub fn allows(&self, rt: ResourceType) -> bool {
        self.allowed.contains(&rt)
    }
}

/// How many sources of a type may attach to a target, and whether the
/// attachment gates finalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub max_count: u32,
    /// A target without this attachment blocks job finalization
    #[serde(default)]
    pub required_for_finalization: bool,
    /// Attachment is a safety pairing subject to operator authorization
    #[serde(default)]
    pub safety: bool,
}

impl InteractionRule {
    pub fn new(max_count: u32) -> Self {
        InteractionRule {
            max_count,
            required_for_finalization: false,
            safety: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required_for_finalization = true;
        self
    }

    pub fn safety(mut self) -> Self {
        self.safety = true;
        self
    }
}

/// An immutable snapshot of the full rule configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    drop_rules: BTreeMap<(JobType, RowKind), DropRule>,
    interaction_rules: BTreeMap<(ResourceType, ResourceType), InteractionRule>,
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Drop rule for a row of a job type, if one is configured
    pub fn drop_rule(&self, job_type: JobType, row: RowKind) -> Option<&DropRule> {
        self.drop_rules.get(&(job_type, row))
    }

    /// Interaction rule for source attaching onto target, if one is configured
    pub fn interaction_rule(
        &self,
        source: ResourceType,
        target: ResourceType,
    ) -> Option<&InteractionRule> {
        self.interaction_rules.get(&(source, target))
    }

    /// All rules whose target is the given type and which gate finalization
    pub fn required_attachments_for(
        &self,
        target: ResourceType,
    ) -> impl Iterator<Item = (ResourceType, &InteractionRule)> {
        self.interaction_rules
            .iter()
            .filter(move |((_, t), rule)| *t == target && rule.required_for_finalization)
            .map(|((s, _), rule)| (*s, rule))
    }

    /// All configured interaction rules
    pub fn interaction_rules(
        &self,
    ) -> impl Iterator<Item = (&(ResourceType, ResourceType), &InteractionRule)> {
        self.interaction_rules.iter()
    }
}

/// Builder validating the rule set as it is assembled
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    set: RuleSet,
    errors: Vec<RuleError>,
}

impl RuleSetBuilder {
    pub fn drop_rule(mut self, job_type: JobType, row: RowKind, rule: DropRule) -> Self {
        if rule.allowed.is_empty() {
            self.errors.push(RuleError::EmptyAllowedSet { job_type, row });
        } else if self.set.drop_rules.insert((job_type, row), rule).is_some() {
            self.errors
                .push(RuleError::DuplicateDropRule { job_type, row });
        }
        self
    }

    pub fn interaction_rule(
        mut self,
        source: ResourceType,
        target: ResourceType,
        rule: InteractionRule,
    ) -> Self {
        if rule.max_count == 0 {
            self.errors.push(RuleError::ZeroMaxCount {
                source_type: source,
                target,
            });
        } else if self
            .set
            .interaction_rules
            .insert((source, target), rule)
            .is_some()
        {
            self.errors.push(RuleError::DuplicateInteractionRule {
                source_type: source,
                target,
            });
        }
        self
    }

    /// Finish the set, failing fast on the first recorded error
    pub fn build(mut self) -> Result<RuleSet, RuleError> {
        match self.errors.is_empty() {
            true => Ok(self.set),
            false => Err(self.errors.remove(0)),
        }
    }
}

/// Shared handle to the active rule set.
///
/// Readers clone the inner `Arc`, so a concurrent `load` can never expose a
/// half-updated set.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    active: Arc<RwLock<Arc<RuleSet>>>,
}

impl RuleStore {
    pub fn new(set: RuleSet) -> Self {
        RuleStore {
            active: Arc::new(RwLock::new(Arc::new(set))),
        }
    }

    /// Atomically replace the active rule set
    pub fn load(&self, set: RuleSet) {
        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        *active = Arc::new(set);
    }

    /// Snapshot of the active rule set
    pub fn snapshot(&self) -> Arc<RuleSet> {
        Arc::clone(&self.active.read().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn drop_rule(&self, job_type: JobType, row: RowKind) -> Option<DropRule> {
        self.snapshot().drop_rule(job_type, row).cloned()
    }

    pub fn interaction_rule(
        &self,
        source: ResourceType,
        target: ResourceType,
    ) -> Option<InteractionRule> {
        self.snapshot().interaction_rule(source, target).copied()
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
