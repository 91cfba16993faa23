// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative rule-set configuration
//!
//! The only externally configurable behavior of the core: per job type, the
//! allowed resource types and max count of each row; per resource-type pair,
//! the attachment limit and flags. Parsed from TOML:
//!
//! ```toml
//! [job.paving.equipment]
//! allowed = ["paver", "excavator", "roller"]
//! max = 6
//!
//! [attach.operator.excavator]
//! max = 1
//! required = true
//! safety = true
//! ```
//!
//! Row names, job types, and resource types are closed enums, so a typo in
//! the file fails here instead of silently matching nothing at validation.

use crate::job::{JobType, RowKind};
use crate::resource::ResourceType;
use crate::rules::{DropRule, InteractionRule, RuleError, RuleSet};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    job: BTreeMap<JobType, BTreeMap<RowKind, DropRuleConfig>>,
    #[serde(default)]
    attach: BTreeMap<ResourceType, BTreeMap<ResourceType, AttachRuleConfig>>,
}

#[derive(Debug, Deserialize)]
struct DropRuleConfig {
    allowed: Vec<ResourceType>,
    max: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AttachRuleConfig {
    max: u32,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    safety: bool,
}

/// Parse a rule set from TOML content
pub fn parse_rules(content: &str) -> Result<RuleSet, RuleError> {
    let file: RuleFile = toml::from_str(content)?;

    let mut builder = RuleSet::builder();
    for (job_type, rows) in file.job {
        for (row, cfg) in rows {
            let mut rule = DropRule::new(cfg.allowed);
            if let Some(max) = cfg.max {
                rule = rule.with_max(max);
            }
            builder = builder.drop_rule(job_type, row, rule);
        }
    }
    for (source, targets) in file.attach {
        for (target, cfg) in targets {
            let mut rule = InteractionRule::new(cfg.max);
            if cfg.required {
                rule = rule.required();
            }
            if cfg.safety {
                rule = rule.safety();
            }
            builder = builder.interaction_rule(source, target, rule);
        }
    }
    builder.build()
}

/// Load a rule set from a TOML file
pub fn load_rules(path: &Path) -> Result<RuleSet, RuleError> {
    let content = std::fs::read_to_string(path)?;
    parse_rules(&content)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
