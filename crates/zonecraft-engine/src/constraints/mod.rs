//! Declarative constraint configuration.
//!
//! A [`ZoneConfig`] is supplied by the layout/theme system when an editing
//! session starts and stays immutable for that session. It carries two rule
//! dimensions:
//!
//! - per-zone [`BlockConstraint`]s (cardinality, allowed types, nesting)
//! - global [`BlockTypeRule`]s keyed by block type (instance totals and zone
//!   whitelists), independent of any single zone
//!
//! [`resolve_effective_constraints`] is the one place that decides which
//! per-zone constraints apply; both the validator and the query service go
//! through it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Block, Zone};

/// Composition rules for the blocks of one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockConstraint {
    pub required: bool,
    pub min_blocks: usize,
    /// `None` means unlimited
    pub max_blocks: Option<usize>,
    /// Empty means every block type is allowed
    pub allowed_blocks: BTreeSet<String>,
    pub allow_nesting: bool,
    /// Only consulted when nesting is allowed; 0 disables the depth check
    pub max_nesting_level: usize,
    /// Advisory: the zone is expected to hold one block
    pub singleton: bool,
}

impl Default for BlockConstraint {
    fn default() -> Self {
        Self {
            required: false,
            min_blocks: 0,
            max_blocks: None,
            allowed_blocks: BTreeSet::new(),
            allow_nesting: true,
            max_nesting_level: 0,
            singleton: false,
        }
    }
}

impl BlockConstraint {
    /// Constraint that only admits the given block types
    pub fn allowing<I, S>(block_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_blocks: block_types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether the local type list admits `block_type`
    pub fn allows(&self, block_type: &str) -> bool {
        self.allowed_blocks.is_empty() || self.allowed_blocks.contains(block_type)
    }
}

/// Cross-zone rule for one block type
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instances: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_zones: Option<BTreeSet<String>>,
}

impl BlockTypeRule {
    pub fn max_instances(limit: usize) -> Self {
        Self {
            max_instances: Some(limit),
            allowed_zones: None,
        }
    }

    pub fn only_in<I, S>(zone_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            max_instances: None,
            allowed_zones: Some(zone_ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether the zone whitelist (if any) admits `zone_id`
    pub fn permits_zone(&self, zone_id: &str) -> bool {
        self.allowed_zones
            .as_ref()
            .is_none_or(|zones| zones.contains(zone_id))
    }
}

/// Theme-level description of a zone
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<BlockConstraint>,
    /// Blocks a fresh page starts with when built from a layout template
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_blocks: Vec<Block>,
}

/// A layout template: which zones a page of this layout has, in order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub zones: Vec<String>,
}

/// Constraint configuration for one editing session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    #[serde(default)]
    pub zones: BTreeMap<String, ZoneDefinition>,
    #[serde(default)]
    pub block_constraint_rules: BTreeMap<String, BlockTypeRule>,
    #[serde(default)]
    pub layouts: BTreeMap<String, LayoutDefinition>,
}

impl ZoneConfig {
    pub fn with_zone_constraints(
        mut self,
        zone_id: impl Into<String>,
        constraints: BlockConstraint,
    ) -> Self {
        self.zones.entry(zone_id.into()).or_default().constraints = Some(constraints);
        self
    }

    pub fn with_rule(mut self, block_type: impl Into<String>, rule: BlockTypeRule) -> Self {
        self.block_constraint_rules.insert(block_type.into(), rule);
        self
    }

    /// Constraints the config declares for a zone, ignoring any zone override
    pub fn zone_constraints(&self, zone_id: &str) -> Option<&BlockConstraint> {
        self.zones.get(zone_id)?.constraints.as_ref()
    }

    pub fn rule(&self, block_type: &str) -> Option<&BlockTypeRule> {
        self.block_constraint_rules.get(block_type)
    }
}

/// Constraints in force for `zone_id`: the zone's own override when it has
/// one, otherwise whatever the config declares for that id.
pub fn resolve_effective_constraints<'a>(
    zone: Option<&'a Zone>,
    config: &'a ZoneConfig,
    zone_id: &str,
) -> Option<&'a BlockConstraint> {
    zone.and_then(|zone| zone.constraints.as_ref())
        .or_else(|| config.zone_constraints(zone_id))
}
