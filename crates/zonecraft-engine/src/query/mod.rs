//! Cheap constraint predicates for gating an edit before it happens.
//!
//! [`ConstraintQuery`] answers "may this block go here" and "is this zone
//! full" without running a full [`validate`](crate::validation::validate)
//! pass. It resolves constraints through the same
//! [`resolve_effective_constraints`] the validator uses and never allocates.
//!
//! Three differences from the validator:
//!
//! - [`ConstraintQuery::check_block_instance_limit`] asks whether there is
//!   room for one more instance (`count < max`), while the validator only
//!   fails once the limit is exceeded (`count > max`). A page sitting exactly
//!   at the limit passes validation but refuses another insert.
//! - [`ConstraintQuery::can_add_more_blocks`] is purely about capacity and
//!   ignores global zone whitelists; type membership is
//!   [`ConstraintQuery::is_block_allowed`]'s job.
//! - [`ConstraintQuery::is_block_allowed`] only consults a global zone
//!   whitelist when the zone lists its allowed types. A zone that admits
//!   every type says yes even where the validator would then report the
//!   block as outside its whitelist.

use crate::constraints::{BlockConstraint, ZoneConfig, resolve_effective_constraints};
use crate::models::ZoneBasedContent;

/// How full a zone is, for capacity indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneCapacity {
    pub current: usize,
    /// `None` when the zone is unlimited
    pub max: Option<usize>,
}

impl ZoneCapacity {
    pub fn is_full(&self) -> bool {
        self.max.is_some_and(|max| self.current >= max)
    }

    /// Slots left before the zone is full, `None` when unlimited
    pub fn remaining(&self) -> Option<usize> {
        self.max.map(|max| max.saturating_sub(self.current))
    }
}

/// Read-only view over a session's config and, optionally, its live content
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintQuery<'a> {
    config: Option<&'a ZoneConfig>,
    content: Option<&'a ZoneBasedContent>,
}

impl<'a> ConstraintQuery<'a> {
    pub fn new(config: &'a ZoneConfig) -> Self {
        Self {
            config: Some(config),
            content: None,
        }
    }

    /// A query with no configuration: every predicate is permissive
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Bind live content so zone overrides and current counts are used
    pub fn with_content(mut self, content: &'a ZoneBasedContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Effective constraints for a zone, `None` when nothing applies
    pub fn get_block_constraints(&self, zone_id: &str) -> Option<&'a BlockConstraint> {
        let config = self.config?;
        let zone = self.content.and_then(|content| content.zone(zone_id));
        resolve_effective_constraints(zone, config, zone_id)
    }

    /// Whether a block of `block_type` is welcome in `zone_id`.
    ///
    /// A zone without constraints, or with an empty type list, admits every
    /// type. Otherwise the type must be listed and any global whitelist for
    /// it must include the zone.
    pub fn is_block_allowed(&self, zone_id: &str, block_type: &str) -> bool {
        let Some(config) = self.config else {
            return true;
        };
        let Some(constraints) = self.get_block_constraints(zone_id) else {
            return true;
        };
        if constraints.allowed_blocks.is_empty() {
            return true;
        }

        constraints.allowed_blocks.contains(block_type)
            && config
                .rule(block_type)
                .is_none_or(|rule| rule.permits_zone(zone_id))
    }

    /// Whether the zone has room for another block.
    ///
    /// Uses `current_count` when given, otherwise the bound content's live
    /// count (0 when no content is bound or the zone is absent).
    pub fn can_add_more_blocks(&self, zone_id: &str, current_count: Option<usize>) -> bool {
        let Some(max) = self.get_max_blocks(zone_id) else {
            return true;
        };
        current_count.unwrap_or_else(|| self.live_count(zone_id)) < max
    }

    pub fn get_max_blocks(&self, zone_id: &str) -> Option<usize> {
        self.get_block_constraints(zone_id)?.max_blocks
    }

    pub fn get_min_blocks(&self, zone_id: &str) -> usize {
        self.get_block_constraints(zone_id)
            .map_or(0, |constraints| constraints.min_blocks)
    }

    pub fn is_zone_required(&self, zone_id: &str) -> bool {
        self.get_block_constraints(zone_id)
            .is_some_and(|constraints| constraints.required)
    }

    /// Explicitly listed block types; empty means every type is allowed
    pub fn get_allowed_block_types(&self, zone_id: &str) -> impl Iterator<Item = &'a str> {
        self.get_block_constraints(zone_id)
            .into_iter()
            .flat_map(|constraints| constraints.allowed_blocks.iter().map(String::as_str))
    }

    /// Whether `content` has room for one more `block_type` under its global
    /// instance limit
    pub fn check_block_instance_limit(&self, block_type: &str, content: &ZoneBasedContent) -> bool {
        let Some(max) = self
            .config
            .and_then(|config| config.rule(block_type))
            .and_then(|rule| rule.max_instances)
        else {
            return true;
        };
        content.count_block_type(block_type) < max
    }

    pub fn capacity(&self, zone_id: &str) -> ZoneCapacity {
        ZoneCapacity {
            current: self.live_count(zone_id),
            max: self.get_max_blocks(zone_id),
        }
    }

    fn live_count(&self, zone_id: &str) -> usize {
        self.content
            .map_or(0, |content| content.block_count(zone_id))
    }
}
