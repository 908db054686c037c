use crate::constraints::{BlockConstraint, BlockTypeRule, ZoneConfig, resolve_effective_constraints};
use crate::models::{Zone, ZoneBasedContent};

use super::{
    GLOBAL_ZONE_ID, IssueKind, ValidationOptions, ValidationResult, ZoneValidationError,
    ZoneValidationWarning,
};

/// Validate `content` against `config` with default options
pub fn validate(content: &ZoneBasedContent, config: &ZoneConfig) -> ValidationResult {
    validate_with(content, config, &ValidationOptions::default())
}

/// Validate every zone (in id order), then every global rule (in block-type order).
///
/// Zones with no resolvable constraints are skipped, as are config zones
/// missing from the content.
pub fn validate_with(
    content: &ZoneBasedContent,
    config: &ZoneConfig,
    options: &ValidationOptions,
) -> ValidationResult {
    let mut issues = Issues::default();

    for (zone_id, zone) in &content.zones {
        let Some(constraints) = resolve_effective_constraints(Some(zone), config, zone_id) else {
            continue;
        };
        check_zone(zone_id, zone, constraints, options, &mut issues);
    }

    for (block_type, rule) in &config.block_constraint_rules {
        check_global_rule(content, block_type, rule, &mut issues);
    }

    ValidationResult::new(issues.errors, issues.warnings)
}

#[derive(Default)]
struct Issues {
    errors: Vec<ZoneValidationError>,
    warnings: Vec<ZoneValidationWarning>,
}

impl Issues {
    fn error(&mut self, zone_id: &str, block_id: Option<&str>, kind: IssueKind, message: String) {
        self.errors.push(ZoneValidationError {
            zone_id: zone_id.to_string(),
            block_id: block_id.map(str::to_string),
            kind,
            message,
        });
    }

    fn warning(&mut self, zone_id: &str, kind: IssueKind, message: String) {
        self.warnings.push(ZoneValidationWarning {
            zone_id: zone_id.to_string(),
            block_id: None,
            kind,
            message,
        });
    }
}

fn check_zone(
    zone_id: &str,
    zone: &Zone,
    constraints: &BlockConstraint,
    options: &ValidationOptions,
    issues: &mut Issues,
) {
    let count = zone.blocks.len();

    if constraints.required && count == 0 {
        issues.error(
            zone_id,
            None,
            IssueKind::Constraint,
            format!("Zone {zone_id} is required but has no blocks"),
        );
    }

    if constraints.min_blocks > 0 && count < constraints.min_blocks {
        issues.error(
            zone_id,
            None,
            IssueKind::Constraint,
            format!(
                "Zone {zone_id} has {count} blocks but requires at least {}",
                constraints.min_blocks
            ),
        );
    }

    if let Some(max) = constraints.max_blocks
        && count > max
    {
        issues.error(
            zone_id,
            None,
            IssueKind::Constraint,
            format!("Zone {zone_id} has {count} blocks but allows at most {max}"),
        );
    }

    if !constraints.allowed_blocks.is_empty() {
        for block in zone
            .blocks
            .iter()
            .filter(|block| !constraints.allowed_blocks.contains(&block.block_type))
        {
            issues.error(
                zone_id,
                Some(&block.id),
                IssueKind::Constraint,
                format!(
                    "Block type {} is not allowed in zone {zone_id}",
                    block.block_type
                ),
            );
        }
    }

    if !constraints.allow_nesting {
        for block in zone.blocks.iter().filter(|block| block.has_children()) {
            issues.error(
                zone_id,
                Some(&block.id),
                IssueKind::Structure,
                format!(
                    "Block {} has nested blocks but zone {zone_id} does not allow nesting",
                    block.id
                ),
            );
        }
    } else if constraints.max_nesting_level > 0 {
        let limit = constraints.max_nesting_level;
        for block in &zone.blocks {
            let depth = block.depth();
            if depth > limit {
                issues.error(
                    zone_id,
                    Some(&block.id),
                    IssueKind::Structure,
                    format!(
                        "Block {} nests {depth} levels deep but zone {zone_id} allows at most {limit}",
                        block.id
                    ),
                );
            }
        }
    }

    if constraints.singleton && count > 1 {
        issues.warning(
            zone_id,
            IssueKind::BestPractice,
            format!("Zone {zone_id} is meant to hold a single block but has {count}"),
        );
    }

    if count > options.large_zone_threshold {
        issues.warning(
            zone_id,
            IssueKind::Performance,
            format!(
                "Zone {zone_id} has {count} blocks which may slow down editing (more than {})",
                options.large_zone_threshold
            ),
        );
    }
}

fn check_global_rule(
    content: &ZoneBasedContent,
    block_type: &str,
    rule: &BlockTypeRule,
    issues: &mut Issues,
) {
    if let Some(max) = rule.max_instances {
        let count = content.count_block_type(block_type);
        if count > max {
            issues.error(
                GLOBAL_ZONE_ID,
                None,
                IssueKind::Constraint,
                format!("Block type {block_type} appears {count} times but is limited to {max}"),
            );
        }
    }

    if rule.allowed_zones.is_some() {
        for (zone_id, zone) in &content.zones {
            if !rule.permits_zone(zone_id) && zone.contains_block_type(block_type) {
                issues.error(
                    zone_id,
                    None,
                    IssueKind::Constraint,
                    format!("Block type {block_type} is not permitted in zone {zone_id}"),
                );
            }
        }
    }
}
