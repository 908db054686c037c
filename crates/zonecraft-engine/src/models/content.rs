use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::traversal::{count_blocks_of_type, renumber_tree, walk_blocks};
use super::{Block, Zone};
use crate::constraints::ZoneConfig;

/// A page's full content: every zone keyed by its id, plus the layout tag.
///
/// Zones live in a `BTreeMap`, so ids are unique, iteration is in key order
/// and two values compare equal regardless of insertion history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBasedContent {
    #[serde(default)]
    pub zones: BTreeMap<String, Zone>,
    #[serde(default)]
    pub layout: String,
}

impl ZoneBasedContent {
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            zones: BTreeMap::new(),
            layout: layout.into(),
        }
    }

    /// Insert a zone under its own id, replacing any zone already there
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.insert_zone(zone);
        self
    }

    pub fn insert_zone(&mut self, zone: Zone) -> Option<Zone> {
        self.zones.insert(zone.id.clone(), zone)
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.get(zone_id)
    }

    pub fn zone_mut(&mut self, zone_id: &str) -> Option<&mut Zone> {
        self.zones.get_mut(zone_id)
    }

    /// Top-level block count of a zone, 0 when the zone is absent
    pub fn block_count(&self, zone_id: &str) -> usize {
        self.zone(zone_id).map_or(0, Zone::block_count)
    }

    /// Every block in every zone, nested ones included, zones in key order
    pub fn all_blocks(&self) -> impl Iterator<Item = &Block> {
        self.zones
            .values()
            .flat_map(|zone| walk_blocks(&zone.blocks))
    }

    /// Instances of `block_type` across the whole page, nested ones included
    pub fn count_block_type(&self, block_type: &str) -> usize {
        self.zones
            .values()
            .map(|zone| count_blocks_of_type(&zone.blocks, block_type))
            .sum()
    }

    /// Build fresh content from a layout template: one zone per id the layout
    /// lists, seeded with that zone's default blocks.
    ///
    /// Returns `None` when the layout is not defined in `config`.
    pub fn from_layout(config: &ZoneConfig, layout_id: &str) -> Option<Self> {
        let layout = config.layouts.get(layout_id)?;
        let mut content = Self::new(layout_id);

        for zone_id in &layout.zones {
            let mut zone = Zone::from_id(zone_id.as_str());
            if let Some(definition) = config.zones.get(zone_id) {
                if let Some(name) = &definition.name {
                    zone.name = name.clone();
                }
                zone.description = definition.description.clone();
                zone.blocks = definition.default_blocks.clone();
                renumber_tree(&mut zone.blocks);
            }
            content.insert_zone(zone);
        }

        Some(content)
    }
}
