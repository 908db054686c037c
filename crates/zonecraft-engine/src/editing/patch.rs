use serde::{Deserialize, Serialize};

use crate::constraints::BlockConstraint;
use crate::models::{Attributes, Block, Zone, ZoneType, renumber_tree};

/// Partial update for a zone; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZonePatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub zone_type: Option<ZoneType>,
    pub description: Option<String>,
    pub editable: Option<bool>,
    pub blocks: Option<Vec<Block>>,
    pub constraints: Option<BlockConstraint>,
}

impl ZonePatch {
    /// Shallow merge into `zone`. Replacement blocks are renumbered at every level.
    pub fn apply_to(self, zone: &mut Zone) {
        if let Some(name) = self.name {
            zone.name = name;
        }
        if let Some(zone_type) = self.zone_type {
            zone.zone_type = zone_type;
        }
        if let Some(description) = self.description {
            zone.description = Some(description);
        }
        if let Some(editable) = self.editable {
            zone.editable = editable;
        }
        if let Some(mut blocks) = self.blocks {
            renumber_tree(&mut blocks);
            zone.blocks = blocks;
        }
        if let Some(constraints) = self.constraints {
            zone.constraints = Some(constraints);
        }
    }
}

/// Partial update for a block. Id and order are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockPatch {
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    /// Replaces the attribute map wholesale
    pub attributes: Option<Attributes>,
    pub content: Option<String>,
    pub inner_blocks: Option<Vec<Block>>,
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn apply_to(self, block: &mut Block) {
        if let Some(block_type) = self.block_type {
            block.block_type = block_type;
        }
        if let Some(attributes) = self.attributes {
            block.attributes = attributes;
        }
        if let Some(content) = self.content {
            block.content = Some(content);
        }
        if let Some(mut inner_blocks) = self.inner_blocks {
            renumber_tree(&mut inner_blocks);
            block.inner_blocks = Some(inner_blocks);
        }
    }
}
