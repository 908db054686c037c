use serde::{Deserialize, Serialize};

use super::Block;
use super::traversal::renumber_tree;
use crate::constraints::BlockConstraint;

/// Kind of page region a zone represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Header,
    Footer,
    Main,
    Sidebar,
    Hero,
    #[default]
    Custom,
}

impl ZoneType {
    /// Well-known zone ids map onto their type; anything else is custom
    pub fn from_zone_id(zone_id: &str) -> Self {
        match zone_id {
            "header" => ZoneType::Header,
            "footer" => ZoneType::Footer,
            "main" => ZoneType::Main,
            "sidebar" => ZoneType::Sidebar,
            "hero" => ZoneType::Hero,
            _ => ZoneType::Custom,
        }
    }
}

fn default_editable() -> bool {
    true
}

/// A named page region holding an ordered block tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub zone_type: ZoneType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_editable")]
    pub editable: bool,
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Zone-local override; wins over the session config's constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<BlockConstraint>,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, zone_type: ZoneType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            zone_type,
            description: None,
            editable: true,
            blocks: Vec::new(),
            constraints: None,
        }
    }

    /// Zone named after its id, with the type inferred from the id
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let zone_type = ZoneType::from_zone_id(&id);
        Self::new(id.clone(), id, zone_type)
    }

    pub fn with_blocks(mut self, mut blocks: Vec<Block>) -> Self {
        renumber_tree(&mut blocks);
        self.blocks = blocks;
        self
    }

    pub fn with_constraints(mut self, constraints: BlockConstraint) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Index of a top-level block
    pub fn position_of(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == block_id)
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == block_id)
    }

    pub fn contains_block_type(&self, block_type: &str) -> bool {
        self.blocks.iter().any(|block| block.block_type == block_type)
    }
}
