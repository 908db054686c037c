use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::traversal::{Descendants, max_depth, renumber_tree};

/// Free-form block attributes. Ordered so equality and serialization are stable.
pub type Attributes = BTreeMap<String, Value>;

/// A typed unit of content inside a zone, optionally holding nested blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Zero-based position within the parent sequence
    #[serde(default)]
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_blocks: Option<Vec<Block>>,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            attributes: Attributes::new(),
            content: None,
            order: 0,
            inner_blocks: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attach children, renumbering them (and their descendants) 0..n-1
    pub fn with_inner_blocks(mut self, mut children: Vec<Block>) -> Self {
        renumber_tree(&mut children);
        self.inner_blocks = Some(children);
        self
    }

    /// Direct children, empty when the block has none
    pub fn children(&self) -> &[Block] {
        self.inner_blocks.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Nesting depth below this block: 0 when childless, otherwise
    /// 1 + the deepest child's depth.
    pub fn depth(&self) -> usize {
        max_depth(self)
    }

    /// This block and every nested block, depth-first in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::from_block(self)
    }

    /// Deep copy where this block and every nested block get a fresh id
    pub fn duplicate_with_fresh_ids(&self) -> Block {
        let mut copy = self.clone();
        let mut stack = vec![&mut copy];
        while let Some(block) = stack.pop() {
            let Block {
                id, inner_blocks, ..
            } = block;
            *id = new_block_id();
            if let Some(children) = inner_blocks {
                stack.extend(children.iter_mut());
            }
        }
        copy
    }
}

/// Generate a unique block id
pub fn new_block_id() -> String {
    Uuid::new_v4().to_string()
}
