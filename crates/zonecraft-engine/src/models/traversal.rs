//! Depth-first folds over block trees.
//!
//! Everything here walks with an explicit stack, so arbitrarily deep
//! `innerBlocks` nesting never grows the call stack.

use super::Block;

/// Pre-order iterator over a block sequence and all of its nested blocks
pub struct Descendants<'a> {
    stack: Vec<&'a Block>,
}

impl<'a> Descendants<'a> {
    pub fn from_block(block: &'a Block) -> Self {
        Self { stack: vec![block] }
    }

    pub fn from_blocks(blocks: &'a [Block]) -> Self {
        Self {
            stack: blocks.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.stack.pop()?;
        self.stack.extend(block.children().iter().rev());
        Some(block)
    }
}

/// Every block in `blocks`, including nested ones
pub fn walk_blocks(blocks: &[Block]) -> Descendants<'_> {
    Descendants::from_blocks(blocks)
}

/// Number of blocks of `block_type` anywhere in `blocks`, nested ones included
pub fn count_blocks_of_type(blocks: &[Block], block_type: &str) -> usize {
    walk_blocks(blocks)
        .filter(|block| block.block_type == block_type)
        .count()
}

/// Deepest nesting level below `root`, where root's children sit at level 1
pub fn max_depth(root: &Block) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(root, 0usize)];
    while let Some((block, level)) = stack.pop() {
        deepest = deepest.max(level);
        stack.extend(block.children().iter().map(|child| (child, level + 1)));
    }
    deepest
}

/// Rewrite `order` to the dense sequence 0..n-1 following slice position
pub fn renumber(blocks: &mut [Block]) {
    for (index, block) in blocks.iter_mut().enumerate() {
        block.order = index;
    }
}

/// [`renumber`] `blocks` and every nested sequence below them
pub fn renumber_tree(blocks: &mut [Block]) {
    renumber(blocks);
    let mut stack: Vec<&mut Block> = blocks.iter_mut().collect();
    while let Some(block) = stack.pop() {
        if let Some(children) = block.inner_blocks.as_mut() {
            renumber(children);
            stack.extend(children.iter_mut());
        }
    }
}

/// Find a block by id anywhere in `blocks`
pub fn find_block_mut<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    let mut stack: Vec<&'a mut Block> = blocks.iter_mut().rev().collect();
    while let Some(block) = stack.pop() {
        if block.id == id {
            return Some(block);
        }
        if let Some(children) = block.inner_blocks.as_mut() {
            stack.extend(children.iter_mut().rev());
        }
    }
    None
}
