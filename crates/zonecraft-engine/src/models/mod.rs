pub mod block;
pub mod content;
pub mod traversal;
pub mod zone;

pub use block::{Attributes, Block, new_block_id};
pub use content::ZoneBasedContent;
pub use traversal::{
    Descendants, count_blocks_of_type, find_block_mut, max_depth, renumber, renumber_tree,
    walk_blocks,
};
pub use zone::{Zone, ZoneType};
