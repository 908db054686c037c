// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use zonecraft_engine::constraints::{BlockConstraint, BlockTypeRule, ZoneConfig};
use zonecraft_engine::models::{Block, Zone, ZoneBasedContent};

const ZONES: [&str; 5] = ["header", "hero", "main", "sidebar", "footer"];

#[allow(dead_code)]
pub fn generate_page(blocks_per_zone: usize, depth: usize) -> ZoneBasedContent {
    let mut content = ZoneBasedContent::new("bench");
    for zone_id in ZONES {
        let blocks = (0..blocks_per_zone)
            .map(|i| nested_block(&format!("{zone_id}-{i}"), depth))
            .collect();
        content.insert_zone(Zone::from_id(zone_id).with_blocks(blocks));
    }
    content
}

#[allow(dead_code)]
fn nested_block(id: &str, depth: usize) -> Block {
    let mut block = Block::new(format!("{id}-leaf"), "core/paragraph").with_content("Lorem ipsum");
    for level in 0..depth {
        block = Block::new(format!("{id}-{level}"), "core/group").with_inner_blocks(vec![block]);
    }
    block
}

#[allow(dead_code)]
pub fn generate_config() -> ZoneConfig {
    let mut config = ZoneConfig::default();
    for zone_id in ZONES {
        config = config.with_zone_constraints(
            zone_id,
            BlockConstraint {
                max_blocks: Some(200),
                max_nesting_level: 8,
                ..BlockConstraint::allowing(["core/paragraph", "core/group", "core/image"])
            },
        );
    }
    config
        .with_rule("core/image", BlockTypeRule::max_instances(10))
        .with_rule("core/group", BlockTypeRule::only_in(ZONES))
}
