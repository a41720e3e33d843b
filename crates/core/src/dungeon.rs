//! BSP dungeon layout generation domain split into coherent submodules.

pub mod config;
pub mod geometry;
pub mod tree;

mod builder;
mod sampler;

pub use builder::DungeonBuilder;
pub use config::{ConfigError, DungeonConfig};
pub use geometry::{Rect, SplitAxis};
pub use tree::{NodeId, PartitionNode, PartitionTree};

pub fn generate(config: DungeonConfig, seed: u64) -> PartitionTree {
    DungeonBuilder::new(config).generate(seed)
}
