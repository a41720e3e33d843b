pub mod dungeon;

pub use dungeon::{
    ConfigError, DungeonBuilder, DungeonConfig, NodeId, PartitionNode, PartitionTree, Rect,
    SplitAxis, generate,
};
