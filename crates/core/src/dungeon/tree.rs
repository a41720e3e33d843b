//! Arena-backed binary partition tree: recursive splits and traversal queries.

use std::collections::VecDeque;

use rand_chacha::ChaCha8Rng;
use slotmap::{SlotMap, new_key_type};
use xxhash_rust::xxh3::xxh3_64;

use super::geometry::{Rect, SplitAxis};
use super::sampler;

new_key_type! {
    pub struct NodeId;
}

/// One node of the partition tree.
///
/// Child and parent links are arena keys; the parent key is lookup-only and
/// never owns. A node is a leaf iff both children are absent, and only leaves
/// carry a `room` while only split nodes carry a `tunnel`.
#[derive(Clone, Debug)]
pub struct PartitionNode {
    pub region: Rect,
    pub room: Option<Rect>,
    pub tunnel: Option<Rect>,
    pub split_axis: Option<SplitAxis>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
    pub depth: u32,
}

impl PartitionNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Binary tree of nested rectangular regions.
///
/// Mutable while a generation run fills in rooms and tunnels, read-only for
/// consumers afterwards. Nodes are never removed once inserted.
pub struct PartitionTree {
    nodes: SlotMap<NodeId, PartitionNode>,
    root: NodeId,
}

impl PartitionTree {
    /// Recursively partitions `region` to `iterations` depth.
    ///
    /// The split axis is Vertical when the region is wider than tall,
    /// Horizontal otherwise (ties go Horizontal). The first child takes
    /// `round(extent * ratio)` of the split axis and the second child takes
    /// the exact remainder, so the two always tile the parent.
    pub(super) fn build(
        region: Rect,
        iterations: u32,
        split_min_ratio: f32,
        split_max_ratio: f32,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = insert_node(&mut nodes, region, None, 0);
        let mut tree = Self { nodes, root };
        tree.split_node(root, iterations, split_min_ratio, split_max_ratio, rng);
        tree
    }

    fn split_node(
        &mut self,
        id: NodeId,
        iterations: u32,
        split_min_ratio: f32,
        split_max_ratio: f32,
        rng: &mut ChaCha8Rng,
    ) {
        if iterations == 0 {
            return;
        }

        let (region, depth) = {
            let node = &self.nodes[id];
            (node.region, node.depth)
        };

        let axis = if region.width > region.height {
            SplitAxis::Vertical
        } else {
            SplitAxis::Horizontal
        };
        let ratio = sampler::ratio_between(rng, split_min_ratio, split_max_ratio);

        let (first, second) = match axis {
            SplitAxis::Vertical => {
                let first_width = (region.width as f32 * ratio).round() as i32;
                (
                    Rect::new(region.x, region.y, first_width, region.height),
                    Rect::new(
                        region.x + first_width,
                        region.y,
                        region.width - first_width,
                        region.height,
                    ),
                )
            }
            SplitAxis::Horizontal => {
                let first_height = (region.height as f32 * ratio).round() as i32;
                (
                    Rect::new(region.x, region.y, region.width, first_height),
                    Rect::new(
                        region.x,
                        region.y + first_height,
                        region.width,
                        region.height - first_height,
                    ),
                )
            }
        };

        let left = insert_node(&mut self.nodes, first, Some(id), depth + 1);
        let right = insert_node(&mut self.nodes, second, Some(id), depth + 1);
        {
            let node = &mut self.nodes[id];
            node.split_axis = Some(axis);
            node.left = Some(left);
            node.right = Some(right);
        }

        self.split_node(left, iterations - 1, split_min_ratio, split_max_ratio, rng);
        self.split_node(right, iterations - 1, split_min_ratio, split_max_ratio, rng);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &PartitionNode {
        &self.nodes[id]
    }

    pub(super) fn node_mut(&mut self, id: NodeId) -> &mut PartitionNode {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in breadth-first order: root first, level by level,
    /// left child before right.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.nodes_under(self.root)
    }

    /// Breadth-first order over the subtree rooted at `start`.
    pub fn nodes_under(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            let node = &self.nodes[id];
            if let Some(left) = node.left {
                queue.push_back(left);
            }
            if let Some(right) = node.right {
                queue.push_back(right);
            }
        }
        order
    }

    /// Nodes with no children, in breadth-first order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.all_nodes().into_iter().filter(|&id| self.nodes[id].is_leaf()).collect()
    }

    /// Split nodes that have a parent. The root is excluded: it has no
    /// sibling, so it is never the target of a connection operation.
    pub fn internal_nodes(&self) -> Vec<NodeId> {
        self.all_nodes()
            .into_iter()
            .filter(|&id| {
                let node = &self.nodes[id];
                !node.is_leaf() && node.parent.is_some()
            })
            .collect()
    }

    /// Every assigned room in the subtree rooted at `start`, in
    /// breadth-first discovery order.
    pub fn rooms_under(&self, start: NodeId) -> Vec<Rect> {
        self.nodes_under(start).into_iter().filter_map(|id| self.nodes[id].room).collect()
    }

    /// Every assigned tunnel in the subtree rooted at `start`, in
    /// breadth-first discovery order.
    pub fn tunnels_under(&self, start: NodeId) -> Vec<Rect> {
        self.nodes_under(start).into_iter().filter_map(|id| self.nodes[id].tunnel).collect()
    }

    pub fn all_rooms(&self) -> Vec<Rect> {
        self.rooms_under(self.root)
    }

    pub fn all_tunnels(&self) -> Vec<Rect> {
        self.tunnels_under(self.root)
    }

    /// Stable byte encoding of the whole tree in breadth-first order,
    /// for equality checks and fingerprinting.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.nodes.len() as u32).to_le_bytes());
        for id in self.all_nodes() {
            let node = &self.nodes[id];
            push_rect(&mut bytes, node.region);
            push_optional_rect(&mut bytes, node.room);
            push_optional_rect(&mut bytes, node.tunnel);
            bytes.push(match node.split_axis {
                None => 0,
                Some(SplitAxis::Horizontal) => 1,
                Some(SplitAxis::Vertical) => 2,
            });
            bytes.extend(node.depth.to_le_bytes());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

fn insert_node(
    nodes: &mut SlotMap<NodeId, PartitionNode>,
    region: Rect,
    parent: Option<NodeId>,
    depth: u32,
) -> NodeId {
    nodes.insert(PartitionNode {
        region,
        room: None,
        tunnel: None,
        split_axis: None,
        left: None,
        right: None,
        parent,
        depth,
    })
}

fn push_rect(bytes: &mut Vec<u8>, rect: Rect) {
    bytes.extend(rect.x.to_le_bytes());
    bytes.extend(rect.y.to_le_bytes());
    bytes.extend(rect.width.to_le_bytes());
    bytes.extend(rect.height.to_le_bytes());
}

fn push_optional_rect(bytes: &mut Vec<u8>, rect: Option<Rect>) {
    match rect {
        None => bytes.push(0),
        Some(rect) => {
            bytes.push(1);
            push_rect(bytes, rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    fn build_tree(size: i32, iterations: u32, seed: u64) -> PartitionTree {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        PartitionTree::build(Rect::new(0, 0, size, size), iterations, 0.4, 0.6, &mut rng)
    }

    #[test]
    fn leaf_count_doubles_per_iteration() {
        for iterations in 0..=5 {
            let tree = build_tree(256, iterations, 11);
            assert_eq!(tree.leaves().len(), 1 << iterations);
            assert_eq!(tree.len(), (1 << (iterations + 1)) - 1);
        }
    }

    #[test]
    fn zero_iterations_builds_a_single_leaf() {
        let tree = build_tree(12, 0, 3);
        assert_eq!(tree.len(), 1);
        assert!(tree.node(tree.root()).is_leaf());
        assert!(tree.internal_nodes().is_empty());
        assert_eq!(tree.node(tree.root()).split_axis, None);
    }

    #[test]
    fn children_tile_their_parent_exactly() {
        let tree = build_tree(200, 4, 42);
        for id in tree.all_nodes() {
            let node = tree.node(id);
            let (Some(left), Some(right)) = (node.left, node.right) else {
                continue;
            };
            let first = tree.node(left).region;
            let second = tree.node(right).region;

            match node.split_axis {
                Some(SplitAxis::Vertical) => {
                    assert_eq!(first.x_max(), second.x_min());
                    assert_eq!(first.width + second.width, node.region.width);
                    assert_eq!(first.height, node.region.height);
                    assert_eq!(second.height, node.region.height);
                }
                Some(SplitAxis::Horizontal) => {
                    assert_eq!(first.y_max(), second.y_min());
                    assert_eq!(first.height + second.height, node.region.height);
                    assert_eq!(first.width, node.region.width);
                    assert_eq!(second.width, node.region.width);
                }
                None => panic!("split node without an axis"),
            }
            assert_eq!(first.area() + second.area(), node.region.area());
        }
    }

    #[test]
    fn split_axis_follows_the_long_edge_with_ties_horizontal() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let wide = PartitionTree::build(Rect::new(0, 0, 40, 10), 1, 0.4, 0.6, &mut rng);
        assert_eq!(wide.node(wide.root()).split_axis, Some(SplitAxis::Vertical));

        let tall = PartitionTree::build(Rect::new(0, 0, 10, 40), 1, 0.4, 0.6, &mut rng);
        assert_eq!(tall.node(tall.root()).split_axis, Some(SplitAxis::Horizontal));

        let square = PartitionTree::build(Rect::new(0, 0, 20, 20), 1, 0.4, 0.6, &mut rng);
        assert_eq!(square.node(square.root()).split_axis, Some(SplitAxis::Horizontal));
    }

    #[test]
    fn all_nodes_is_breadth_first_left_before_right() {
        let tree = build_tree(64, 2, 8);
        let order = tree.all_nodes();
        assert_eq!(order.len(), 7);

        let root = tree.node(tree.root());
        assert_eq!(order[0], tree.root());
        assert_eq!(Some(order[1]), root.left);
        assert_eq!(Some(order[2]), root.right);
        for (index, id) in order.iter().enumerate() {
            let expected_depth = usize::BITS - 1 - (index + 1).leading_zeros();
            assert_eq!(tree.node(*id).depth, expected_depth);
        }
    }

    #[test]
    fn internal_nodes_excludes_root_and_leaves() {
        let tree = build_tree(128, 3, 21);
        let internal = tree.internal_nodes();
        assert_eq!(internal.len(), 6);
        assert!(!internal.contains(&tree.root()));
        for id in internal {
            let node = tree.node(id);
            assert!(!node.is_leaf());
            assert!(node.parent.is_some());
        }
    }

    #[test]
    fn depth_increments_from_parent_to_child() {
        let tree = build_tree(100, 3, 2);
        for id in tree.all_nodes() {
            let node = tree.node(id);
            match node.parent {
                None => assert_eq!(node.depth, 0),
                Some(parent) => assert_eq!(node.depth, tree.node(parent).depth + 1),
            }
        }
    }

    #[test]
    fn subtree_queries_only_see_their_own_descendants() {
        let mut tree = build_tree(64, 2, 13);
        let leaves = tree.leaves();
        for (index, id) in leaves.iter().enumerate() {
            tree.node_mut(*id).room = Some(Rect::new(index as i32, 0, 1, 1));
        }

        let root = tree.node(tree.root());
        let (left, right) = (root.left.unwrap(), root.right.unwrap());
        let left_rooms = tree.rooms_under(left);
        let right_rooms = tree.rooms_under(right);
        assert_eq!(left_rooms.len() + right_rooms.len(), leaves.len());
        assert!(left_rooms.iter().all(|room| !right_rooms.contains(room)));
        assert_eq!(tree.all_rooms().len(), leaves.len());
    }

    #[test]
    fn canonical_bytes_are_stable_for_an_unchanged_tree() {
        let tree = build_tree(96, 3, 77);
        assert_eq!(tree.canonical_bytes(), tree.canonical_bytes());
        assert_eq!(tree.fingerprint(), tree.fingerprint());
    }
}
