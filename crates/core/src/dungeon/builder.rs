//! Generation orchestration: tree build, room placement, and the
//! sibling-connection corridor search.

use std::cmp::Reverse;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use super::config::DungeonConfig;
use super::geometry::{Rect, SplitAxis};
use super::sampler;
use super::tree::{NodeId, PartitionTree};

/// Builds a fully populated [`PartitionTree`] from a config and a seed.
///
/// Generation is one synchronous pass: split the region, drop a room into
/// every leaf, then connect sibling subtrees bottom-up. The returned tree is
/// meant to be treated as read-only.
pub struct DungeonBuilder {
    config: DungeonConfig,
}

impl DungeonBuilder {
    pub fn new(config: DungeonConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, seed: u64) -> PartitionTree {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let region = Rect::new(0, 0, self.config.total_size, self.config.total_size);
        let mut tree = PartitionTree::build(
            region,
            self.config.iterations,
            self.config.split_min_ratio,
            self.config.split_max_ratio,
            &mut rng,
        );
        self.place_rooms(&mut tree, &mut rng);
        self.connect_siblings(&mut tree, &mut rng);
        tree
    }

    /// Drops one randomized room into every leaf region.
    ///
    /// Width and height are sampled independently; the offset ranges are
    /// inclusive, so a room may sit flush against any leaf edge. Leaf regions
    /// are disjoint, which makes room overlap impossible by construction.
    fn place_rooms(&self, tree: &mut PartitionTree, rng: &mut ChaCha8Rng) {
        for id in tree.leaves() {
            let region = tree.node(id).region;

            let width_ratio =
                sampler::ratio_between(rng, self.config.room_min_ratio, self.config.room_max_ratio);
            let room_width = ((region.width as f32 * width_ratio).round() as i32).max(1);
            let height_ratio =
                sampler::ratio_between(rng, self.config.room_min_ratio, self.config.room_max_ratio);
            let room_height = ((region.height as f32 * height_ratio).round() as i32).max(1);

            let dx = sampler::int_between(rng, 0, region.width - room_width);
            let dy = sampler::int_between(rng, 0, region.height - room_height);

            tree.node_mut(id).room =
                Some(Rect::new(region.x + dx, region.y + dy, room_width, room_height));
        }
    }

    /// Connects the two children of every split node, deepest pairs first.
    ///
    /// The ordering matters: a node's candidate anchors include the tunnels
    /// already placed in its subtrees, so parents must run after their
    /// descendants or the dungeon loses connection opportunities.
    fn connect_siblings(&self, tree: &mut PartitionTree, rng: &mut ChaCha8Rng) {
        let mut split_nodes: Vec<NodeId> =
            tree.all_nodes().into_iter().filter(|&id| !tree.node(id).is_leaf()).collect();
        split_nodes.sort_by_key(|&id| Reverse(tree.node(id).depth));

        for id in split_nodes {
            if tree.node(id).tunnel.is_none() {
                self.connect_children(tree, id, rng);
            }
        }
    }

    /// Runs the corridor search for one split node and assigns its tunnel.
    ///
    /// If no candidate survives the collision filter the node is left
    /// unconnected; that is a silent generation gap, not an error.
    fn connect_children(&self, tree: &mut PartitionTree, id: NodeId, rng: &mut ChaCha8Rng) {
        let node = tree.node(id);
        let (Some(left), Some(right), Some(axis)) = (node.left, node.right, node.split_axis)
        else {
            return;
        };
        let direction = axis.perpendicular();

        let mut sources = tree.rooms_under(left);
        sources.extend(tree.tunnels_under(left));
        let starts = self.candidate_starts(&sources, direction);

        let mut targets = tree.rooms_under(right);
        targets.extend(tree.tunnels_under(right));
        let mut candidates = extend_into_targets(&starts, &targets, direction);

        let rooms = tree.all_rooms();
        let tunnels = tree.all_tunnels();
        candidates.retain(|candidate| {
            !rooms.iter().any(|room| room.overlaps(*candidate))
                && !tunnels.iter().any(|tunnel| tunnel.overlaps(*candidate))
        });

        for candidate in &mut candidates {
            self.trim_padding(candidate, direction);
        }

        if !candidates.is_empty() {
            let chosen = candidates[sampler::pick_index(rng, candidates.len())];
            tree.node_mut(id).tunnel = Some(chosen);
        }
    }

    /// Emits every zero-length candidate anchored on the outward-facing edge
    /// of a left-subtree room or tunnel, one per integer offset that keeps
    /// `padding` clearance on both sides of the eventual corridor.
    fn candidate_starts(&self, sources: &[Rect], direction: SplitAxis) -> Vec<Rect> {
        let thickness = self.config.tunnel_width + self.config.padding;
        let mut starts = Vec::new();
        for source in sources {
            match direction {
                SplitAxis::Vertical => {
                    let from = source.x_min() + self.config.padding;
                    let to = source.x_max() - self.config.padding - self.config.tunnel_width;
                    for pos in from..=to {
                        starts.push(Rect::new(pos, source.y_max(), thickness, 0));
                    }
                }
                SplitAxis::Horizontal => {
                    let from = source.y_min() + self.config.padding;
                    let to = source.y_max() - self.config.padding - self.config.tunnel_width;
                    for pos in from..=to {
                        starts.push(Rect::new(source.x_max(), pos, 0, thickness));
                    }
                }
            }
        }
        starts
    }

    /// Removes the `padding` share of a realized candidate's thickness so the
    /// final corridor keeps clearance from whatever it runs alongside.
    fn trim_padding(&self, candidate: &mut Rect, direction: SplitAxis) {
        match direction {
            SplitAxis::Vertical => {
                candidate.x += self.config.padding;
                candidate.width -= self.config.padding;
            }
            SplitAxis::Horizontal => {
                candidate.y += self.config.padding;
                candidate.height -= self.config.padding;
            }
        }
    }
}

/// Stretches each candidate start towards every right-subtree rectangle whose
/// facing boundary contains both of the candidate's edge points (half-open,
/// so the full corridor thickness must land inside the target).
fn extend_into_targets(starts: &[Rect], targets: &[Rect], direction: SplitAxis) -> Vec<Rect> {
    let mut candidates = Vec::new();
    for start in starts {
        for target in targets {
            let realized = match direction {
                SplitAxis::Vertical => {
                    if !target.contains(start.x, target.y_min())
                        || !target.contains(start.x + start.width, target.y_min())
                    {
                        continue;
                    }
                    Rect::new(start.x, start.y, start.width, target.y_min() - start.y)
                }
                SplitAxis::Horizontal => {
                    if !target.contains(target.x_min(), start.y)
                        || !target.contains(target.x_min(), start.y + start.height)
                    {
                        continue;
                    }
                    Rect::new(start.x, start.y, target.x_min() - start.x, start.height)
                }
            };
            candidates.push(realized);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::config::DungeonConfig;

    #[test]
    fn every_leaf_gets_a_room_inside_its_region() {
        let config = DungeonConfig { total_size: 64, iterations: 3, ..DungeonConfig::default() };
        for seed in 0..20 {
            let tree = DungeonBuilder::new(config).generate(seed);
            for id in tree.leaves() {
                let node = tree.node(id);
                let room = node.room.expect("every leaf must receive a room");
                assert!(room.width >= 1 && room.height >= 1);
                assert!(room.x_min() >= node.region.x_min());
                assert!(room.y_min() >= node.region.y_min());
                assert!(room.x_max() <= node.region.x_max());
                assert!(room.y_max() <= node.region.y_max());
            }
        }
    }

    #[test]
    fn rooms_only_on_leaves_and_tunnels_only_on_split_nodes() {
        let tree = DungeonBuilder::new(DungeonConfig {
            total_size: 64,
            iterations: 3,
            ..DungeonConfig::default()
        })
        .generate(5);

        for id in tree.all_nodes() {
            let node = tree.node(id);
            if node.is_leaf() {
                assert!(node.room.is_some());
                assert!(node.tunnel.is_none());
            } else {
                assert!(node.room.is_none());
            }
        }
    }

    #[test]
    fn sibling_tunnel_spans_the_gap_and_stays_inside_both_rooms() {
        let config = DungeonConfig::default();
        let mut connected = 0;
        for seed in 0..50 {
            let tree = DungeonBuilder::new(config).generate(seed);
            let root = tree.node(tree.root());
            // 12x12 square ties to a Horizontal split, so the corridor runs
            // vertically from the top room down to the bottom room.
            assert_eq!(root.split_axis, Some(SplitAxis::Horizontal));
            let Some(tunnel) = root.tunnel else {
                continue;
            };
            connected += 1;

            let top_room = tree.node(root.left.unwrap()).room.unwrap();
            let bottom_room = tree.node(root.right.unwrap()).room.unwrap();

            assert_eq!(tunnel.width, config.tunnel_width);
            assert_eq!(tunnel.y_min(), top_room.y_max());
            assert_eq!(tunnel.y_max(), bottom_room.y_min());
            assert!(tunnel.x_min() >= top_room.x_min() && tunnel.x_max() <= top_room.x_max());
            assert!(
                tunnel.x_min() >= bottom_room.x_min() && tunnel.x_max() <= bottom_room.x_max()
            );
        }
        assert!(connected > 0, "no seed out of 50 produced a root tunnel");
    }

    #[test]
    fn impossible_corridors_leave_the_pair_silently_disconnected() {
        // A corridor wider than the whole map can never fit.
        let config = DungeonConfig { tunnel_width: 50, ..DungeonConfig::default() };
        let tree = DungeonBuilder::new(config).generate(9);
        assert!(tree.all_tunnels().is_empty());
        assert_eq!(tree.node(tree.root()).tunnel, None);
        assert_eq!(tree.all_rooms().len(), 2);
    }

    #[test]
    fn deeper_pairs_are_connected_before_their_ancestors() {
        // With the bottom-up ordering, whenever an ancestor found a corridor
        // its candidate pool already contained the descendants' tunnels; the
        // observable invariant is that no tunnel crosses anything else.
        let config = DungeonConfig { total_size: 96, iterations: 4, ..DungeonConfig::default() };
        for seed in [1_u64, 7, 42, 1_000] {
            let tree = DungeonBuilder::new(config).generate(seed);
            let rooms = tree.all_rooms();
            let tunnels = tree.all_tunnels();
            for (index, tunnel) in tunnels.iter().enumerate() {
                assert!(!rooms.iter().any(|room| room.overlaps(*tunnel)));
                assert!(
                    !tunnels[index + 1..].iter().any(|other| other.overlaps(*tunnel)),
                    "tunnels must not cross each other (seed={seed})"
                );
            }
        }
    }
}
