//! Integer rectangle and axis primitives shared by partitioning and the corridor search.

use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle anchored at `(x, y)` with extent
/// `(x + width, y + height)`.
///
/// Containment is half-open (a point on the max edge is outside) and overlap
/// is strict (rectangles sharing only an edge do not overlap). The corridor
/// search relies on both conventions: a tunnel is allowed to touch the rooms
/// it connects without counting as a collision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn x_min(self) -> i32 {
        self.x
    }

    pub fn x_max(self) -> i32 {
        self.x + self.width
    }

    pub fn y_min(self) -> i32 {
        self.y
    }

    pub fn y_max(self) -> i32 {
        self.y + self.height
    }

    pub fn area(self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x_min() && px < self.x_max() && py >= self.y_min() && py < self.y_max()
    }

    pub fn overlaps(self, other: Rect) -> bool {
        self.x_min() < other.x_max()
            && self.x_max() > other.x_min()
            && self.y_min() < other.y_max()
            && self.y_max() > other.y_min()
    }
}

/// Axis along which a region was divided into its two children.
///
/// Doubles as the motion direction of a corridor: a corridor joining the two
/// halves of a `Vertical` split runs `Horizontal`, and vice versa.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

impl SplitAxis {
    pub fn perpendicular(self) -> Self {
        match self {
            SplitAxis::Horizontal => SplitAxis::Vertical,
            SplitAxis::Vertical => SplitAxis::Horizontal,
        }
    }
}
