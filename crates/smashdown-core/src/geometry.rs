use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in arena units. `top` is numerically smaller than
/// `bottom` (y grows downward, ground at 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    /// Rectangle anchored at its top-left corner.
    pub fn at(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x,
            right: x + width,
            top: y,
            bottom: y + height,
        }
    }

    /// Box of `width`×`height` placed `offset` units from `x` along `facing`
    /// (+1 right, -1 left), sharing the owner's top edge.
    pub fn ahead(x: f32, y: f32, facing: f32, offset: f32, width: f32, height: f32) -> Self {
        let left = if facing >= 0.0 {
            x + offset
        } else {
            x - offset
        };
        Self::at(left, y, width, height)
    }

    /// Strict overlap test; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}
