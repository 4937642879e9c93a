//! Rendered box sizes.
//!
//! A parsed document has no layout. Whoever does have one (a live page, a
//! capture dump, a test) supplies it through [`BoxGeometry`]; everything
//! else uses [`NoGeometry`].

use std::collections::HashMap;

use crate::NodeId;

/// Width and height of an element's bounding box, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Border-box width.
    pub width: f32,
    /// Border-box height.
    pub height: f32,
}

impl Rect {
    /// Create a rect from its dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Source of `getBoundingClientRect()`-style measurements.
pub trait BoxGeometry {
    /// The bounding box of `node`, or `None` if it is unknown or not rendered.
    fn bounding_box(&self, node: NodeId) -> Option<Rect>;
}

/// Geometry for documents that were never laid out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl BoxGeometry for NoGeometry {
    fn bounding_box(&self, _node: NodeId) -> Option<Rect> {
        None
    }
}

/// Geometry backed by a precomputed table.
#[derive(Debug, Clone, Default)]
pub struct FixedGeometry {
    boxes: HashMap<NodeId, Rect>,
}

impl FixedGeometry {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the box of `node`, replacing any earlier entry.
    pub fn set(&mut self, node: NodeId, rect: Rect) {
        let _ = self.boxes.insert(node, rect);
    }
}

impl BoxGeometry for FixedGeometry {
    fn bounding_box(&self, node: NodeId) -> Option<Rect> {
        self.boxes.get(&node).copied()
    }
}
