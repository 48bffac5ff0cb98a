//! Drawable-primitive container abstraction.
//!
//! Components manifest themselves into an abstract [`Container`] as plain
//! primitive descriptors. Nothing here assumes a concrete canvas technology;
//! a host surface consumes the finished [`DisplayList`] through [`Surface`].

use crate::comps::CompId;
use kurbo::{Affine, BezPath, Point, Rect, Shape, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke descriptor for outlined primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeDesc {
    pub color: Rgba,
    pub width: f64,
}

impl StrokeDesc {
    pub fn new(color: Rgba, width: f64) -> Self {
        Self { color, width }
    }
}

/// A drawable primitive descriptor.
#[derive(Debug, Clone)]
pub enum Primitive {
    Rect {
        origin: Point,
        size: Size,
        fill: Option<Rgba>,
        stroke: Option<StrokeDesc>,
        corner_radius: f64,
    },
    Path {
        path: BezPath,
        fill: Option<Rgba>,
        stroke: Option<StrokeDesc>,
    },
}

impl Primitive {
    /// Bounding box in the primitive's local coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Primitive::Rect { origin, size, .. } => Rect::from_origin_size(*origin, *size),
            Primitive::Path { path, .. } => path.bounding_box(),
        }
    }

    /// Translate the primitive in place.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Primitive::Rect { origin, .. } => *origin += delta,
            Primitive::Path { path, .. } => path.apply_affine(Affine::translate(delta)),
        }
    }
}

/// A node in a manifested display tree.
#[derive(Debug, Clone)]
pub enum DisplayNode {
    /// A primitive tagged with the component that produced it.
    Prim {
        comp: CompId,
        primitive: Primitive,
        /// Runtime interactivity flag; flipped in place, never remanifested.
        draggable: bool,
    },
    /// A nested sub-container (one per manifested scene).
    Group(DisplayGroup),
}

impl DisplayNode {
    /// Primitive node with interactivity off. Drag affordances are enabled
    /// later through [`DisplayList::set_interactive`].
    pub fn prim(comp: CompId, primitive: Primitive) -> Self {
        DisplayNode::Prim {
            comp,
            primitive,
            draggable: false,
        }
    }
}

/// Abstract container components manifest into.
pub trait Container {
    fn add(&mut self, node: DisplayNode);
}

/// An ordered group of display nodes at a translation offset.
#[derive(Debug, Clone, Default)]
pub struct DisplayGroup {
    pub offset: Vec2,
    nodes: Vec<DisplayNode>,
}

impl DisplayGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(offset: Vec2) -> Self {
        Self {
            offset,
            nodes: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[DisplayNode] {
        &self.nodes
    }

    fn hit_test(&self, point: Point) -> Option<Hit> {
        let local = point - self.offset;
        // Later nodes paint on top, so test front to back.
        for node in self.nodes.iter().rev() {
            match node {
                DisplayNode::Prim {
                    comp,
                    primitive,
                    draggable,
                } => {
                    if primitive.bounds().contains(local) {
                        return Some(Hit {
                            comp: *comp,
                            draggable: *draggable,
                        });
                    }
                }
                DisplayNode::Group(group) => {
                    if let Some(hit) = group.hit_test(local) {
                        return Some(hit);
                    }
                }
            }
        }
        None
    }

    fn set_interactive(&mut self, flag: bool) {
        for node in &mut self.nodes {
            match node {
                DisplayNode::Prim { draggable, .. } => *draggable = flag,
                DisplayNode::Group(group) => group.set_interactive(flag),
            }
        }
    }

    fn translate_comp(&mut self, id: CompId, delta: Vec2) {
        for node in &mut self.nodes {
            match node {
                DisplayNode::Prim {
                    comp, primitive, ..
                } => {
                    if *comp == id {
                        primitive.translate(delta);
                    }
                }
                DisplayNode::Group(group) => group.translate_comp(id, delta),
            }
        }
    }

    fn prim_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| match node {
                DisplayNode::Prim { .. } => 1,
                DisplayNode::Group(group) => group.prim_count(),
            })
            .sum()
    }
}

impl Container for DisplayGroup {
    fn add(&mut self, node: DisplayNode) {
        self.nodes.push(node);
    }
}

/// Result of a pointer hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub comp: CompId,
    pub draggable: bool,
}

/// The manifested output of one mount pass.
///
/// Holds the full display tree plus the runtime-only animation clock.
/// Nothing in here is ever persisted.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    root: DisplayGroup,
    clock: f64,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &DisplayGroup {
        &self.root
    }

    /// Topmost component under `point`, if any.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        self.root.hit_test(point)
    }

    /// Flip the drag affordance on every manifested primitive in place.
    pub fn set_interactive(&mut self, flag: bool) {
        self.root.set_interactive(flag);
    }

    /// Move all primitives belonging to one component, without remanifesting.
    pub fn translate_comp(&mut self, id: CompId, delta: Vec2) {
        self.root.translate_comp(id, delta);
    }

    /// Advance the animation clock. Only called while a view is animating.
    pub fn advance(&mut self, dt: f64) {
        self.clock += dt;
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Total number of primitives across all groups.
    pub fn prim_count(&self) -> usize {
        self.root.prim_count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.nodes.is_empty()
    }
}

impl Container for DisplayList {
    fn add(&mut self, node: DisplayNode) {
        self.root.add(node);
    }
}

/// The concrete drawing-surface boundary.
///
/// Implementations translate a display list into whatever canvas technology
/// the host uses. The core never assumes more than this.
pub trait Surface {
    /// Show the given display list.
    fn present(&mut self, list: &DisplayList);

    /// Drop everything previously presented (view teardown).
    fn clear(&mut self);
}

/// Surface that only records activity. Used in tests and headless runs.
#[derive(Debug, Default)]
pub struct MemorySurface {
    pub presents: usize,
    pub last_prim_count: usize,
    pub cleared: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for MemorySurface {
    fn present(&mut self, list: &DisplayList) {
        self.presents += 1;
        self.last_prim_count = list.prim_count();
    }

    fn clear(&mut self) {
        self.cleared += 1;
        self.last_prim_count = 0;
    }
}
