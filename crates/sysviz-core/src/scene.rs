//! Scenes: ordered, owned collections of positioned components.

use crate::comps::{CompId, Identifiable, SmartComp};
use crate::render::{Container, DisplayGroup, DisplayNode};
use kurbo::Vec2;
use std::fmt;
use uuid::Uuid;

/// One entry in a scene's children sequence.
///
/// A child is either a component instance or a nested scene (a "collage").
/// Every node lives in exactly one parent at a time; moving a node between
/// scenes goes through [`move_child`].
#[derive(Clone)]
pub enum SceneNode {
    Comp(Box<dyn SmartComp>),
    Scene(Box<Scene>),
}

impl SceneNode {
    pub fn id(&self) -> CompId {
        match self {
            SceneNode::Comp(comp) => comp.id(),
            SceneNode::Scene(scene) => scene.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SceneNode::Comp(comp) => comp.name(),
            SceneNode::Scene(scene) => scene.name(),
        }
    }

    fn manifest(&self, container: &mut dyn Container) {
        match self {
            SceneNode::Comp(comp) => comp.manifest(container),
            SceneNode::Scene(scene) => scene.manifest(container),
        }
    }

    fn fingerprint(&self) -> String {
        match self {
            SceneNode::Comp(comp) => comp.fingerprint(),
            SceneNode::Scene(scene) => scene.fingerprint(),
        }
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneNode::Comp(comp) => write!(f, "Comp({}:{})", comp.class_name(), comp.name()),
            SceneNode::Scene(scene) => write!(f, "Scene({})", scene.name()),
        }
    }
}

/// An ordered collection of components with a scene-level transform.
///
/// Sequence order is z-order: later children paint on top. Scenes own their
/// children exclusively and are themselves renderable, so a scene can be
/// embedded in another container.
#[derive(Debug, Clone)]
pub struct Scene {
    id: CompId,
    pub name: String,
    children: Vec<SceneNode>,
    pub transform: Vec2,
    draggable: bool,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            children: Vec::new(),
            transform: Vec2::ZERO,
            draggable: false,
        }
    }

    /// Reconstruct a scene with a specific identity (persistence path).
    pub(crate) fn restore(
        id: CompId,
        name: String,
        transform: Vec2,
        draggable: bool,
        children: Vec<SceneNode>,
    ) -> Self {
        Self {
            id,
            name,
            children,
            transform,
            draggable,
        }
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a child at the top of the z-order.
    pub fn add_child(&mut self, node: SceneNode) {
        self.children.push(node);
    }

    /// Insert a child at a specific z-position (clamped).
    pub fn insert_child(&mut self, index: usize, node: SceneNode) {
        let index = index.min(self.children.len());
        self.children.insert(index, node);
    }

    /// Remove a child by id, preserving the order of the remaining children.
    pub fn remove_child(&mut self, id: CompId) -> Option<SceneNode> {
        let index = self.child_index(id)?;
        Some(self.children.remove(index))
    }

    /// Move a child to a new z-position. Returns false if the id is unknown.
    pub fn reorder_child(&mut self, id: CompId, index: usize) -> bool {
        let Some(current) = self.child_index(id) else {
            return false;
        };
        let node = self.children.remove(current);
        let index = index.min(self.children.len());
        self.children.insert(index, node);
        true
    }

    pub fn child_index(&self, id: CompId) -> Option<usize> {
        self.children.iter().position(|node| node.id() == id)
    }

    /// Find a component by id, searching nested scenes.
    pub fn comp(&self, id: CompId) -> Option<&dyn SmartComp> {
        for child in &self.children {
            match child {
                SceneNode::Comp(comp) => {
                    if comp.id() == id {
                        return Some(comp.as_ref());
                    }
                }
                SceneNode::Scene(scene) => {
                    if let Some(found) = scene.comp(id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Mutable lookup of a component by id, searching nested scenes.
    pub fn comp_mut(&mut self, id: CompId) -> Option<&mut dyn SmartComp> {
        for child in &mut self.children {
            match child {
                SceneNode::Comp(comp) => {
                    if comp.id() == id {
                        return Some(comp.as_mut());
                    }
                }
                SceneNode::Scene(scene) => {
                    if let Some(found) = scene.comp_mut(id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Design-time draggability flag, persisted with the scene.
    ///
    /// Runtime propagation to already-manifested primitives is mediated by
    /// the [`SmartView`](crate::view::SmartView) that owns the display list.
    pub fn draggable(&self) -> bool {
        self.draggable
    }

    pub fn set_draggable(&mut self, flag: bool) {
        self.draggable = flag;
    }

    /// Manifest the scene: open a sub-group at the scene transform, then
    /// manifest each child into it in sequence order.
    pub fn manifest(&self, container: &mut dyn Container) {
        let mut group = DisplayGroup::with_offset(self.transform);
        for child in &self.children {
            child.manifest(&mut group);
        }
        container.add(DisplayNode::Group(group));
    }
}

impl Identifiable for Scene {
    fn id(&self) -> CompId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &'static str {
        "Scene"
    }

    fn fingerprint(&self) -> String {
        let children: Vec<String> = self.children.iter().map(|c| c.fingerprint()).collect();
        format!(
            "Scene:{}:{}@({},{}):drag={}:[{}]",
            self.id,
            self.name,
            self.transform.x,
            self.transform.y,
            self.draggable,
            children.join(",")
        )
    }
}

/// Move a child from one scene to another, keeping the single-parent
/// invariant: after this, exactly one of the scenes contains the node.
/// Returns false (and changes nothing) if `id` is not a child of `from`.
pub fn move_child(from: &mut Scene, to: &mut Scene, id: CompId) -> bool {
    match from.remove_child(id) {
        Some(node) => {
            to.add_child(node);
            true
        }
        None => false,
    }
}
