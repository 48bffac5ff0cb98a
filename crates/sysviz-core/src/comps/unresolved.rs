//! Placeholder for components whose class could not be resolved.

use super::{ClassRef, CompDef, CompId, Identifiable, SmartComp};
use crate::render::{Container, DisplayNode, Primitive, Rgba, StrokeDesc};
use kurbo::{Point, Size};

/// Stands in for an instance whose class reference has no registered
/// definition.
///
/// The original [`CompDef`] is preserved verbatim, so a package loaded with
/// unresolved entries still round-trips without data loss. Renders as a
/// flagged placeholder rectangle.
#[derive(Debug, Clone)]
pub struct UnresolvedComp {
    def: CompDef,
}

impl UnresolvedComp {
    pub const CLASS: &'static str = "Unresolved";

    pub fn new(def: CompDef) -> Self {
        Self { def }
    }

    /// The class reference that failed to resolve.
    pub fn missing_class(&self) -> &ClassRef {
        &self.def.class
    }

    pub fn def(&self) -> &CompDef {
        &self.def
    }
}

impl Identifiable for UnresolvedComp {
    fn id(&self) -> CompId {
        self.def.id
    }

    fn name(&self) -> &str {
        &self.def.name
    }

    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{}@({},{}):{}",
            Self::CLASS,
            self.def.id,
            self.def.name,
            self.def.x,
            self.def.y,
            self.def.params
        )
    }
}

impl SmartComp for UnresolvedComp {
    fn class_ref(&self) -> ClassRef {
        self.def.class.clone()
    }

    fn manifest(&self, container: &mut dyn Container) {
        container.add(DisplayNode::prim(
            self.def.id,
            Primitive::Rect {
                origin: self.def.position(),
                size: Size::new(40.0, 40.0),
                fill: Some(Rgba::new(230, 200, 80, 160)),
                stroke: Some(StrokeDesc::new(Rgba::new(190, 42, 42, 255), 2.0)),
                corner_radius: 0.0,
            },
        ));
    }

    fn position(&self) -> Point {
        self.def.position()
    }

    fn set_position(&mut self, position: Point) {
        self.def.x = position.x;
        self.def.y = position.y;
    }

    fn visual_params(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(self.def.params.clone())
    }

    fn clone_box(&self) -> Box<dyn SmartComp> {
        Box::new(self.clone())
    }
}
