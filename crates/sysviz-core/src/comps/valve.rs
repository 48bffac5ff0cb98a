//! Valve component.

use super::{fingerprint_of, ClassRef, CompDef, CompId, Identifiable, SmartComp};
use crate::pkg::STD_PKG;
use crate::render::{Container, DisplayNode, Primitive, Rgba, StrokeDesc};
use kurbo::{BezPath, Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual parameters of a valve, persisted with the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveParams {
    pub width: f64,
    pub height: f64,
    /// Open valves render with the open color, closed ones with the closed color.
    pub open: bool,
    pub open_color: Rgba,
    pub closed_color: Rgba,
}

impl Default for ValveParams {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 30.0,
            open: true,
            open_color: Rgba::new(46, 160, 67, 255),
            closed_color: Rgba::new(190, 42, 42, 255),
        }
    }
}

/// A two-way valve drawn as a bowtie with a stem.
#[derive(Debug, Clone)]
pub struct Valve {
    pub(crate) id: CompId,
    pub name: String,
    pub position: Point,
    pub params: ValveParams,
}

impl Valve {
    pub const CLASS: &'static str = "Valve";

    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
            params: ValveParams::default(),
        }
    }

    /// Reconstruct an instance from its persisted definition.
    pub(crate) fn from_def(def: &CompDef) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: def.id,
            name: def.name.clone(),
            position: def.position(),
            params: serde_json::from_value(def.params.clone())?,
        })
    }

    /// Representative instance shown by class-inspection tabs.
    pub fn demo() -> Box<dyn SmartComp> {
        Box::new(Self::new("valve", Point::new(20.0, 20.0)))
    }

    pub fn set_open(&mut self, open: bool) {
        self.params.open = open;
    }

    fn bowtie(&self) -> BezPath {
        let (x, y) = (self.position.x, self.position.y);
        let (w, h) = (self.params.width, self.params.height);
        let mut path = BezPath::new();
        path.move_to(Point::new(x, y));
        path.line_to(Point::new(x, y + h));
        path.line_to(Point::new(x + w, y));
        path.line_to(Point::new(x + w, y + h));
        path.close_path();
        path
    }
}

impl Identifiable for Valve {
    fn id(&self) -> CompId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn fingerprint(&self) -> String {
        fingerprint_of(self)
    }
}

impl SmartComp for Valve {
    fn class_ref(&self) -> ClassRef {
        ClassRef::new(STD_PKG, Self::CLASS)
    }

    fn manifest(&self, container: &mut dyn Container) {
        let fill = if self.params.open {
            self.params.open_color
        } else {
            self.params.closed_color
        };
        container.add(DisplayNode::prim(
            self.id,
            Primitive::Path {
                path: self.bowtie(),
                fill: Some(fill),
                stroke: Some(StrokeDesc::new(Rgba::black(), 1.5)),
            },
        ));
        // Stem above the body center.
        let stem_w = self.params.width * 0.1;
        container.add(DisplayNode::prim(
            self.id,
            Primitive::Rect {
                origin: Point::new(
                    self.position.x + self.params.width / 2.0 - stem_w / 2.0,
                    self.position.y - self.params.height * 0.4,
                ),
                size: Size::new(stem_w, self.params.height * 0.4),
                fill: Some(Rgba::black()),
                stroke: None,
                corner_radius: 0.0,
            },
        ));
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn visual_params(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.params)
    }

    fn clone_box(&self) -> Box<dyn SmartComp> {
        Box::new(self.clone())
    }
}

/// Class constructor registered with the standard package.
pub(crate) fn ctor(def: &CompDef) -> Result<Box<dyn SmartComp>, serde_json::Error> {
    Ok(Box::new(Valve::from_def(def)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DisplayList;

    #[test]
    fn test_manifest_emits_primitives() {
        let valve = Valve::new("inlet", Point::new(10.0, 10.0));
        let mut list = DisplayList::new();
        valve.manifest(&mut list);
        assert_eq!(list.prim_count(), 2);
    }

    #[test]
    fn test_open_state_round_trips_through_params() {
        let mut valve = Valve::new("inlet", Point::new(0.0, 0.0));
        valve.set_open(false);

        let def = CompDef {
            id: valve.id(),
            name: valve.name.clone(),
            class: valve.class_ref(),
            x: 0.0,
            y: 0.0,
            params: valve.visual_params().unwrap(),
        };
        let restored = Valve::from_def(&def).unwrap();
        assert!(!restored.params.open);
        assert_eq!(restored.id(), valve.id());
    }
}
