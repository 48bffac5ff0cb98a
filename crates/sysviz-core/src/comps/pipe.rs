//! Pipe component.

use super::{fingerprint_of, ClassRef, CompDef, CompId, Identifiable, SmartComp};
use crate::pkg::STD_PKG;
use crate::render::{Container, DisplayNode, Primitive, Rgba, StrokeDesc};
use kurbo::{BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual parameters of a pipe run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeParams {
    /// Waypoints relative to the pipe's position; the run starts at (0, 0).
    pub run: Vec<Vec2>,
    pub width: f64,
    pub color: Rgba,
}

impl Default for PipeParams {
    fn default() -> Self {
        Self {
            run: vec![Vec2::new(80.0, 0.0)],
            width: 6.0,
            color: Rgba::new(90, 90, 110, 255),
        }
    }
}

/// A polyline pipe run connecting components.
#[derive(Debug, Clone)]
pub struct Pipe {
    pub(crate) id: CompId,
    pub name: String,
    pub position: Point,
    pub params: PipeParams,
}

impl Pipe {
    pub const CLASS: &'static str = "Pipe";

    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
            params: PipeParams::default(),
        }
    }

    /// Pipe through the given waypoints (relative to `position`).
    pub fn with_run(name: impl Into<String>, position: Point, run: Vec<Vec2>) -> Self {
        let mut pipe = Self::new(name, position);
        pipe.params.run = run;
        pipe
    }

    pub(crate) fn from_def(def: &CompDef) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: def.id,
            name: def.name.clone(),
            position: def.position(),
            params: serde_json::from_value(def.params.clone())?,
        })
    }

    pub fn demo() -> Box<dyn SmartComp> {
        Box::new(Self::with_run(
            "pipe",
            Point::new(10.0, 30.0),
            vec![Vec2::new(60.0, 0.0), Vec2::new(60.0, 40.0)],
        ))
    }

    fn polyline(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.position);
        for waypoint in &self.params.run {
            path.line_to(self.position + *waypoint);
        }
        path
    }
}

impl Identifiable for Pipe {
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

impl SmartComp for Pipe {
    fn class_ref(&self) -> ClassRef {
        ClassRef::new(STD_PKG, Self::CLASS)
    }

    fn manifest(&self, container: &mut dyn Container) {
        container.add(DisplayNode::prim(
            self.id,
            Primitive::Path {
                path: self.polyline(),
                fill: None,
                stroke: Some(StrokeDesc::new(self.params.color, self.params.width)),
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

pub(crate) fn ctor(def: &CompDef) -> Result<Box<dyn SmartComp>, serde_json::Error> {
    Ok(Box::new(Pipe::from_def(def)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    #[test]
    fn test_run_is_relative_to_position() {
        let pipe = Pipe::with_run(
            "feed",
            Point::new(100.0, 100.0),
            vec![Vec2::new(50.0, 0.0)],
        );
        let bounds = pipe.polyline().bounding_box();
        assert_eq!(bounds.x0, 100.0);
        assert_eq!(bounds.x1, 150.0);
    }
}
