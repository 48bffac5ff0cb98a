//! Tank component.

use super::{fingerprint_of, ClassRef, CompDef, CompId, Identifiable, SmartComp};
use crate::pkg::STD_PKG;
use crate::render::{Container, DisplayNode, Primitive, Rgba, StrokeDesc};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual parameters of a tank vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankParams {
    pub width: f64,
    pub height: f64,
    /// Fill level, 0.0 (empty) to 1.0 (full).
    pub level: f64,
    pub shell_color: Rgba,
    pub contents_color: Rgba,
}

impl Default for TankParams {
    fn default() -> Self {
        Self {
            width: 60.0,
            height: 90.0,
            level: 0.5,
            shell_color: Rgba::new(120, 120, 130, 255),
            contents_color: Rgba::new(64, 120, 192, 255),
        }
    }
}

/// A vessel drawn as a rounded shell with a level-proportional contents fill.
#[derive(Debug, Clone)]
pub struct Tank {
    pub(crate) id: CompId,
    pub name: String,
    pub position: Point,
    pub params: TankParams,
}

impl Tank {
    pub const CLASS: &'static str = "Tank";

    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
            params: TankParams::default(),
        }
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
        Box::new(Self::new("tank", Point::new(20.0, 20.0)))
    }

    pub fn set_level(&mut self, level: f64) {
        self.params.level = level.clamp(0.0, 1.0);
    }
}

impl Identifiable for Tank {
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

impl SmartComp for Tank {
    fn class_ref(&self) -> ClassRef {
        ClassRef::new(STD_PKG, Self::CLASS)
    }

    fn manifest(&self, container: &mut dyn Container) {
        let (w, h) = (self.params.width, self.params.height);
        // Contents first so the shell outline paints on top.
        let fill_h = h * self.params.level;
        container.add(DisplayNode::prim(
            self.id,
            Primitive::Rect {
                origin: Point::new(self.position.x, self.position.y + h - fill_h),
                size: Size::new(w, fill_h),
                fill: Some(self.params.contents_color),
                stroke: None,
                corner_radius: 0.0,
            },
        ));
        container.add(DisplayNode::prim(
            self.id,
            Primitive::Rect {
                origin: self.position,
                size: Size::new(w, h),
                fill: None,
                stroke: Some(StrokeDesc::new(self.params.shell_color, 3.0)),
                corner_radius: 8.0,
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
    Ok(Box::new(Tank::from_def(def)?))
}
