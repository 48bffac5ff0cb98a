//! Gauge component.

use super::{fingerprint_of, ClassRef, CompDef, CompId, Identifiable, SmartComp};
use crate::pkg::STD_PKG;
use crate::render::{Container, DisplayNode, Primitive, Rgba, StrokeDesc};
use kurbo::{BezPath, Circle, Point, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual parameters of a gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeParams {
    pub radius: f64,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub face_color: Rgba,
    pub needle_color: Rgba,
}

impl Default for GaugeParams {
    fn default() -> Self {
        Self {
            radius: 25.0,
            min: 0.0,
            max: 100.0,
            value: 0.0,
            face_color: Rgba::white(),
            needle_color: Rgba::new(190, 42, 42, 255),
        }
    }
}

/// A round dial gauge with a needle.
///
/// `position` is the dial center.
#[derive(Debug, Clone)]
pub struct Gauge {
    pub(crate) id: CompId,
    pub name: String,
    pub position: Point,
    pub params: GaugeParams,
}

impl Gauge {
    pub const CLASS: &'static str = "Gauge";

    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
            params: GaugeParams::default(),
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
        let mut gauge = Self::new("gauge", Point::new(40.0, 40.0));
        gauge.params.value = 65.0;
        Box::new(gauge)
    }

    /// Set the reading, clamped to the dial range.
    pub fn set_value(&mut self, value: f64) {
        self.params.value = value.clamp(self.params.min, self.params.max);
    }

    fn needle(&self) -> BezPath {
        // Sweep from 225 degrees (min) to -45 degrees (max).
        let span = self.params.max - self.params.min;
        let frac = if span.abs() < f64::EPSILON {
            0.0
        } else {
            (self.params.value - self.params.min) / span
        };
        let angle = (225.0 - 270.0 * frac).to_radians();
        let tip = Point::new(
            self.position.x + angle.cos() * self.params.radius * 0.8,
            self.position.y - angle.sin() * self.params.radius * 0.8,
        );
        let mut path = BezPath::new();
        path.move_to(self.position);
        path.line_to(tip);
        path
    }
}

impl Identifiable for Gauge {
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

impl SmartComp for Gauge {
    fn class_ref(&self) -> ClassRef {
        ClassRef::new(STD_PKG, Self::CLASS)
    }

    fn manifest(&self, container: &mut dyn Container) {
        let face = Circle::new(self.position, self.params.radius).to_path(0.1);
        container.add(DisplayNode::prim(
            self.id,
            Primitive::Path {
                path: face,
                fill: Some(self.params.face_color),
                stroke: Some(StrokeDesc::new(Rgba::black(), 1.5)),
            },
        ));
        container.add(DisplayNode::prim(
            self.id,
            Primitive::Path {
                path: self.needle(),
                fill: None,
                stroke: Some(StrokeDesc::new(self.params.needle_color, 2.0)),
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
    Ok(Box::new(Gauge::from_def(def)?))
}
