//! Component definitions for the diagram editor.
//!
//! A component is a polymorphic visual element: concrete classes implement
//! [`SmartComp`] and emit drawable primitives when manifested. Class identity
//! travels as a [`ClassRef`] so instances can be persisted without embedding
//! code.

mod gauge;
mod pipe;
mod tank;
mod unresolved;
mod valve;

pub use gauge::{Gauge, GaugeParams};
pub use pipe::{Pipe, PipeParams};
pub use tank::{Tank, TankParams};
pub use unresolved::UnresolvedComp;
pub use valve::{Valve, ValveParams};

pub(crate) use gauge::ctor as gauge_ctor;
pub(crate) use pipe::ctor as pipe_ctor;
pub(crate) use tank::ctor as tank_ctor;
pub(crate) use valve::ctor as valve_ctor;

use crate::render::Container;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for components (and scenes).
pub type CompId = Uuid;

/// Tagged class identity: `(package name, class name)`.
///
/// Resolved against the package registry at load time; never carries code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRef {
    pub pkg_name: String,
    pub class_name: String,
}

impl ClassRef {
    pub fn new(pkg_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            pkg_name: pkg_name.into(),
            class_name: class_name.into(),
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pkg_name, self.class_name)
    }
}

/// Serialized form of one component instance: class reference plus visual
/// parameters, never code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompDef {
    pub id: CompId,
    pub name: String,
    pub class: ClassRef,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl CompDef {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Base capability: identity plus a stable textual representation used by
/// change detection.
pub trait Identifiable {
    /// Globally unique id, assigned at construction and immutable.
    fn id(&self) -> CompId;

    /// Human-readable display name.
    fn name(&self) -> &str;

    /// Diagnostic class name.
    fn class_name(&self) -> &'static str;

    /// Stable representation fed into change detection.
    fn fingerprint(&self) -> String;
}

/// A polymorphic visual component.
pub trait SmartComp: Identifiable + Send + Sync {
    /// Class identity used for persistence.
    fn class_ref(&self) -> ClassRef;

    /// Emit this component's primitives into the container. Safe to call
    /// once per mount; implementations never retain the container.
    fn manifest(&self, container: &mut dyn Container);

    fn position(&self) -> Point;

    /// The one mutation interactive drag performs. Scoped to this
    /// component's own visual parameters, never sibling state.
    fn set_position(&mut self, position: Point);

    /// Class-specific parameters persisted alongside the class reference.
    fn visual_params(&self) -> Result<serde_json::Value, serde_json::Error>;

    fn clone_box(&self) -> Box<dyn SmartComp>;
}

impl Clone for Box<dyn SmartComp> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Shared fingerprint shape for components: class, id, position, params.
pub fn fingerprint_of(comp: &dyn SmartComp) -> String {
    let params = comp
        .visual_params()
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "?".to_string());
    let pos = comp.position();
    format!(
        "{}:{}:{}@({},{}):{}",
        comp.class_name(),
        comp.id(),
        comp.name(),
        pos.x,
        pos.y,
        params
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_ref_display() {
        let class = ClassRef::new("sysviz.std", "Valve");
        assert_eq!(class.to_string(), "sysviz.std/Valve");
    }

    #[test]
    fn test_fingerprint_changes_with_position() {
        let mut valve = Valve::new("inlet", Point::new(0.0, 0.0));
        let before = valve.fingerprint();
        valve.set_position(Point::new(10.0, 0.0));
        assert_ne!(before, valve.fingerprint());
    }

    #[test]
    fn test_clone_box_preserves_identity() {
        let valve = Valve::new("inlet", Point::new(5.0, 5.0));
        let boxed: Box<dyn SmartComp> = Box::new(valve);
        let cloned = boxed.clone();
        assert_eq!(boxed.id(), cloned.id());
        assert_eq!(boxed.fingerprint(), cloned.fingerprint());
    }
}
