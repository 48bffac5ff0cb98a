//! Packages: named, versioned bundles of scenes or component classes.

use crate::comps::{self, CompDef, CompId, Gauge, Identifiable, Pipe, SmartComp, Tank, Valve};
use crate::scene::Scene;
use std::collections::BTreeMap;

/// Name the built-in class library is registered under.
pub const STD_PKG: &str = "sysviz.std";

/// Constructor resolving a persisted definition into a live instance.
pub type CompCtor = fn(&CompDef) -> Result<Box<dyn SmartComp>, serde_json::Error>;

/// Factory for the representative instance shown by class-inspection tabs.
pub type CompDemo = fn() -> Box<dyn SmartComp>;

/// A registered component class: code, not data.
#[derive(Debug, Clone, Copy)]
pub struct CompClass {
    pub ctor: CompCtor,
    pub demo: CompDemo,
}

/// What a package holds. A package is one or the other, never both; the
/// distinction decides whether "Save" is even meaningful.
#[derive(Debug, Clone)]
pub enum PkgEntries {
    /// Persistable scene/collage definitions.
    Scenes(Vec<Scene>),
    /// A class registry: class name to constructor. Not savable as
    /// instance data.
    Classes(BTreeMap<String, CompClass>),
}

/// A named, versioned package.
#[derive(Debug, Clone)]
pub struct SmartPkg {
    pub name: String,
    pub version: String,
    entries: PkgEntries,
}

impl SmartPkg {
    pub fn scenes_pkg(
        name: impl Into<String>,
        version: impl Into<String>,
        scenes: Vec<Scene>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            entries: PkgEntries::Scenes(scenes),
        }
    }

    pub fn class_pkg(
        name: impl Into<String>,
        version: impl Into<String>,
        classes: BTreeMap<String, CompClass>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            entries: PkgEntries::Classes(classes),
        }
    }

    pub fn is_class_library(&self) -> bool {
        matches!(self.entries, PkgEntries::Classes(_))
    }

    /// Class-library packages hold code, not serializable instance state.
    pub fn is_persistable(&self) -> bool {
        !self.is_class_library()
    }

    pub fn scenes(&self) -> &[Scene] {
        match &self.entries {
            PkgEntries::Scenes(scenes) => scenes,
            PkgEntries::Classes(_) => &[],
        }
    }

    pub fn scene(&self, id: CompId) -> Option<&Scene> {
        self.scenes().iter().find(|scene| scene.id() == id)
    }

    pub fn scene_mut(&mut self, id: CompId) -> Option<&mut Scene> {
        match &mut self.entries {
            PkgEntries::Scenes(scenes) => scenes.iter_mut().find(|scene| scene.id() == id),
            PkgEntries::Classes(_) => None,
        }
    }

    /// Add a scene to a persistable package. Returns false for class
    /// libraries.
    pub fn add_scene(&mut self, scene: Scene) -> bool {
        match &mut self.entries {
            PkgEntries::Scenes(scenes) => {
                scenes.push(scene);
                true
            }
            PkgEntries::Classes(_) => false,
        }
    }

    pub fn class(&self, class_name: &str) -> Option<&CompClass> {
        match &self.entries {
            PkgEntries::Classes(classes) => classes.get(class_name),
            PkgEntries::Scenes(_) => None,
        }
    }

    pub fn class_names(&self) -> Vec<String> {
        match &self.entries {
            PkgEntries::Classes(classes) => classes.keys().cloned().collect(),
            PkgEntries::Scenes(_) => Vec::new(),
        }
    }

    /// Stable representation fed into change detection.
    pub fn fingerprint(&self) -> String {
        let body = match &self.entries {
            PkgEntries::Scenes(scenes) => scenes
                .iter()
                .map(|scene| scene.fingerprint())
                .collect::<Vec<_>>()
                .join(";"),
            PkgEntries::Classes(classes) => classes.keys().cloned().collect::<Vec<_>>().join(";"),
        };
        format!("Pkg:{}@{}:[{}]", self.name, self.version, body)
    }
}

/// The built-in component class library, registered at application start.
pub fn std_classes() -> SmartPkg {
    let mut classes = BTreeMap::new();
    classes.insert(
        Valve::CLASS.to_string(),
        CompClass {
            ctor: comps::valve_ctor,
            demo: Valve::demo,
        },
    );
    classes.insert(
        Gauge::CLASS.to_string(),
        CompClass {
            ctor: comps::gauge_ctor,
            demo: Gauge::demo,
        },
    );
    classes.insert(
        Pipe::CLASS.to_string(),
        CompClass {
            ctor: comps::pipe_ctor,
            demo: Pipe::demo,
        },
    );
    classes.insert(
        Tank::CLASS.to_string(),
        CompClass {
            ctor: comps::tank_ctor,
            demo: Tank::demo,
        },
    );
    SmartPkg::class_pkg(STD_PKG, env!("CARGO_PKG_VERSION"), classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comps::ClassRef;
    use kurbo::Point;
    use uuid::Uuid;

    #[test]
    fn test_std_classes_is_a_class_library() {
        let pkg = std_classes();
        assert!(pkg.is_class_library());
        assert!(!pkg.is_persistable());
        assert_eq!(pkg.class_names().len(), 4);
        assert!(pkg.class(Valve::CLASS).is_some());
        assert!(pkg.class("NoSuchClass").is_none());
    }

    #[test]
    fn test_class_pkg_holds_no_scenes() {
        let pkg = std_classes();
        assert!(pkg.scenes().is_empty());
        assert!(pkg.scene(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_scenes_pkg_is_persistable() {
        let scene = Scene::new("plant");
        let id = scene.id();
        let pkg = SmartPkg::scenes_pkg("acme.plant", "1.0.0", vec![scene]);

        assert!(pkg.is_persistable());
        assert!(pkg.scene(id).is_some());
        assert!(pkg.class(Valve::CLASS).is_none());
    }

    #[test]
    fn test_add_scene_refused_on_class_library() {
        let mut pkg = std_classes();
        assert!(!pkg.add_scene(Scene::new("plant")));
    }

    #[test]
    fn test_ctor_reconstructs_instance() {
        let pkg = std_classes();
        let valve = Valve::new("inlet", Point::new(3.0, 4.0));
        let def = CompDef {
            id: valve.id(),
            name: "inlet".to_string(),
            class: ClassRef::new(STD_PKG, Valve::CLASS),
            x: 3.0,
            y: 4.0,
            params: valve.visual_params().unwrap(),
        };

        let class = pkg.class(Valve::CLASS).unwrap();
        let restored = (class.ctor)(&def).unwrap();
        assert_eq!(restored.id(), valve.id());
        assert_eq!(restored.position(), Point::new(3.0, 4.0));
    }
}
