//! Package registry.
//!
//! Explicitly constructed and passed to the components that need it (no
//! process-global state): created at application start, torn down at
//! shutdown. Tabs address scenes as `(package name, scene id)` through the
//! registry, so every open tab over the same scene shares one live instance.

use crate::comps::{ClassRef, CompId};
use crate::pkg::{CompClass, SmartPkg};
use crate::scene::Scene;
use std::collections::HashMap;

/// Process-wide mapping from package name to package.
#[derive(Debug, Default)]
pub struct PkgRegistry {
    pkgs: HashMap<String, SmartPkg>,
}

impl PkgRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package. Re-registering the same name replaces the prior
    /// entry, which is returned.
    pub fn register(&mut self, pkg: SmartPkg) -> Option<SmartPkg> {
        let replaced = self.pkgs.insert(pkg.name.clone(), pkg);
        if let Some(old) = &replaced {
            log::info!("package '{}' replaced (was v{})", old.name, old.version);
        }
        replaced
    }

    /// Remove a package. Only explicit unloads mutate the registry.
    pub fn unregister(&mut self, name: &str) -> Option<SmartPkg> {
        self.pkgs.remove(name)
    }

    /// Look up a package by name. Unregistered names yield `None` so callers
    /// can present a user-facing message instead of crashing.
    pub fn get_package(&self, name: &str) -> Option<&SmartPkg> {
        self.pkgs.get(name)
    }

    pub fn get_package_mut(&mut self, name: &str) -> Option<&mut SmartPkg> {
        self.pkgs.get_mut(name)
    }

    /// Resolve a class reference to its registered definition.
    pub fn resolve_class(&self, class: &ClassRef) -> Option<&CompClass> {
        self.pkgs
            .get(&class.pkg_name)
            .and_then(|pkg| pkg.class(&class.class_name))
    }

    pub fn scene(&self, pkg_name: &str, scene_id: CompId) -> Option<&Scene> {
        self.get_package(pkg_name)?.scene(scene_id)
    }

    pub fn scene_mut(&mut self, pkg_name: &str, scene_id: CompId) -> Option<&mut Scene> {
        self.get_package_mut(pkg_name)?.scene_mut(scene_id)
    }

    pub fn names(&self) -> Vec<&str> {
        self.pkgs.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.pkgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pkgs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comps::{Identifiable, Valve};
    use crate::pkg::{std_classes, STD_PKG};
    use crate::scene::Scene;

    #[test]
    fn test_unknown_package_is_none_not_error() {
        let registry = PkgRegistry::new();
        assert!(registry.get_package("unknown-name").is_none());
    }

    #[test]
    fn test_register_and_resolve_class() {
        let mut registry = PkgRegistry::new();
        registry.register(std_classes());

        let class = ClassRef::new(STD_PKG, Valve::CLASS);
        assert!(registry.resolve_class(&class).is_some());

        let missing = ClassRef::new(STD_PKG, "NoSuchClass");
        assert!(registry.resolve_class(&missing).is_none());

        let missing_pkg = ClassRef::new("vendor.pkg", Valve::CLASS);
        assert!(registry.resolve_class(&missing_pkg).is_none());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = PkgRegistry::new();
        let scene = Scene::new("one");
        registry.register(SmartPkg::scenes_pkg("acme.plant", "1.0.0", vec![scene]));

        let replaced =
            registry.register(SmartPkg::scenes_pkg("acme.plant", "2.0.0", Vec::new()));
        assert!(replaced.is_some());
        assert_eq!(replaced.unwrap().version, "1.0.0");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_package("acme.plant").unwrap().version, "2.0.0");
    }

    #[test]
    fn test_scene_lookup_through_registry() {
        let mut registry = PkgRegistry::new();
        let scene = Scene::new("plant");
        let id = scene.id();
        registry.register(SmartPkg::scenes_pkg("acme.plant", "1.0.0", vec![scene]));

        assert!(registry.scene("acme.plant", id).is_some());
        assert!(registry.scene_mut("acme.plant", id).is_some());
        assert!(registry.scene("other", id).is_none());
    }
}
