//! Tab controllers: display-mode state machines over lazily-created views.
//!
//! A tab owns at most one view panel, created on first request and torn down
//! with the tab. Display mode is pure runtime state; nothing about it is
//! ever written into a package.

use crate::comps::{ClassRef, CompId, Identifiable};
use crate::persist::PersistError;
use crate::pkg::SmartPkg;
use crate::registry::PkgRegistry;
use crate::render::Surface;
use crate::view::{SmartView, ViewError};
use thiserror::Error;

/// How a tab's panel behaves.
///
/// `View` is the resting state. `Animate` layers a running clock on top of
/// view mode and always unwinds back to `View`; it never persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispMode {
    /// Drag affordances on, model mutable through the panel.
    Edit,
    /// Static display, model read-only.
    #[default]
    View,
    /// Animation clock running, affordances off.
    Animate,
}

/// Tab-level errors.
#[derive(Debug, Error)]
pub enum TabError {
    #[error("package '{0}' is not registered")]
    UnknownPackage(String),
    #[error("scene {scene_id} not found in package '{pkg_name}'")]
    UnknownScene { pkg_name: String, scene_id: CompId },
    #[error("class {0} is not registered")]
    UnknownClass(ClassRef),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Common surface of every tab kind.
pub trait TabController {
    /// Stable identifier, unique per open tab.
    fn tab_id(&self) -> &str;

    fn tab_name(&self) -> &str;

    fn disp_mode(&self) -> DispMode;

    /// Switch display mode, updating the panel's affordances if one exists.
    /// Returns false (and stays put) if the tab refuses the mode. Mode is
    /// runtime state only; nothing here writes into the model.
    fn set_disp_mode(&mut self, mode: DispMode) -> bool;

    /// Whether this tab ever allows edit mode.
    fn is_editable(&self) -> bool;

    /// Get the panel, creating it on first call. Creation renders nothing;
    /// the caller decides when to mount it on a surface.
    fn create_panel(&mut self, registry: &mut PkgRegistry)
        -> Result<&mut SmartView, TabError>;

    fn panel_mut(&mut self) -> Option<&mut SmartView>;

    /// The package "Save" on this tab would write.
    fn save_package<'r>(&self, registry: &'r PkgRegistry) -> Result<&'r SmartPkg, TabError>;

    /// Unmount the panel and drop it.
    fn teardown(&mut self, surface: &mut dyn Surface);
}

fn apply_mode(view: &mut SmartView, mode: DispMode) {
    match mode {
        DispMode::Edit => {
            view.set_animating(false);
            view.set_interactive(true);
        }
        DispMode::View => {
            view.set_animating(false);
            view.set_interactive(false);
        }
        DispMode::Animate => {
            view.set_interactive(false);
            view.set_animating(true);
        }
    }
}

/// A tab over one scene of a registered package.
pub struct SceneTab {
    tab_id: String,
    name: String,
    pkg_name: String,
    scene_id: CompId,
    mode: DispMode,
    panel: Option<SmartView>,
}

impl SceneTab {
    /// Validates the target up front so a tab never opens over a dangling
    /// reference.
    pub fn new(
        pkg_name: impl Into<String>,
        scene_id: CompId,
        registry: &PkgRegistry,
    ) -> Result<Self, TabError> {
        let pkg_name = pkg_name.into();
        let pkg = registry
            .get_package(&pkg_name)
            .ok_or_else(|| TabError::UnknownPackage(pkg_name.clone()))?;
        let scene = pkg.scene(scene_id).ok_or_else(|| TabError::UnknownScene {
            pkg_name: pkg_name.clone(),
            scene_id,
        })?;
        Ok(Self {
            tab_id: format!("{pkg_name}/{scene_id}"),
            name: scene.name().to_string(),
            pkg_name,
            scene_id,
            mode: DispMode::default(),
            panel: None,
        })
    }

    pub fn pkg_name(&self) -> &str {
        &self.pkg_name
    }

    pub fn scene_id(&self) -> CompId {
        self.scene_id
    }
}

impl TabController for SceneTab {
    fn tab_id(&self) -> &str {
        &self.tab_id
    }

    fn tab_name(&self) -> &str {
        &self.name
    }

    fn disp_mode(&self) -> DispMode {
        self.mode
    }

    fn set_disp_mode(&mut self, mode: DispMode) -> bool {
        self.mode = mode;
        if let Some(view) = &mut self.panel {
            apply_mode(view, mode);
        }
        true
    }

    fn is_editable(&self) -> bool {
        true
    }

    fn create_panel(
        &mut self,
        _registry: &mut PkgRegistry,
    ) -> Result<&mut SmartView, TabError> {
        let created = self.panel.is_none();
        let view = self.panel.get_or_insert_with(|| {
            SmartView::scene_view(self.name.clone(), self.pkg_name.clone(), self.scene_id)
        });
        if created {
            apply_mode(view, self.mode);
        }
        Ok(view)
    }

    fn panel_mut(&mut self) -> Option<&mut SmartView> {
        self.panel.as_mut()
    }

    fn save_package<'r>(&self, registry: &'r PkgRegistry) -> Result<&'r SmartPkg, TabError> {
        registry
            .get_package(&self.pkg_name)
            .ok_or_else(|| TabError::UnknownPackage(self.pkg_name.clone()))
    }

    fn teardown(&mut self, surface: &mut dyn Surface) {
        if let Some(mut view) = self.panel.take() {
            view.unmount(surface);
        }
    }
}

/// A tab inspecting one registered component class through its demo
/// instance. The instance is private to the tab; nothing it shows is
/// package data, so saving from here is unsupported.
pub struct ClassTab {
    tab_id: String,
    class: ClassRef,
    mode: DispMode,
    panel: Option<SmartView>,
}

impl ClassTab {
    pub fn new(class: ClassRef, registry: &PkgRegistry) -> Result<Self, TabError> {
        if registry.resolve_class(&class).is_none() {
            return Err(TabError::UnknownClass(class));
        }
        Ok(Self {
            tab_id: class.to_string(),
            class,
            mode: DispMode::default(),
            panel: None,
        })
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }
}

impl TabController for ClassTab {
    fn tab_id(&self) -> &str {
        &self.tab_id
    }

    fn tab_name(&self) -> &str {
        &self.class.class_name
    }

    fn disp_mode(&self) -> DispMode {
        self.mode
    }

    fn set_disp_mode(&mut self, mode: DispMode) -> bool {
        if mode == DispMode::Edit {
            log::warn!("class tab '{}' refuses edit mode", self.tab_id);
            return false;
        }
        self.mode = mode;
        if let Some(view) = &mut self.panel {
            apply_mode(view, mode);
        }
        true
    }

    fn is_editable(&self) -> bool {
        false
    }

    fn create_panel(
        &mut self,
        registry: &mut PkgRegistry,
    ) -> Result<&mut SmartView, TabError> {
        if self.panel.is_none() {
            let class = registry
                .resolve_class(&self.class)
                .ok_or_else(|| TabError::UnknownClass(self.class.clone()))?;
            let demo = (class.demo)();
            let mut view = SmartView::comp_view(self.class.class_name.clone(), demo);
            apply_mode(&mut view, self.mode);
            self.panel = Some(view);
        }
        self.panel
            .as_mut()
            .ok_or_else(|| TabError::UnknownClass(self.class.clone()))
    }

    fn panel_mut(&mut self) -> Option<&mut SmartView> {
        self.panel.as_mut()
    }

    fn save_package<'r>(&self, registry: &'r PkgRegistry) -> Result<&'r SmartPkg, TabError> {
        // The owning package is resolved through the class reference; it is
        // a class library, so it holds code, not savable instance data.
        let pkg = registry
            .get_package(&self.class.pkg_name)
            .ok_or_else(|| TabError::UnknownPackage(self.class.pkg_name.clone()))?;
        Err(TabError::Persist(PersistError::Unsupported(
            pkg.name.clone(),
        )))
    }

    fn teardown(&mut self, surface: &mut dyn Surface) {
        if let Some(mut view) = self.panel.take() {
            view.unmount(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comps::Valve;
    use crate::persist::snapshot;
    use crate::pkg::{std_classes, STD_PKG};
    use crate::render::MemorySurface;
    use crate::scene::{Scene, SceneNode};
    use kurbo::Point;
    use uuid::Uuid;

    fn registry_with_scene() -> (PkgRegistry, CompId) {
        let mut scene = Scene::new("plant");
        scene.add_child(SceneNode::Comp(Box::new(Valve::new(
            "inlet",
            Point::new(10.0, 10.0),
        ))));
        let scene_id = scene.id();
        let mut registry = PkgRegistry::new();
        registry.register(SmartPkg::scenes_pkg("acme.plant", "1.0.0", vec![scene]));
        registry.register(std_classes());
        (registry, scene_id)
    }

    #[test]
    fn test_new_tab_defaults_to_view_mode() {
        let (registry, scene_id) = registry_with_scene();
        let tab = SceneTab::new("acme.plant", scene_id, &registry).unwrap();
        assert_eq!(tab.disp_mode(), DispMode::View);
        assert!(tab.is_editable());
    }

    #[test]
    fn test_tab_refuses_dangling_target() {
        let (registry, scene_id) = registry_with_scene();
        assert!(matches!(
            SceneTab::new("unknown", scene_id, &registry),
            Err(TabError::UnknownPackage(_))
        ));
        assert!(matches!(
            SceneTab::new("acme.plant", Uuid::new_v4(), &registry),
            Err(TabError::UnknownScene { .. })
        ));
    }

    #[test]
    fn test_create_panel_is_lazy_and_single() {
        let (mut registry, scene_id) = registry_with_scene();
        let mut tab = SceneTab::new("acme.plant", scene_id, &registry).unwrap();
        assert!(tab.panel_mut().is_none());

        let first = tab.create_panel(&mut registry).unwrap().id();
        assert!(!tab.panel_mut().unwrap().is_mounted(), "creation renders nothing");
        let second = tab.create_panel(&mut registry).unwrap().id();
        assert_eq!(first, second, "repeat requests return the same panel");
    }

    #[test]
    fn test_mode_applies_to_panel_created_later() {
        let (mut registry, scene_id) = registry_with_scene();
        let mut tab = SceneTab::new("acme.plant", scene_id, &registry).unwrap();

        assert!(tab.set_disp_mode(DispMode::Edit));
        let panel = tab.create_panel(&mut registry).unwrap();
        assert!(panel.is_interactive());
        assert!(!panel.is_animating());
    }

    #[test]
    fn test_edit_flips_affordances_on_existing_panel() {
        let (mut registry, scene_id) = registry_with_scene();
        let mut tab = SceneTab::new("acme.plant", scene_id, &registry).unwrap();
        let mut surface = MemorySurface::new();
        tab.create_panel(&mut registry)
            .unwrap()
            .mount(&mut surface, &registry)
            .unwrap();

        tab.set_disp_mode(DispMode::Edit);
        assert!(tab.panel_mut().unwrap().is_interactive());

        tab.set_disp_mode(DispMode::View);
        assert!(!tab.panel_mut().unwrap().is_interactive());
    }

    #[test]
    fn test_mode_changes_never_write_persisted_flag() {
        let mut scene = Scene::new("plant");
        scene.set_draggable(true);
        let scene_id = scene.id();
        let mut registry = PkgRegistry::new();
        registry.register(SmartPkg::scenes_pkg("acme.plant", "1.0.0", vec![scene]));
        let before = registry.get_package("acme.plant").unwrap().fingerprint();

        let mut tab = SceneTab::new("acme.plant", scene_id, &registry).unwrap();
        let mut surface = MemorySurface::new();
        tab.create_panel(&mut registry)
            .unwrap()
            .mount(&mut surface, &registry)
            .unwrap();
        tab.set_disp_mode(DispMode::Edit);
        tab.set_disp_mode(DispMode::View);

        // The persisted flag is design-time data; mode excursions leave it
        // and the fingerprint alone.
        assert!(registry.scene("acme.plant", scene_id).unwrap().draggable());
        let after = registry.get_package("acme.plant").unwrap().fingerprint();
        assert_eq!(before, after);
    }

    #[test]
    fn test_animate_round_trip_leaves_model_untouched() {
        let (mut registry, scene_id) = registry_with_scene();
        let mut tab = SceneTab::new("acme.plant", scene_id, &registry).unwrap();
        let mut surface = MemorySurface::new();
        tab.create_panel(&mut registry)
            .unwrap()
            .mount(&mut surface, &registry)
            .unwrap();

        let before = registry.get_package("acme.plant").unwrap().fingerprint();
        let doc_before = snapshot(registry.get_package("acme.plant").unwrap())
            .unwrap()
            .to_json()
            .unwrap();

        tab.set_disp_mode(DispMode::Animate);
        assert!(tab.panel_mut().unwrap().is_animating());
        assert!(!tab.panel_mut().unwrap().is_interactive());
        tab.panel_mut().unwrap().advance(1.0, &mut surface);
        tab.panel_mut().unwrap().advance(1.0, &mut surface);
        tab.set_disp_mode(DispMode::View);
        assert!(!tab.panel_mut().unwrap().is_animating());

        // Nothing the excursion did is visible to persistence.
        let after = registry.get_package("acme.plant").unwrap().fingerprint();
        let doc_after = snapshot(registry.get_package("acme.plant").unwrap())
            .unwrap()
            .to_json()
            .unwrap();
        assert_eq!(before, after);
        assert_eq!(doc_before, doc_after);
    }

    #[test]
    fn test_scene_tab_save_package() {
        let (registry, scene_id) = registry_with_scene();
        let tab = SceneTab::new("acme.plant", scene_id, &registry).unwrap();
        let pkg = tab.save_package(&registry).unwrap();
        assert_eq!(pkg.name, "acme.plant");
    }

    #[test]
    fn test_class_tab_panel_is_demo_instance() {
        let (mut registry, _) = registry_with_scene();
        let class = ClassRef::new(STD_PKG, Valve::CLASS);
        let mut tab = ClassTab::new(class, &registry).unwrap();
        assert!(!tab.is_editable());

        let panel = tab.create_panel(&mut registry).unwrap();
        assert_eq!(panel.name, Valve::CLASS);
    }

    #[test]
    fn test_class_tab_refuses_edit_and_save() {
        let (registry, _) = registry_with_scene();
        let class = ClassRef::new(STD_PKG, Valve::CLASS);
        let mut tab = ClassTab::new(class, &registry).unwrap();

        assert!(!tab.set_disp_mode(DispMode::Edit));
        assert_eq!(tab.disp_mode(), DispMode::View);
        assert!(tab.set_disp_mode(DispMode::Animate));

        assert!(matches!(
            tab.save_package(&registry),
            Err(TabError::Persist(PersistError::Unsupported(_)))
        ));
    }

    #[test]
    fn test_class_tab_save_with_unregistered_package() {
        let (mut registry, _) = registry_with_scene();
        let class = ClassRef::new(STD_PKG, Valve::CLASS);
        let tab = ClassTab::new(class, &registry).unwrap();

        registry.unregister(STD_PKG);
        assert!(matches!(
            tab.save_package(&registry),
            Err(TabError::UnknownPackage(_))
        ));
    }

    #[test]
    fn test_class_tab_unknown_class() {
        let (registry, _) = registry_with_scene();
        let class = ClassRef::new(STD_PKG, "Reactor");
        assert!(matches!(
            ClassTab::new(class, &registry),
            Err(TabError::UnknownClass(_))
        ));
    }

    #[test]
    fn test_teardown_unmounts_panel() {
        let (mut registry, scene_id) = registry_with_scene();
        let mut tab = SceneTab::new("acme.plant", scene_id, &registry).unwrap();
        let mut surface = MemorySurface::new();
        tab.create_panel(&mut registry)
            .unwrap()
            .mount(&mut surface, &registry)
            .unwrap();

        tab.teardown(&mut surface);
        assert_eq!(surface.cleared, 1);
        assert!(tab.panel_mut().is_none());
    }
}
