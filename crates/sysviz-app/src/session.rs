//! Editor session: registry, open tabs, persistence, and user feedback.
//!
//! Everything here runs on the one UI thread. Storage futures are driven to
//! completion inline with `pollster`, mirroring how the rest of the shell
//! handles its async boundaries.

use crate::dialogs::LocatorPicker;
use kurbo::Point;
use std::collections::{HashMap, HashSet};
use sysviz_core::{
    link, snapshot, std_classes, ClassRef, ClassTab, CompId, DispMode, PkgRegistry, PkgStore,
    SceneTab, SmartPkg, Surface, TabController, TabError,
};

/// User-facing feedback channel. The shell decides how messages are shown;
/// the session only decides what to say.
pub trait Notifier {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Routes notifications to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        log::info!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}

/// The package navigation pane, refreshed whenever the registry changes.
pub trait LeftNav {
    fn refresh(&mut self, registry: &PkgRegistry);
}

/// Navigation stub that only logs.
pub struct LogLeftNav;

impl LeftNav for LogLeftNav {
    fn refresh(&mut self, registry: &PkgRegistry) {
        log::debug!("nav refreshed: {} package(s)", registry.len());
    }
}

/// Ordered collection of open tabs, keyed by tab id.
#[derive(Default)]
pub struct TabManager {
    tabs: Vec<Box<dyn TabController>>,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tab: Box<dyn TabController>) {
        self.tabs.push(tab);
    }

    pub fn contains(&self, tab_id: &str) -> bool {
        self.tabs.iter().any(|tab| tab.tab_id() == tab_id)
    }

    pub fn get(&self, tab_id: &str) -> Option<&dyn TabController> {
        self.tabs
            .iter()
            .find(|tab| tab.tab_id() == tab_id)
            .map(|tab| tab.as_ref())
    }

    pub fn get_mut(&mut self, tab_id: &str) -> Option<&mut dyn TabController> {
        self.tabs
            .iter_mut()
            .find(|tab| tab.tab_id() == tab_id)
            .map(|tab| -> &mut dyn TabController { tab.as_mut() })
    }

    /// Tear the tab down on the surface, then drop it.
    pub fn close(&mut self, tab_id: &str, surface: &mut dyn Surface) -> bool {
        match self.tabs.iter().position(|tab| tab.tab_id() == tab_id) {
            Some(index) => {
                let mut tab = self.tabs.remove(index);
                tab.teardown(surface);
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tabs.iter().map(|tab| tab.tab_id()).collect()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn TabController>> {
        self.tabs.iter_mut()
    }
}

/// One running editor instance.
///
/// Owns the registry, the open tabs, and the storage/dialog/notification
/// boundaries. A dismissed dialog is a clean no-op everywhere; real failures
/// reach the user through the notifier.
pub struct EditorSession<S: Surface> {
    registry: PkgRegistry,
    tabs: TabManager,
    store: Box<dyn PkgStore>,
    picker: Box<dyn LocatorPicker>,
    notifier: Box<dyn Notifier>,
    left_nav: Box<dyn LeftNav>,
    surface: S,
    /// Package name to the locator it was last loaded from or saved to.
    locators: HashMap<String, String>,
    /// Package name to its fingerprint as of the last load or save.
    baselines: HashMap<String, String>,
    /// Locators with a load already underway; repeat requests collapse.
    /// With the blocking executor a load runs to completion before the next
    /// call, so this only arms once loads are driven from an async runtime.
    in_flight: HashSet<String>,
}

impl<S: Surface> EditorSession<S> {
    /// Start a session with the built-in class library registered.
    pub fn new(
        store: Box<dyn PkgStore>,
        picker: Box<dyn LocatorPicker>,
        notifier: Box<dyn Notifier>,
        left_nav: Box<dyn LeftNav>,
        surface: S,
    ) -> Self {
        let mut registry = PkgRegistry::new();
        registry.register(std_classes());
        let mut session = Self {
            registry,
            tabs: TabManager::new(),
            store,
            picker,
            notifier,
            left_nav,
            surface,
            locators: HashMap::new(),
            baselines: HashMap::new(),
            in_flight: HashSet::new(),
        };
        session.left_nav.refresh(&session.registry);
        session
    }

    pub fn registry(&self) -> &PkgRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PkgRegistry {
        &mut self.registry
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Register an in-memory package (new documents, demo content).
    pub fn register_package(&mut self, pkg: SmartPkg) {
        if pkg.is_persistable() {
            self.baselines.insert(pkg.name.clone(), pkg.fingerprint());
        }
        self.registry.register(pkg);
        self.left_nav.refresh(&self.registry);
    }

    /// Ask the user for a package and load it. Returns the registered
    /// package name, or `None` if the user cancelled or the load failed.
    pub fn open_package(&mut self) -> Option<String> {
        let locator = self.picker.pick_open()?;
        self.load_package(&locator)
    }

    /// Load a package from a known locator.
    ///
    /// A load already underway for the same locator absorbs the repeat
    /// request instead of starting a second one.
    pub fn load_package(&mut self, locator: &str) -> Option<String> {
        if !self.in_flight.insert(locator.to_string()) {
            log::info!("load of '{locator}' already underway, ignoring repeat request");
            return None;
        }
        let result = pollster::block_on(self.store.load(locator));
        self.in_flight.remove(locator);

        let doc = match result {
            Ok(doc) => doc,
            Err(e) => {
                self.notifier.error(&format!("could not open package: {e}"));
                return None;
            }
        };

        let linked = link(doc, &self.registry);
        for class in &linked.unresolved {
            self.notifier.info(&format!(
                "class {class} is not available; affected entries are shown as placeholders"
            ));
        }

        let name = linked.pkg.name.clone();
        self.baselines.insert(name.clone(), linked.pkg.fingerprint());
        self.locators.insert(name.clone(), locator.to_string());
        self.registry.register(linked.pkg);
        self.left_nav.refresh(&self.registry);
        log::info!("opened package '{name}' from '{locator}'");
        Some(name)
    }

    /// Open (or focus) a tab over a scene. The panel is created and mounted
    /// here; a second open of the same scene focuses the existing tab.
    pub fn open_scene_tab(
        &mut self,
        pkg_name: &str,
        scene_id: CompId,
    ) -> Result<String, TabError> {
        let tab = SceneTab::new(pkg_name, scene_id, &self.registry)?;
        let tab_id = tab.tab_id().to_string();
        if self.tabs.contains(&tab_id) {
            return Ok(tab_id);
        }
        let mut tab = Box::new(tab);
        let view = tab.create_panel(&mut self.registry)?;
        view.mount(&mut self.surface, &self.registry)?;
        self.tabs.add(tab);
        Ok(tab_id)
    }

    /// Open (or focus) a tab showing a registered class's demo instance.
    pub fn open_class_tab(&mut self, class: ClassRef) -> Result<String, TabError> {
        let tab = ClassTab::new(class, &self.registry)?;
        let tab_id = tab.tab_id().to_string();
        if self.tabs.contains(&tab_id) {
            return Ok(tab_id);
        }
        let mut tab = Box::new(tab);
        let view = tab.create_panel(&mut self.registry)?;
        view.mount(&mut self.surface, &self.registry)?;
        self.tabs.add(tab);
        Ok(tab_id)
    }

    /// Switch a tab's display mode. Returns false if the tab is unknown or
    /// refused the mode.
    pub fn set_tab_mode(&mut self, tab_id: &str, mode: DispMode) -> bool {
        match self.tabs.get_mut(tab_id) {
            Some(tab) => tab.set_disp_mode(mode),
            None => false,
        }
    }

    /// Save the package behind a tab to its known locator, asking for one
    /// the first time.
    pub fn save_tab(&mut self, tab_id: &str) -> bool {
        self.write_package(tab_id, false)
    }

    /// Save the package behind a tab to a freshly chosen locator.
    pub fn save_tab_as(&mut self, tab_id: &str) -> bool {
        self.write_package(tab_id, true)
    }

    fn write_package(&mut self, tab_id: &str, force_pick: bool) -> bool {
        let Some(tab) = self.tabs.get(tab_id) else {
            self.notifier.error(&format!("no such tab: {tab_id}"));
            return false;
        };
        let pkg = match tab.save_package(&self.registry) {
            Ok(pkg) => pkg,
            Err(e) => {
                self.notifier.error(&format!("cannot save: {e}"));
                return false;
            }
        };

        let known = if force_pick {
            None
        } else {
            self.locators.get(&pkg.name).cloned()
        };
        let locator = match known.or_else(|| self.picker.pick_save(&pkg.name)) {
            Some(locator) => locator,
            // Dismissed dialog: clean no-op.
            None => return false,
        };

        let doc = match snapshot(pkg) {
            Ok(doc) => doc,
            Err(e) => {
                self.notifier.error(&format!("cannot save: {e}"));
                return false;
            }
        };
        let name = pkg.name.clone();
        let fingerprint = pkg.fingerprint();

        if let Err(e) = pollster::block_on(self.store.save(&locator, &doc)) {
            self.notifier
                .error(&format!("saving '{name}' failed: {e}"));
            return false;
        }

        self.locators.insert(name.clone(), locator.clone());
        self.baselines.insert(name.clone(), fingerprint);
        self.notifier.info(&format!("saved '{name}' to '{locator}'"));
        true
    }

    /// Whether a package has changed since its last load or save.
    pub fn is_dirty(&self, pkg_name: &str) -> bool {
        let Some(pkg) = self.registry.get_package(pkg_name) else {
            return false;
        };
        match self.baselines.get(pkg_name) {
            Some(baseline) => *baseline != pkg.fingerprint(),
            // Never saved or loaded: dirty as soon as it has content.
            None => pkg.is_persistable(),
        }
    }

    /// Close a tab, warning about unsaved changes. The package itself stays
    /// registered.
    pub fn close_tab(&mut self, tab_id: &str) -> bool {
        if let Some(tab) = self.tabs.get(tab_id) {
            if let Ok(pkg) = tab.save_package(&self.registry) {
                let name = pkg.name.clone();
                if self.is_dirty(&name) {
                    self.notifier
                        .info(&format!("package '{name}' has unsaved changes"));
                }
            }
        }
        self.tabs.close(tab_id, &mut self.surface)
    }

    pub fn pointer_down(&mut self, tab_id: &str, point: Point) -> bool {
        self.tabs
            .get_mut(tab_id)
            .and_then(|tab| tab.panel_mut())
            .map(|view| view.pointer_down(point))
            .unwrap_or(false)
    }

    pub fn pointer_move(&mut self, tab_id: &str, point: Point) -> bool {
        self.tabs
            .get_mut(tab_id)
            .and_then(|tab| tab.panel_mut())
            .map(|view| view.pointer_move(point))
            .unwrap_or(false)
    }

    pub fn pointer_up(&mut self, tab_id: &str) {
        if let Some(view) = self.tabs.get_mut(tab_id).and_then(|tab| tab.panel_mut()) {
            view.pointer_up(&mut self.surface, &mut self.registry);
        }
    }

    /// One frame tick: apply coalesced drags and advance animating panels.
    pub fn frame(&mut self, dt: f64) {
        for tab in self.tabs.iter_mut() {
            if let Some(view) = tab.panel_mut() {
                view.flush_drag(&mut self.surface, &mut self.registry);
                view.advance(dt, &mut self.surface);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::FixedPicker;
    use kurbo::Point;
    use std::sync::{Arc, Mutex};
    use sysviz_core::comps::Valve;
    use sysviz_core::scene::{Scene, SceneNode};
    use sysviz_core::{Identifiable, MemoryPkgStore, MemorySurface, STD_PKG};

    #[derive(Default, Clone)]
    struct RecordingNotifier {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNotifier {
        fn contains(&self, fragment: &str) -> bool {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .any(|m| m.contains(fragment))
        }
    }

    impl Notifier for RecordingNotifier {
        fn info(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }

        fn error(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn sample_pkg() -> (SmartPkg, CompId, CompId) {
        let mut scene = Scene::new("plant");
        let valve = Valve::new("inlet", Point::new(10.0, 10.0));
        let valve_id = valve.id();
        scene.add_child(SceneNode::Comp(Box::new(valve)));
        let scene_id = scene.id();
        (
            SmartPkg::scenes_pkg("acme.plant", "1.0.0", vec![scene]),
            scene_id,
            valve_id,
        )
    }

    fn session_with(
        picker: FixedPicker,
        notifier: RecordingNotifier,
    ) -> EditorSession<MemorySurface> {
        EditorSession::new(
            Box::new(MemoryPkgStore::new()),
            Box::new(picker),
            Box::new(notifier),
            Box::new(LogLeftNav),
            MemorySurface::new(),
        )
    }

    #[test]
    fn test_cancelled_open_is_a_noop() {
        let notifier = RecordingNotifier::default();
        let mut session = session_with(FixedPicker::cancelling(), notifier.clone());

        assert!(session.open_package().is_none());
        // Only the built-in class library is registered.
        assert_eq!(session.registry().len(), 1);
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_open_tab_save_reload_cycle() {
        let store = MemoryPkgStore::new();
        let (pkg, scene_id, _) = sample_pkg();
        let doc = snapshot(&pkg).unwrap();
        pollster::block_on(store.save("mem:plant", &doc)).unwrap();

        let notifier = RecordingNotifier::default();
        let picker = FixedPicker::new(vec![Some("mem:plant".to_string())]);
        let mut session = EditorSession::new(
            Box::new(store),
            Box::new(picker),
            Box::new(notifier.clone()),
            Box::new(LogLeftNav),
            MemorySurface::new(),
        );

        let name = session.open_package().unwrap();
        assert_eq!(name, "acme.plant");
        assert!(!session.is_dirty("acme.plant"));

        let tab_id = session.open_scene_tab("acme.plant", scene_id).unwrap();
        assert_eq!(session.tabs().len(), 1);
        assert_eq!(session.surface().presents, 1);

        // Save goes straight to the known locator, no dialog.
        assert!(session.save_tab(&tab_id));
        assert!(notifier.contains("saved 'acme.plant'"));
    }

    #[test]
    fn test_second_open_focuses_existing_tab() {
        let (pkg, scene_id, _) = sample_pkg();
        let mut session = session_with(FixedPicker::cancelling(), RecordingNotifier::default());
        session.register_package(pkg);

        let first = session.open_scene_tab("acme.plant", scene_id).unwrap();
        let second = session.open_scene_tab("acme.plant", scene_id).unwrap();
        assert_eq!(first, second);
        assert_eq!(session.tabs().len(), 1);
        assert_eq!(session.surface().presents, 1, "no second mount");
    }

    #[test]
    fn test_drag_marks_dirty_and_save_clears_it() {
        let (pkg, scene_id, _) = sample_pkg();
        let notifier = RecordingNotifier::default();
        let picker = FixedPicker::new(vec![Some("mem:plant".to_string())]);
        let mut session = session_with(picker, notifier);
        session.register_package(pkg);

        let tab_id = session.open_scene_tab("acme.plant", scene_id).unwrap();
        session.set_tab_mode(&tab_id, DispMode::Edit);
        assert!(!session.is_dirty("acme.plant"));

        assert!(session.pointer_down(&tab_id, Point::new(10.0, 10.0)));
        session.pointer_move(&tab_id, Point::new(40.0, 40.0));
        session.frame(0.0);
        session.pointer_up(&tab_id);
        assert!(session.is_dirty("acme.plant"));

        assert!(session.save_tab(&tab_id));
        assert!(!session.is_dirty("acme.plant"));
    }

    #[test]
    fn test_mode_switches_on_draggable_scene_stay_clean() {
        let mut scene = Scene::new("plant");
        scene.set_draggable(true);
        scene.add_child(SceneNode::Comp(Box::new(Valve::new(
            "inlet",
            Point::new(10.0, 10.0),
        ))));
        let scene_id = scene.id();
        let pkg = SmartPkg::scenes_pkg("acme.plant", "1.0.0", vec![scene]);

        let notifier = RecordingNotifier::default();
        let mut session = session_with(FixedPicker::cancelling(), notifier);
        session.register_package(pkg);

        // Viewing and mode-flipping a scene that was authored draggable must
        // not count as an edit.
        let tab_id = session.open_scene_tab("acme.plant", scene_id).unwrap();
        assert!(!session.is_dirty("acme.plant"));
        session.set_tab_mode(&tab_id, DispMode::Edit);
        session.set_tab_mode(&tab_id, DispMode::View);
        assert!(!session.is_dirty("acme.plant"));
        assert!(session
            .registry()
            .scene("acme.plant", scene_id)
            .unwrap()
            .draggable());
    }

    #[test]
    fn test_cancelled_save_leaves_package_dirty() {
        let (pkg, scene_id, _) = sample_pkg();
        let notifier = RecordingNotifier::default();
        let mut session = session_with(FixedPicker::cancelling(), notifier.clone());
        session.register_package(pkg);

        let tab_id = session.open_scene_tab("acme.plant", scene_id).unwrap();
        session.set_tab_mode(&tab_id, DispMode::Edit);
        session.pointer_down(&tab_id, Point::new(10.0, 10.0));
        session.pointer_move(&tab_id, Point::new(40.0, 40.0));
        session.pointer_up(&tab_id);

        assert!(!session.save_tab(&tab_id), "dismissed dialog saves nothing");
        assert!(session.is_dirty("acme.plant"));
        assert!(!notifier.contains("saved"));
    }

    #[test]
    fn test_class_tab_save_is_reported_unsupported() {
        let notifier = RecordingNotifier::default();
        let mut session = session_with(FixedPicker::cancelling(), notifier.clone());

        let tab_id = session
            .open_class_tab(ClassRef::new(STD_PKG, Valve::CLASS))
            .unwrap();
        assert!(!session.save_tab(&tab_id));
        assert!(notifier.contains("cannot save"));
    }

    #[test]
    fn test_unresolved_classes_are_notified_not_fatal() {
        let store = MemoryPkgStore::new();
        let (pkg, _, _) = sample_pkg();
        let mut doc = snapshot(&pkg).unwrap();
        // Point the only component at a class nobody registered.
        if let sysviz_core::persist::PkgBody::Scenes { scenes } = &mut doc.body {
            if let sysviz_core::persist::ChildDef::Comp(def) = &mut scenes[0].children[0] {
                def.class = ClassRef::new("vendor.pkg", "Widget");
            }
        }
        pollster::block_on(store.save("mem:plant", &doc)).unwrap();

        let notifier = RecordingNotifier::default();
        let mut session = EditorSession::new(
            Box::new(store),
            Box::new(FixedPicker::cancelling()),
            Box::new(notifier.clone()),
            Box::new(LogLeftNav),
            MemorySurface::new(),
        );

        let name = session.load_package("mem:plant").unwrap();
        assert_eq!(name, "acme.plant");
        assert!(notifier.contains("vendor.pkg/Widget"));
        assert_eq!(
            session.registry().get_package("acme.plant").unwrap().scenes()[0].len(),
            1
        );
    }

    #[test]
    fn test_close_tab_warns_when_dirty() {
        let (pkg, scene_id, _) = sample_pkg();
        let notifier = RecordingNotifier::default();
        let mut session = session_with(FixedPicker::cancelling(), notifier.clone());
        session.register_package(pkg);

        let tab_id = session.open_scene_tab("acme.plant", scene_id).unwrap();
        session.set_tab_mode(&tab_id, DispMode::Edit);
        session.pointer_down(&tab_id, Point::new(10.0, 10.0));
        session.pointer_move(&tab_id, Point::new(50.0, 10.0));
        session.pointer_up(&tab_id);

        assert!(session.close_tab(&tab_id));
        assert!(notifier.contains("unsaved changes"));
        assert_eq!(session.surface().cleared, 1);
        assert!(session.tabs().is_empty());
        // The model is still registered and still dirty.
        assert!(session.is_dirty("acme.plant"));
    }

    #[test]
    fn test_animate_frames_do_not_dirty_the_package() {
        let (pkg, scene_id, _) = sample_pkg();
        let mut session = session_with(FixedPicker::cancelling(), RecordingNotifier::default());
        session.register_package(pkg);

        let tab_id = session.open_scene_tab("acme.plant", scene_id).unwrap();
        assert!(session.set_tab_mode(&tab_id, DispMode::Animate));
        session.frame(0.016);
        session.frame(0.016);
        assert!(session.set_tab_mode(&tab_id, DispMode::View));

        assert!(!session.is_dirty("acme.plant"));
    }
}
