//! Views: the bridge between a model target and a concrete surface.
//!
//! A view manifests its target into a [`DisplayList`] on mount and keeps
//! that list alive until unmount. Pointer input mutates the model first and
//! nudges the already-manifested primitives in place; nothing remanifests
//! during a drag.

use crate::comps::{CompId, SmartComp};
use crate::registry::PkgRegistry;
use crate::render::{DisplayList, Surface};
use kurbo::Point;
use thiserror::Error;
use uuid::Uuid;

/// View errors.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("scene {scene_id} not found in package '{pkg_name}'")]
    UnknownScene { pkg_name: String, scene_id: CompId },
}

/// What a view renders.
///
/// Scene targets are addressed by `(package name, scene id)` and resolved
/// through the registry on every access, so all views over one scene share
/// the same live instance. Component targets own a private demo instance.
pub enum ViewTarget {
    Scene { pkg_name: String, scene_id: CompId },
    Comp(Box<dyn SmartComp>),
}

/// In-progress drag. `pending` holds the latest unapplied pointer position;
/// intermediate positions between frames are dropped, the newest wins.
#[derive(Debug)]
struct DragState {
    comp: CompId,
    last: Point,
    pending: Option<Point>,
}

/// A mounted (or mountable) rendering of one target.
pub struct SmartView {
    id: CompId,
    pub name: String,
    target: ViewTarget,
    list: Option<DisplayList>,
    drag: Option<DragState>,
    interactive: bool,
    animating: bool,
}

impl SmartView {
    /// A view over a scene living in a registered package. Construction
    /// renders nothing; rendering waits for [`mount`](Self::mount).
    pub fn scene_view(
        name: impl Into<String>,
        pkg_name: impl Into<String>,
        scene_id: CompId,
    ) -> Self {
        Self::new(
            name,
            ViewTarget::Scene {
                pkg_name: pkg_name.into(),
                scene_id,
            },
        )
    }

    /// A view over a privately owned component instance (class demos).
    pub fn comp_view(name: impl Into<String>, comp: Box<dyn SmartComp>) -> Self {
        Self::new(name, ViewTarget::Comp(comp))
    }

    fn new(name: impl Into<String>, target: ViewTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target,
            list: None,
            drag: None,
            interactive: false,
            animating: false,
        }
    }

    pub fn id(&self) -> CompId {
        self.id
    }

    pub fn target(&self) -> &ViewTarget {
        &self.target
    }

    pub fn is_mounted(&self) -> bool {
        self.list.is_some()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn display_list(&self) -> Option<&DisplayList> {
        self.list.as_ref()
    }

    /// Manifest the target once and present the result.
    pub fn mount(
        &mut self,
        surface: &mut dyn Surface,
        registry: &PkgRegistry,
    ) -> Result<(), ViewError> {
        let mut list = DisplayList::new();
        match &self.target {
            ViewTarget::Scene { pkg_name, scene_id } => {
                let scene =
                    registry
                        .scene(pkg_name, *scene_id)
                        .ok_or_else(|| ViewError::UnknownScene {
                            pkg_name: pkg_name.clone(),
                            scene_id: *scene_id,
                        })?;
                scene.manifest(&mut list);
                // A scene persisted as draggable comes up with live
                // affordances; mode changes can still suspend them later.
                if scene.draggable() {
                    self.interactive = true;
                }
            }
            ViewTarget::Comp(comp) => comp.manifest(&mut list),
        }
        list.set_interactive(self.interactive);
        surface.present(&list);
        log::info!("view '{}' mounted ({} prims)", self.name, list.prim_count());
        self.list = Some(list);
        Ok(())
    }

    /// Remanifest after a structural model change (add/remove/reorder).
    /// Positional drags never come through here.
    pub fn refresh(
        &mut self,
        surface: &mut dyn Surface,
        registry: &PkgRegistry,
    ) -> Result<(), ViewError> {
        if self.list.is_some() {
            self.drag = None;
            self.mount(surface, registry)?;
        }
        Ok(())
    }

    /// Begin a drag if an interactive primitive sits under the pointer.
    /// Returns whether a drag started.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        let Some(list) = &self.list else {
            return false;
        };
        if !self.interactive {
            return false;
        }
        match list.hit_test(point) {
            Some(hit) if hit.draggable => {
                self.drag = Some(DragState {
                    comp: hit.comp,
                    last: point,
                    pending: None,
                });
                true
            }
            _ => false,
        }
    }

    /// Record a pointer position during a drag. Positions pile up as a
    /// single pending value; [`flush_drag`](Self::flush_drag) applies the
    /// newest one and discards the rest.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        match &mut self.drag {
            Some(drag) => {
                drag.pending = Some(point);
                true
            }
            None => false,
        }
    }

    /// Apply the pending drag position: move the model component, nudge its
    /// manifested primitives, present. One mutation per frame regardless of
    /// how many pointer events arrived.
    pub fn flush_drag(&mut self, surface: &mut dyn Surface, registry: &mut PkgRegistry) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        let Some(point) = drag.pending.take() else {
            return;
        };
        let delta = point - drag.last;
        drag.last = point;
        let comp_id = drag.comp;

        let moved = match &mut self.target {
            ViewTarget::Scene { pkg_name, scene_id } => registry
                .scene_mut(pkg_name, *scene_id)
                .and_then(|scene| scene.comp_mut(comp_id))
                .map(|comp| {
                    let position = comp.position();
                    comp.set_position(position + delta);
                })
                .is_some(),
            // A component view manifests exactly one instance, so any hit
            // belongs to it.
            ViewTarget::Comp(comp) => {
                let position = comp.position();
                comp.set_position(position + delta);
                true
            }
        };

        if moved {
            if let Some(list) = &mut self.list {
                list.translate_comp(comp_id, delta);
                surface.present(list);
            }
        } else {
            log::warn!("drag target {comp_id} vanished, cancelling drag");
            self.drag = None;
        }
    }

    /// End the drag, applying any still-pending position first.
    pub fn pointer_up(&mut self, surface: &mut dyn Surface, registry: &mut PkgRegistry) {
        self.flush_drag(surface, registry);
        self.drag = None;
    }

    /// Flip the drag affordance on the whole view.
    ///
    /// Runtime-only state: every manifested primitive is flipped in place,
    /// without a rebuild. The scene's persisted `draggable` flag is
    /// design-time data and is never written from here.
    pub fn set_interactive(&mut self, flag: bool) {
        self.interactive = flag;
        if let Some(list) = &mut self.list {
            list.set_interactive(flag);
        }
        if !flag {
            self.drag = None;
        }
    }

    /// Enable or disable animation. Purely runtime state.
    pub fn set_animating(&mut self, flag: bool) {
        self.animating = flag;
    }

    /// Advance the animation clock and re-present. No-op unless animating.
    pub fn advance(&mut self, dt: f64, surface: &mut dyn Surface) {
        if !self.animating {
            return;
        }
        if let Some(list) = &mut self.list {
            list.advance(dt);
            surface.present(list);
        }
    }

    /// Tear the view down: clear the surface, drop the manifested list and
    /// any in-progress drag. The model target is untouched.
    pub fn unmount(&mut self, surface: &mut dyn Surface) {
        if self.list.take().is_some() {
            surface.clear();
            log::info!("view '{}' unmounted", self.name);
        }
        self.drag = None;
    }
}
