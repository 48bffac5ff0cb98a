//! Persistence boundary for packages.
//!
//! Converts a package graph to and from a storable JSON document and
//! resolves referenced classes through the registry during load. Class
//! references travel as `(package name, class name)` tags; unresolved
//! references are recoverable per-entry data, never load-aborting errors.

mod file;
mod memory;

pub use file::FilePkgStore;
pub use memory::MemoryPkgStore;

use crate::comps::{ClassRef, CompDef, CompId, Identifiable, SmartComp, UnresolvedComp};
use crate::pkg::{CompClass, SmartPkg};
use crate::registry::PkgRegistry;
use crate::scene::{Scene, SceneNode};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Current package document format version.
pub const PKG_FORMAT: u32 = 1;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("package not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("package '{0}' holds class definitions, not persistable instance data")]
    Unsupported(String),
}

/// Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Boxed future for async storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Serialized scene definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    pub id: CompId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub draggable: bool,
    pub children: Vec<ChildDef>,
}

/// One serialized child entry: a component instance or a nested scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChildDef {
    Comp(CompDef),
    Scene(SceneDef),
}

/// Document body: scene definitions or a class manifest, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PkgBody {
    Scenes { scenes: Vec<SceneDef> },
    Classes { classes: Vec<String> },
}

/// The storable form of a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkgDocument {
    pub format: u32,
    pub name: String,
    pub version: String,
    pub body: PkgBody,
}

impl PkgDocument {
    pub fn to_json(&self) -> PersistResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PersistError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> PersistResult<Self> {
        serde_json::from_str(json).map_err(|e| PersistError::Serialization(e.to_string()))
    }
}

/// Snapshot a package into its storable form.
///
/// Class-library packages are refused outright: Save of a class library is
/// unsupported and must not produce a partial write.
pub fn snapshot(pkg: &SmartPkg) -> PersistResult<PkgDocument> {
    if pkg.is_class_library() {
        return Err(PersistError::Unsupported(pkg.name.clone()));
    }
    let scenes = pkg
        .scenes()
        .iter()
        .map(scene_def)
        .collect::<PersistResult<Vec<_>>>()?;
    Ok(PkgDocument {
        format: PKG_FORMAT,
        name: pkg.name.clone(),
        version: pkg.version.clone(),
        body: PkgBody::Scenes { scenes },
    })
}

fn scene_def(scene: &Scene) -> PersistResult<SceneDef> {
    let children = scene
        .children()
        .iter()
        .map(|child| match child {
            SceneNode::Comp(comp) => Ok(ChildDef::Comp(comp_def(comp.as_ref())?)),
            SceneNode::Scene(nested) => Ok(ChildDef::Scene(scene_def(nested)?)),
        })
        .collect::<PersistResult<Vec<_>>>()?;
    Ok(SceneDef {
        id: scene.id(),
        name: scene.name().to_string(),
        x: scene.transform.x,
        y: scene.transform.y,
        draggable: scene.draggable(),
        children,
    })
}

fn comp_def(comp: &dyn SmartComp) -> PersistResult<CompDef> {
    let params = comp
        .visual_params()
        .map_err(|e| PersistError::Serialization(e.to_string()))?;
    let position = comp.position();
    Ok(CompDef {
        id: comp.id(),
        name: comp.name().to_string(),
        class: comp.class_ref(),
        x: position.x,
        y: position.y,
        params,
    })
}

/// A loaded package plus the class references that failed to resolve.
#[derive(Debug)]
pub struct LinkedPkg {
    pub pkg: SmartPkg,
    pub unresolved: Vec<ClassRef>,
}

/// Link a parsed document into a live package, resolving every class
/// reference through the registry.
///
/// Unresolved references become placeholder components preserving their
/// definitions; the load continues for every sibling entry.
pub fn link(doc: PkgDocument, registry: &PkgRegistry) -> LinkedPkg {
    let mut unresolved = Vec::new();
    let pkg = match doc.body {
        PkgBody::Scenes { scenes } => {
            let scenes = scenes
                .into_iter()
                .map(|def| link_scene(def, registry, &mut unresolved))
                .collect();
            SmartPkg::scenes_pkg(doc.name, doc.version, scenes)
        }
        PkgBody::Classes { classes } => {
            let mut resolved: BTreeMap<String, CompClass> = BTreeMap::new();
            for class_name in classes {
                let class = ClassRef::new(doc.name.clone(), class_name.clone());
                match registry.resolve_class(&class) {
                    Some(def) => {
                        resolved.insert(class_name, *def);
                    }
                    None => unresolved.push(class),
                }
            }
            SmartPkg::class_pkg(doc.name, doc.version, resolved)
        }
    };
    if !unresolved.is_empty() {
        log::warn!(
            "package '{}' loaded with {} unresolved class reference(s)",
            pkg.name,
            unresolved.len()
        );
    }
    LinkedPkg { pkg, unresolved }
}

fn link_scene(def: SceneDef, registry: &PkgRegistry, unresolved: &mut Vec<ClassRef>) -> Scene {
    let children = def
        .children
        .into_iter()
        .map(|child| match child {
            ChildDef::Comp(comp_def) => {
                SceneNode::Comp(link_comp(comp_def, registry, unresolved))
            }
            ChildDef::Scene(scene_def) => {
                SceneNode::Scene(Box::new(link_scene(scene_def, registry, unresolved)))
            }
        })
        .collect();
    Scene::restore(
        def.id,
        def.name,
        Vec2::new(def.x, def.y),
        def.draggable,
        children,
    )
}

fn link_comp(
    def: CompDef,
    registry: &PkgRegistry,
    unresolved: &mut Vec<ClassRef>,
) -> Box<dyn SmartComp> {
    match registry.resolve_class(&def.class) {
        Some(class) => match (class.ctor)(&def) {
            Ok(comp) => comp,
            Err(e) => {
                // Corrupt params are recoverable the same way a missing
                // class is: keep the entry, flag it.
                log::warn!("failed to reconstruct '{}' ({}): {}", def.name, def.class, e);
                unresolved.push(def.class.clone());
                Box::new(UnresolvedComp::new(def))
            }
        },
        None => {
            unresolved.push(def.class.clone());
            Box::new(UnresolvedComp::new(def))
        }
    }
}

/// Trait for package storage backends.
///
/// A locator is an opaque resource key; for file storage it is a filesystem
/// path. Implementations are single-shot: each future resolves with a value
/// or fails with a reported error.
pub trait PkgStore: Send + Sync {
    /// Save a document to the given locator.
    fn save<'a>(&'a self, locator: &str, doc: &PkgDocument) -> BoxFuture<'a, PersistResult<()>>;

    /// Load the document at the given locator.
    fn load<'a>(&'a self, locator: &str) -> BoxFuture<'a, PersistResult<PkgDocument>>;

    /// Check whether a document exists at the given locator.
    fn exists<'a>(&'a self, locator: &str) -> BoxFuture<'a, PersistResult<bool>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
