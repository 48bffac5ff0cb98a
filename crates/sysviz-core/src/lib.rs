//! SysViz Core Library
//!
//! Platform-agnostic object model for the SysViz diagram editor: components,
//! scenes, packages, views, tabs, and package persistence.

pub mod comps;
pub mod persist;
pub mod pkg;
pub mod registry;
pub mod render;
pub mod scene;
pub mod tab;
pub mod view;

pub use comps::{ClassRef, CompDef, CompId, Identifiable, SmartComp, UnresolvedComp};
pub use persist::{
    link, snapshot, FilePkgStore, LinkedPkg, MemoryPkgStore, PersistError, PkgDocument, PkgStore,
};
pub use pkg::{std_classes, CompClass, PkgEntries, SmartPkg, STD_PKG};
pub use registry::PkgRegistry;
pub use render::{Container, DisplayList, DisplayNode, MemorySurface, Primitive, Surface};
pub use scene::{move_child, Scene, SceneNode};
pub use tab::{ClassTab, DispMode, SceneTab, TabController, TabError};
pub use view::{SmartView, ViewError, ViewTarget};
