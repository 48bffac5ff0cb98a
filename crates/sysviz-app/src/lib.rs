//! SysViz application shell (native).
//!
//! Wires the core object model to file storage, file dialogs, and logging.

pub mod dialogs;
pub mod session;
pub mod surface;

pub use dialogs::{FileDialogPicker, FixedPicker, LocatorPicker};
pub use session::{EditorSession, LeftNav, LogLeftNav, LogNotifier, Notifier, TabManager};
pub use surface::LogSurface;
