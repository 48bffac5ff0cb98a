//! Main application entry point (native).

use kurbo::{Point, Vec2};
use sysviz_app::{EditorSession, FileDialogPicker, LogLeftNav, LogNotifier, LogSurface};
use sysviz_core::comps::{Gauge, Pipe, Tank, Valve};
use sysviz_core::scene::{Scene, SceneNode};
use sysviz_core::{DispMode, FilePkgStore, Identifiable, SmartPkg};

fn main() {
    env_logger::init();
    log::info!("Starting SysViz");

    let mut session = EditorSession::new(
        Box::new(FilePkgStore::new()),
        Box::new(FileDialogPicker::new()),
        Box::new(LogNotifier),
        Box::new(LogLeftNav),
        LogSurface::new(),
    );

    let pkg = demo_pkg();
    let pkg_name = pkg.name.clone();
    let scene_id = pkg.scenes()[0].id();
    session.register_package(pkg);

    let tab_id = match session.open_scene_tab(&pkg_name, scene_id) {
        Ok(tab_id) => tab_id,
        Err(e) => {
            log::error!("could not open demo scene: {e}");
            return;
        }
    };
    session.set_tab_mode(&tab_id, DispMode::Edit);
    log::info!("demo scene open in tab '{tab_id}'; saving a copy");

    // Asks for a destination; a dismissed dialog just skips the save.
    session.save_tab(&tab_id);
    session.close_tab(&tab_id);
}

fn demo_pkg() -> SmartPkg {
    let mut scene = Scene::new("pump-house");
    scene.add_child(SceneNode::Comp(Box::new(Valve::new(
        "inlet",
        Point::new(40.0, 120.0),
    ))));
    scene.add_child(SceneNode::Comp(Box::new(Pipe::with_run(
        "feed",
        Point::new(60.0, 120.0),
        vec![Vec2::new(120.0, 0.0)],
    ))));
    scene.add_child(SceneNode::Comp(Box::new(Tank::new(
        "buffer",
        Point::new(180.0, 60.0),
    ))));
    scene.add_child(SceneNode::Comp(Box::new(Gauge::new(
        "pressure",
        Point::new(320.0, 80.0),
    ))));
    SmartPkg::scenes_pkg("demo.plant", env!("CARGO_PKG_VERSION"), vec![scene])
}
