//! Surface implementation for the headless shell.

use sysviz_core::{DisplayList, Surface};

/// Reports display-list activity to the log instead of drawing. Stands in
/// until a real canvas backend is wired up.
#[derive(Debug, Default)]
pub struct LogSurface {
    frames: u64,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for LogSurface {
    fn present(&mut self, list: &DisplayList) {
        self.frames += 1;
        log::debug!(
            "frame {}: {} primitive(s), clock {:.3}",
            self.frames,
            list.prim_count(),
            list.clock()
        );
    }

    fn clear(&mut self) {
        log::debug!("surface cleared");
    }
}
