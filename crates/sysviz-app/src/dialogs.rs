//! Locator selection: how the session asks "which file?".
//!
//! A `None` answer means the user dismissed the dialog; callers treat that
//! as a clean no-op, not an error.

use std::sync::Mutex;
use sysviz_core::FilePkgStore;

/// Asks the user for a package locator.
pub trait LocatorPicker {
    /// Pick an existing package to open. `None` on cancel.
    fn pick_open(&self) -> Option<String>;

    /// Pick a destination for a save. `None` on cancel.
    fn pick_save(&self, suggested_name: &str) -> Option<String>;
}

/// Native file dialogs via rfd.
#[derive(Debug, Default)]
pub struct FileDialogPicker;

impl FileDialogPicker {
    pub fn new() -> Self {
        Self
    }
}

impl LocatorPicker for FileDialogPicker {
    fn pick_open(&self) -> Option<String> {
        rfd::FileDialog::new()
            .add_filter("SysViz Package", &["json"])
            .set_directory(FilePkgStore::default_dir())
            .pick_file()
            .map(|path| path.to_string_lossy().to_string())
    }

    fn pick_save(&self, suggested_name: &str) -> Option<String> {
        rfd::FileDialog::new()
            .add_filter("SysViz Package", &["json"])
            .set_directory(FilePkgStore::default_dir())
            .set_file_name(format!("{suggested_name}.json"))
            .save_file()
            .map(|path| path.to_string_lossy().to_string())
    }
}

/// Scripted picker for headless runs and tests. Answers are consumed in
/// order; an exhausted queue answers `None` (cancel).
#[derive(Debug, Default)]
pub struct FixedPicker {
    answers: Mutex<Vec<Option<String>>>,
}

impl FixedPicker {
    pub fn new(answers: Vec<Option<String>>) -> Self {
        let mut answers = answers;
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
        }
    }

    /// A picker that always cancels.
    pub fn cancelling() -> Self {
        Self::default()
    }

    fn next(&self) -> Option<String> {
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop())
            .flatten()
    }
}

impl LocatorPicker for FixedPicker {
    fn pick_open(&self) -> Option<String> {
        self.next()
    }

    fn pick_save(&self, _suggested_name: &str) -> Option<String> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_picker_consumes_in_order() {
        let picker = FixedPicker::new(vec![
            Some("first.json".to_string()),
            None,
            Some("third.json".to_string()),
        ]);
        assert_eq!(picker.pick_open(), Some("first.json".to_string()));
        assert_eq!(picker.pick_save("x"), None);
        assert_eq!(picker.pick_open(), Some("third.json".to_string()));
        assert_eq!(picker.pick_open(), None, "exhausted queue cancels");
    }
}
