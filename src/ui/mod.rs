//! UI layer: view models for timeline lines, file attachments and the
//! message composer.

pub mod autocomplete;
pub mod composer;
pub mod contracts;
pub mod file_body;
pub mod size;
pub mod timeline;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
