//! Domain layer: core entities and business rules.

pub mod actions;
pub mod composer_input;
pub mod credentials;
pub mod events;
pub mod file_content;
pub mod message;
pub mod room;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
