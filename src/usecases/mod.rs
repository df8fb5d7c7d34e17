//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod context;
pub mod guided_login;
pub mod login;
pub mod logout;
pub mod restore;
pub mod session;
pub mod startup;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
