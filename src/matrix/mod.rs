//! Matrix integration layer: the client boundary and its HTTP adapters.

pub mod api;
pub mod auth;
pub mod client;
pub mod contracts;
pub mod media;
pub mod sync;

pub use client::{HomeserverClient, HomeserverClientFactory};
pub use contracts::{
    ClientError, ClientFactory, CreateClientOptions, MatrixClient, PendingEventOrdering,
    StartOptions,
};

/// Returns the matrix module name for smoke checks.
pub fn module_name() -> &'static str {
    "matrix"
}
