//! HTTP client for the SpecDrafter backend.
//!
//! Provides [`DrafterClient`], which implements
//! [`ProjectBackend`](crate::ProjectBackend) over the backend's REST and
//! streaming endpoints.

mod drafter_client;

pub use drafter_client::DrafterClient;
