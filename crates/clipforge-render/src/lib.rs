//! Client for the external render farm.
//!
//! The farm is a remote HTTP service: dispatch a composition with input
//! props, get back a render id and output bucket, poll progress by id. When
//! a webhook registration is attached to a dispatch, the farm signs its
//! completion callback with the shared secret.

pub mod client;
pub mod error;
pub mod types;

pub use client::{RenderFarmClient, RenderFarmConfig};
pub use error::{RenderError, RenderResult};
pub use types::{DispatchRequest, DispatchResponse, WebhookRegistration};
