//! Shared data models for the Clipforge backend.
//!
//! This crate provides Serde-serializable types for:
//! - Render identifiers and codec selection
//! - Render-farm webhook payloads
//! - Workflow-resume payloads forwarded downstream
//! - Business record references (campaign/clip)

pub mod render;
pub mod resume;
pub mod webhook;

// Re-export common types
pub use render::{BusinessRefs, Codec, RenderId};
pub use resume::{ResumePayload, ResumeStatus};
pub use webhook::{RenderCosts, WebhookPayload};
