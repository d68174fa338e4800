//! API handlers.

pub mod health;
pub mod render;
pub mod webhook;

pub use health::{health, ready};
pub use render::{dispatch_render, get_progress};
pub use webhook::receive_webhook;
