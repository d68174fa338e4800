//! Process-local registry of renders awaiting a completion callback.
//!
//! Entries are inserted when a render is dispatched with callback intent and
//! removed exactly once: either claimed by the webhook receiver or evicted by
//! the periodic TTL sweep. This bounds memory when the render farm never
//! calls back.
//!
//! The registry is process-local state. A multi-instance deployment needs a
//! shared external store with native expiry instead; until then the service
//! must run as a single replica behind the webhook URL.

pub mod registry;
pub mod sweeper;

pub use registry::{PendingRegistry, PendingRender, RegistryConfig};
pub use sweeper::RegistrySweeper;
