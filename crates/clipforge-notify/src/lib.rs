//! Best-effort side channels for render completion.
//!
//! Both channels follow the same policy: skip silently when unconfigured,
//! log and absorb failures, never block or fail the webhook flow. They set
//! state ("render done", "clip failed"), they do not accumulate, so a rare
//! duplicate delivery is harmless.

pub mod error;
pub mod records;
pub mod slack;

pub use error::{NotifyError, NotifyResult};
pub use records::{RecordStore, RecordsConfig};
pub use slack::{SlackConfig, SlackNotifier};
