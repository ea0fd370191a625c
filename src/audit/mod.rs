pub mod logger;
pub mod reader;
pub mod types;

pub use logger::{AuditTrail, DEFAULT_AUDIT_FILE};
pub use types::*;
