pub mod entry;
pub mod logger;
pub mod sink;

pub use entry::{AuditAction, AuditEntry};
pub use logger::AuditLogger;
pub use sink::{AuditSink, MemoryAuditSink, TracingAuditSink};
