//! Durable asynchronous audit for the Warden gateway.
//!
//! Handlers enqueue [`AuditEntry`](warden_core::AuditEntry) values and
//! return immediately; a background worker batches entries, writes them
//! through an [`AuditWriter`] capability with retry, and spills to a
//! newline-delimited JSON fallback file when the backend stays down.
//!
//! The queue never owns a database handle: it receives a writer
//! capability so the connection lifecycle stays with the service context.

pub mod error;
pub mod fallback;
pub mod postgres;
pub mod queue;
pub mod retry;
pub mod writer;

pub use error::AuditError;
pub use fallback::FallbackFile;
pub use postgres::PostgresAuditWriter;
pub use queue::{AuditQueue, AuditQueueConfig, AuditQueueMetrics, MetricsSnapshot, QueueMode};
pub use retry::RetryPolicy;
pub use writer::{AuditWriter, MemoryAuditWriter};
