//! Persistence capabilities for the Warden gateway.
//!
//! Handlers and the policy repository depend on the traits here, never on
//! a concrete backend; the server wires in [`MemoryStore`] or
//! [`PostgresStore`] at startup.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{ClientRecord, ClientStore, ContextStore, PolicyStore};
