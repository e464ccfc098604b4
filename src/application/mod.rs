// Application layer - the ledger service and its error taxonomy.
// Clients (CLI, export) go through LedgerService; SQL stays in storage,
// arithmetic stays in domain.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
