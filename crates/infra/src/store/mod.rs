//! Repository adapters for users and accounts.
//!
//! Each adapter implements both `UserRepository` and `AccountRepository` so a
//! single handle can back both services.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
