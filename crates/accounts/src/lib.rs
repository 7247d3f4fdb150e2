//! Users and accounts domain module.
//!
//! This crate contains the two entity types, payload validation, the
//! persistence ports the service layer talks to, and the services that
//! orchestrate multi-step operations. No HTTP and no storage code lives here.

pub mod account;
pub mod ports;
pub mod service;
pub mod user;

pub use account::{Account, NewAccount};
pub use ports::{AccountRepository, RepositoryError, UserRepository};
pub use service::{AccountService, ServiceError, ServiceResult, UserService};
pub use user::{User, UserProfile};
