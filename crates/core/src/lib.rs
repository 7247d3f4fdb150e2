//! `accountsys-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{AccountNotFound, DomainError, DomainResult, FieldErrors};
pub use id::{AccountId, UserId};
