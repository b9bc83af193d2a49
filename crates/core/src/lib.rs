//! `larder-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod branch;
pub mod entity;
pub mod error;
pub mod id;

pub use branch::Branch;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::OrderId;
