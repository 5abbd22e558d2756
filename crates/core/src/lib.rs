//! `taskflow-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers shared by every other crate and the error taxonomy surfaced to
//! callers.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{ProjectId, TaskId, UserId};
