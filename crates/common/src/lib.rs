//! Shared types, error definitions, and utilities used across all vocalis crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, FromMessage, Result, VocalisError},
    types::{BlockId, ChatMessage, Role, Tag},
};
