//! Shared domain types and host-facing interfaces.

pub mod access;
pub mod memory;
pub mod task;
