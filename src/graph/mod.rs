//! The task dependency graph: typed edges, cycle prevention, and derived
//! blocking views.

pub mod edge;
pub mod guard;
pub mod resolver;
pub mod store;
