//! Integration test suite for devtrack-core.
//!
//! These tests exercise the engine facade end to end: dependency edges go in
//! through the public API, lifecycle events are dispatched the way a host
//! application would, and assertions run against the in-memory host, the
//! execution log, and the event bus together.
//!
//! # Test Categories
//!
//! - `dependency_graph`: Edge insertion, cycle rejection, blocking queries
//! - `automation_flow`: Rule matching, execution logging, failure isolation
//! - `cascade`: Chained automation, unblock synthesis, the depth guard


mod automation_flow;
mod dependency_graph;
