//! The automation rule engine: events, rules, matching, execution, and the
//! append-only execution ledger.

pub mod bus;
pub mod event;
pub mod executor;
pub mod ledger;
pub mod matcher;
pub mod rule;
