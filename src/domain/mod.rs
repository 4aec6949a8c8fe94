//! Domain entities and pure catalog logic.
//!
//! Nothing in this module touches the database or HTTP layer, so it can be
//! reused by any consumer of the `data` feature.

pub mod auth;
pub mod featured;
pub mod festival;
pub mod name_rules;
pub mod search;
pub mod submission;
pub mod temple;
pub mod types;
