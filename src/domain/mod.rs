//! Domain aggregates exposed by the case-management service layer.

pub mod case;
pub mod client;
pub mod document;
pub mod serve_attempt;
pub mod types;
