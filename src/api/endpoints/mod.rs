//! API endpoint handlers.
//!
//! Each module corresponds to one tab of the operator's form: the chat
//! consultant, the MARCH checklist, and the report export, plus session
//! entry and service health.

pub mod auth;
pub mod chat;
pub mod checklist;
pub mod health;
pub mod report;
pub mod stats;
