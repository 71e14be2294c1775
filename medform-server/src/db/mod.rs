//! Per-entity query layers
//!
//! Every operation runs against the shared pool as a short transaction;
//! composite operations (assignment with overrides, submission with
//! answers) each run inside one explicit transaction and roll back as a
//! unit on any sub-step failure.

pub mod assignments;
pub mod forms;
pub mod posts;
pub mod submissions;
pub mod users;
