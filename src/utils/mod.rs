//! Small shared utilities.

pub mod run_id;
