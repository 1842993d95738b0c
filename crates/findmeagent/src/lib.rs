//! Lead intake for FindMeAgent: captures a visitor's contact details, gates and
//! submits them to the leads backend, and reports a conversion on success.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
