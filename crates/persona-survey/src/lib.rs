//! Survey service core: question catalog, append-only answers, and the
//! rule-based matching that turns a finished survey into a personalized
//! result.

pub mod config;
pub mod error;
pub mod survey;
pub mod telemetry;
