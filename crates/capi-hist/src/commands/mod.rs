//! CLI command implementations

pub mod histogram;
pub mod hosts;
