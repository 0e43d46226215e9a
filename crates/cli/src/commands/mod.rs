//! Command handlers for the vrag CLI.

pub mod clear;
pub mod populate;
pub mod query;
pub mod stats;

pub use clear::ClearCommand;
pub use populate::PopulateCommand;
pub use query::QueryCommand;
pub use stats::StatsCommand;
