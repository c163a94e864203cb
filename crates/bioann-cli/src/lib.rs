//! Library components of the `bioann` command-line tool.

pub mod logging;
pub mod report;
pub mod workflow;
