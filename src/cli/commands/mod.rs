//! CLI command implementations
//!
//! Every command returns its process exit code:
//! 0 success, 2 configuration error, 4 connection error, 5 fatal error,
//! 130 interrupted.

pub mod init;
pub mod provision;
pub mod run;
pub mod validate;
