//! CLI command implementations
//!
//! Every command returns the process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success, or clean drain after a shutdown signal |
//! | 2 | Configuration error |
//! | 3 | At least one entity halted |
//! | 4 | Source or index refused the connection |
//! | 5 | Any other failure |

pub mod reset;
pub mod run;
pub mod status;
pub mod validate;

/// Configuration error exit code
pub const EXIT_CONFIG: i32 = 2;

/// Connection error exit code
pub const EXIT_CONNECTION: i32 = 4;

/// Fatal error exit code
pub const EXIT_FATAL: i32 = 5;
