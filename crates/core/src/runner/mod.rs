//! Running do-files and checking what they left behind

pub mod executor;
pub mod verifier;

// Re-export main types
pub use executor::{ensure_executable, run_command};
pub use verifier::{
    LogLocation, LogVerifier, SentinelMatch, VerifyState, find_error, is_error_line, log_tail,
};
