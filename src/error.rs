/*!
 * Error types for starstat
 */

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_LOCKED: i32 = 2;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport failure talking to the catalog
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed catalog response or cache payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog is throttling all queries and the retry budget ran out
    #[error("catalog is rate-limiting all queries (gave up after {attempts} attempts)")]
    SourceLocked { attempts: u32 },

    /// The bodies endpoint had no data for the named system
    #[error("system not found in catalog: {name}")]
    SystemNotFound { name: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error should abort the whole run.
    ///
    /// Only a missing per-system record is survivable; callers skip the
    /// system and move on. Everything else ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::SystemNotFound { .. })
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::SourceLocked { .. } => EXIT_LOCKED,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_locked_display() {
        let err = Error::SourceLocked { attempts: 9 };
        assert!(err.to_string().contains("9 attempts"));
        assert!(err.is_fatal());
        assert_eq!(err.exit_code(), EXIT_LOCKED);
    }

    #[test]
    fn test_system_not_found_is_survivable() {
        let err = Error::SystemNotFound {
            name: "Nowhere".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert!(err.to_string().contains("Nowhere"));
    }

    #[test]
    fn test_io_error_is_fatal() {
        let err = Error::Io(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
        assert!(err.is_fatal());
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::Config("bad cache dir".to_string());
        assert_eq!(err.to_string(), "configuration error: bad cache dir");
    }
}
