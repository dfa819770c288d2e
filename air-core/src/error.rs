use std::path::PathBuf;

/// Failure taxonomy for the submission client.
///
/// Every variant is fatal: nothing is retried, and the binary maps each one
/// to a non-zero exit after printing it once.
#[derive(Debug, thiserror::Error)]
pub enum AirError {
    /// Bad argument combination, detected before any file or network I/O.
    #[error("{0}")]
    Usage(String),

    /// A patch file could not be read.
    #[error("cannot read patch file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request never produced a usable HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered outside the 2xx range.
    #[error("server returned {status}: {body}")]
    Server {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the JSON shape the service documents.
    #[error("malformed response: {0}")]
    Protocol(#[from] serde_json::Error),

    /// The service finished the review in the error state.
    #[error("review failed: {0}")]
    Review(String),

    /// Local output could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for review submission operations.
pub type Result<T> = std::result::Result<T, AirError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_names_the_path() {
        let err = AirError::File {
            path: PathBuf::from("0001-fix.patch"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let message = err.to_string();
        assert!(message.contains("0001-fix.patch"), "got: {}", message);
        assert!(message.contains("no such file"), "got: {}", message);
    }

    #[test]
    fn test_usage_error_displays_bare_message() {
        let err = AirError::Usage("Cannot specify both --pw-series and patch files".to_string());
        assert_eq!(
            err.to_string(),
            "Cannot specify both --pw-series and patch files"
        );
    }
}
