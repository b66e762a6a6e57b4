// Error types for shadowprobe

use thiserror::Error;

/// Result type alias for shadowprobe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving a browser session
#[derive(Debug, Error)]
pub enum Error {
    /// chromedriver binary was not found
    ///
    /// Set the CHROMEDRIVER environment variable to the executable, or put
    /// `chromedriver` on PATH.
    #[error("chromedriver not found. Set CHROMEDRIVER or add chromedriver to PATH.")]
    DriverNotFound,

    /// Failed to launch the chromedriver process
    ///
    /// Common causes: the binary is not executable, the port is taken, or
    /// the driver exited before reporting ready.
    #[error("Failed to launch chromedriver: {0}")]
    LaunchFailed(String),

    /// The WebDriver session could not be created or did not reach the target page
    #[error("Session start failed: {0}")]
    SessionStart(String),

    /// The WebDriver session or driver process could not be cleanly stopped
    #[error("Session teardown failed: {0}")]
    SessionTeardown(String),

    /// Bounded wait elapsed before the condition held
    #[error("Timeout after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    /// A direct element query matched nothing
    ///
    /// Some probes expect this outcome; they classify it into a probe
    /// result instead of propagating it.
    #[error("No element matching '{selector}'")]
    ElementNotFound { selector: String },

    /// A command name was registered twice on the same connection
    #[error("Command '{name}' is already registered")]
    CommandRedefined { name: String },

    /// The remote end rejected a command, or the command was never registered
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// HTTP transport error
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
