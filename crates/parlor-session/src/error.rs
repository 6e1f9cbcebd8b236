//! Error types for the session layer.

/// Why identity resolution failed.
///
/// An auth failure aborts the action before any room is touched.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token was presented.
    #[error("authentication token is missing")]
    MissingToken,

    /// The token was presented but rejected by the provider.
    #[error("invalid or expired token: {0}")]
    Rejected(String),
}
