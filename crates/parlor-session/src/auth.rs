//! The authentication hook.
//!
//! Parlor doesn't validate credentials itself — that belongs to whatever
//! issues them (a JWT service, an API gateway, a dev stub). The server only
//! defines the seam: [`AuthProvider::resolve`] turns the token from a
//! client's `hello` frame into a verified [`Identity`], and nothing touches
//! a room before that succeeds.

use crate::AuthError;

/// The verified user behind a connection.
///
/// Durable for as long as the user keeps the connection open; unlike a
/// [`ConnectionId`](parlor_transport::ConnectionId) it names a person, not
/// a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// Validates a client's auth token and returns who they are.
///
/// Implementations must be shareable across connection tasks
/// (`Send + Sync + 'static`).
///
/// # Example
///
/// ```rust
/// use parlor_session::{AuthError, AuthProvider, Identity};
///
/// /// Dev-only: the token IS the username.
/// struct TokenIsUsername;
///
/// impl AuthProvider for TokenIsUsername {
///     async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
///         let username = token.trim();
///         if username.is_empty() {
///             return Err(AuthError::MissingToken);
///         }
///         Ok(Identity { username: username.to_string() })
///     }
/// }
/// ```
pub trait AuthProvider: Send + Sync + 'static {
    /// Resolves a handshake token to an identity, or rejects it.
    fn resolve(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>> + Send;
}
