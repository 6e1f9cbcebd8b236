//! Parlor server binary.
//!
//! Binds to `0.0.0.0:$PORT` (default 3000) with the dev authenticator:
//! the handshake token is taken as the username. Swap in a real
//! [`AuthProvider`] (JWT validation, an auth service call) for production.

use parlor::GameServerBuilder;
use parlor_score::Scoreboard;
use parlor_session::{AuthError, AuthProvider, Identity};
use tracing_subscriber::EnvFilter;

/// Dev-only authentication: any non-empty token is accepted verbatim.
struct TokenAuth;

impl AuthProvider for TokenAuth {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let username = token.trim();
        if username.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(Identity { username: username.to_string() })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");
    tracing::info!(%addr, "starting parlor server");

    let server = GameServerBuilder::new()
        .bind(&addr)
        .build(TokenAuth, Scoreboard::new())
        .await?;
    server.run().await?;
    Ok(())
}
