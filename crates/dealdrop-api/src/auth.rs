// Magic-link authentication.
//
// Login is passwordless: the backend emails a token-bearing link, and the
// token from that link is exchanged for a session bearer token.

use serde_json::json;
use tracing::debug;

use crate::client::MarketClient;
use crate::error::Error;
use crate::models::AuthSession;

impl MarketClient {
    /// Ask the backend to email a magic link.
    ///
    /// `POST /auth/magic-link`
    pub async fn request_magic_link(&self, email: &str) -> Result<(), Error> {
        debug!(email, "requesting magic link");
        self.post_discard(&["auth", "magic-link"], &json!({ "email": email }))
            .await
    }

    /// Exchange a magic-link token for a session.
    ///
    /// `POST /auth/verify`. Does not install the returned token; callers
    /// decide whether to persist it and call [`set_token`](Self::set_token).
    pub async fn verify_magic_link(&self, token: &str) -> Result<AuthSession, Error> {
        self.post(&["auth", "verify"], &json!({ "token": token })).await
    }
}
