// Resend transactional email client.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{TransportConfig, bearer_headers, with_trailing_slash};

/// Default public Resend API root.
pub const RESEND_API_URL: &str = "https://api.resend.com";

/// Body of `POST /emails`.
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResendError {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for Resend.
pub struct ResendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ResendClient {
    pub fn new(
        base_url: Url,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let headers = bearer_headers(api_key.expose_secret())?;
        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
        })
    }

    /// Send one email; returns the provider's message id.
    pub async fn send(&self, email: &Email) -> Result<String, Error> {
        let url = self.base_url.join("emails")?;
        debug!(to = ?email.to, subject = %email.subject, "sending email");
        let resp = self
            .http
            .post(url)
            .json(email)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let parsed: ResendError = serde_json::from_str(&body).unwrap_or_default();
            return Err(Error::Email {
                status: status.as_u16(),
                message: parsed.message.unwrap_or(body),
            });
        }

        let sent: SendResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;
        Ok(sent.id)
    }
}
