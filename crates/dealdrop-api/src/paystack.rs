// Paystack transaction client
//
// Only the two calls a checkout needs: initialize (returns the hosted
// authorization URL the payer visits) and verify (confirms the outcome by
// reference). Amounts are in the currency's minor unit (kobo for NGN).

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{TransportConfig, bearer_headers, with_trailing_slash};

/// Default public Paystack API root.
pub const PAYSTACK_API_URL: &str = "https://api.paystack.co";

/// Paystack response envelope: `{ status, message, data }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

/// Body of `POST /transaction/initialize`.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub email: String,
    /// Amount in minor units.
    pub amount: u64,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Authorization {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Outcome of a transaction as reported by `GET /transaction/verify/{ref}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
    Abandoned,
    Ongoing,
    Pending,
    Reversed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub status: TransactionStatus,
    pub reference: String,
    /// Amount in minor units.
    pub amount: u64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
}

/// HTTP client for the Paystack transactions API.
pub struct PaystackClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PaystackClient {
    /// Create a client authenticated with a Paystack secret key.
    pub fn new(
        base_url: Url,
        secret_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let headers = bearer_headers(secret_key.expose_secret())?;
        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
        })
    }

    /// Begin a transaction; the payer completes it at `authorization_url`.
    pub async fn initialize(&self, request: &InitializeRequest) -> Result<Authorization, Error> {
        let url = self.base_url.join("transaction/initialize")?;
        debug!(reference = %request.reference, amount = request.amount, "initializing payment");
        let resp = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(Error::Transport)?;
        self.unwrap(resp).await
    }

    /// Look up the outcome of a transaction by reference.
    pub async fn verify(&self, reference: &str) -> Result<Verification, Error> {
        let url = self
            .base_url
            .join(&format!("transaction/verify/{reference}"))?;
        debug!(reference, "verifying payment");
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        self.unwrap(resp).await
    }

    async fn unwrap<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let message = envelope
            .message
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        match (status.is_success() && envelope.status, envelope.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(Error::Payment {
                message: format!("{message} (no data)"),
            }),
            (false, _) => Err(Error::Payment { message }),
        }
    }
}
