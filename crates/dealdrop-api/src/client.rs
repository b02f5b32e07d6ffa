// Marketplace backend HTTP client
//
// Wraps `reqwest::Client` with URL construction, bearer-token injection,
// and status/message error mapping. Endpoint groups (deals, vendors,
// commerce, comments, auth) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ErrorBody, ItemBody, ListBody};
use crate::transport::{TransportConfig, with_trailing_slash};

/// Header carrying the checkout idempotency key on resource-creation calls.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Raw HTTP client for the marketplace REST backend.
///
/// All methods return unwrapped payloads: `{ "data": ... }` envelopes are
/// stripped and non-2xx responses become typed errors carrying the
/// backend's `message` field.
pub struct MarketClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    timeout_secs: u64,
}

impl MarketClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `https://api.example.com/api`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
            token: RwLock::new(None),
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: with_trailing_slash(base_url),
            token: RwLock::new(None),
            timeout_secs: 0,
        }
    }

    /// Convenience constructor from a URL string (used by tests).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self::with_client(http, Url::parse(base_url)?))
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set or clear the bearer token sent with every request.
    pub fn set_token(&self, token: Option<SecretString>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    /// Whether a bearer token is currently configured.
    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL under the base from path segments. Each segment is
    /// percent-encoded on its own, so ids cannot reach another endpoint.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        if let Some(bad) = segments
            .iter()
            .find(|s| matches!(**s, "" | "." | ".."))
        {
            return Err(Error::InvalidPathSegment {
                segment: (*bad).to_owned(),
            });
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match self.token.read() {
            Ok(guard) => match guard.as_ref() {
                Some(token) => builder.bearer_auth(token.expose_secret()),
                None => builder,
            },
            Err(_) => builder,
        }
    }

    /// GET a list endpoint, accepting bare or `data`-wrapped arrays.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, Error> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        debug!("GET {}", url);
        let resp = self.send(self.request(reqwest::Method::GET, url)).await?;
        let body: ListBody<T> = self.parse(resp).await?;
        Ok(body.into_vec())
    }

    /// GET a single object.
    pub(crate) async fn get_item<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let resp = self.send(self.request(reqwest::Method::GET, url)).await?;
        let body: ItemBody<T> = self.parse(resp).await?;
        Ok(body.into_inner())
    }

    /// POST a JSON body and parse a single object back.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &impl Serialize,
    ) -> Result<T, Error> {
        self.send_json(reqwest::Method::POST, path, body, None).await
    }

    /// POST with an `Idempotency-Key` header so the backend can de-duplicate
    /// retries of the same checkout.
    pub(crate) async fn post_idempotent<T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &impl Serialize,
        idempotency_key: &str,
    ) -> Result<T, Error> {
        self.send_json(reqwest::Method::POST, path, body, Some(idempotency_key))
            .await
    }

    /// PATCH a JSON body and parse a single object back.
    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &impl Serialize,
    ) -> Result<T, Error> {
        self.send_json(reqwest::Method::PATCH, path, body, None).await
    }

    /// POST a JSON body, discarding whatever the backend answers.
    pub(crate) async fn post_discard(&self, path: &[&str], body: &impl Serialize) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let resp = self
            .send(self.request(reqwest::Method::POST, url).json(body))
            .await?;
        self.check(resp).await.map(|_| ())
    }

    /// DELETE a resource.
    pub(crate) async fn delete(&self, path: &[&str]) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {}", url);
        let resp = self.send(self.request(reqwest::Method::DELETE, url)).await?;
        self.check(resp).await.map(|_| ())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &[&str],
        body: &impl Serialize,
        idempotency_key: Option<&str>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);
        let mut builder = self.request(method, url).json(body);
        if let Some(key) = idempotency_key {
            builder = builder.header(IDEMPOTENCY_HEADER, key);
        }
        let resp = self.send(builder).await?;
        let body: ItemBody<T> = self.parse(resp).await?;
        Ok(body.into_inner())
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::Transport(e)
            }
        })
    }

    /// Map non-success statuses to typed errors, returning the body text.
    async fn check(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let path = resp.url().path().to_owned();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status.is_success() {
            return Ok(body);
        }

        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());

        Err(match status.as_u16() {
            401 => Error::Unauthorized { message },
            403 => Error::Forbidden { message },
            404 => Error::NotFound { path },
            code => Error::Api {
                status: code,
                message,
            },
        })
    }

    async fn parse<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let body = self.check(resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MarketClient {
        MarketClient::from_reqwest("https://api.example.com/api", reqwest::Client::new()).unwrap()
    }

    #[test]
    fn joins_paths_under_base_prefix() {
        let url = client().url(&["deals", "abc", "like"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/deals/abc/like");
    }

    #[test]
    fn ids_stay_inside_their_segment() {
        let client = client();
        let url = client.url(&["deals", "../vendors/x"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/deals/..%2Fvendors%2Fx"
        );
        let url = client.url(&["deals", "id?x=1#top"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/deals/id%3Fx=1%23top");
        assert!(url.query().is_none());

        for bad in ["..", ".", ""] {
            assert!(matches!(
                client.url(&["deals", bad]),
                Err(Error::InvalidPathSegment { .. })
            ));
        }
    }
}
