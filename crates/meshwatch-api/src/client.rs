// Controller HTTP client
//
// Wraps `reqwest::Client` with network-scoped URL construction, per-network
// token headers, and envelope unwrapping. Endpoint modules (devices,
// access points) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::TokenCache;
use crate::error::Error;
use crate::models::Envelope;
use crate::transport::TransportConfig;

/// Default controller host.
pub const DEFAULT_API_HOST: &str = "api-user.e2ro.com";

/// API version segment appended to the host.
pub const API_VERSION: &str = "2.2";

const TOKEN_HEADER: &str = "X-User-Token";

/// Raw HTTP client for the mesh controller API.
///
/// Handles the `{ meta, data }` envelope and network-scoped URLs. All
/// methods return the unwrapped `data` payload.
pub struct MeshClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenCache,
}

impl MeshClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` includes the API version, e.g. `https://api-user.e2ro.com/2.2`.
    pub fn new(base_url: Url, tokens: TokenCache, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, tokens: TokenCache) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// Build the versioned base URL for a host: `https://{host}/2.2`.
    ///
    /// A host that already carries a scheme (`http://127.0.0.1:8080`) is
    /// used as-is.
    pub fn base_url_for_host(host: &str) -> Result<Url, Error> {
        let host = host.trim_end_matches('/');
        let root = if host.contains("://") {
            host.to_owned()
        } else {
            format!("https://{host}")
        };
        Ok(Url::parse(&format!("{root}/{API_VERSION}"))?)
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token cache shared with this client.
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a network-scoped URL: `{base}/networks/{id}/{path}`.
    pub(crate) fn network_url(&self, network_id: &str, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/networks/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            network_id,
            path
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET and unwrap the envelope.
    ///
    /// A rejected token is dropped from the cache so the next call
    /// resolves it again.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        network_id: &str,
        url: Url,
    ) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);

        let token = self.tokens.token(network_id)?;
        let resp = self
            .http
            .get(url)
            .header(TOKEN_HEADER, token.expose_secret())
            .send()
            .await
            .map_err(Error::Transport)?;

        let result = Self::parse_envelope(resp).await;
        if let Err(ref e) = result {
            if e.is_auth_expired() {
                self.tokens.invalidate(network_id);
            }
        }
        result
    }

    /// Parse the `{ meta, data }` envelope, returning `data` on success.
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("token rejected (HTTP {})", status.as_u16()),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_owned()
                }),
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        Ok(envelope.data.unwrap_or_default())
    }
}

/// Pull `meta.error` out of an error body, if it parses.
fn error_message(body: &str) -> Option<String> {
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(body).ok()?;
    envelope.meta?.error
}

impl std::fmt::Debug for MeshClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshClient")
            .field("base_url", &self.base_url.as_str())
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
