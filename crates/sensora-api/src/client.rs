// Registry HTTP client
//
// Wraps `reqwest::blocking::Client` with registry-specific URL
// construction, per-method status validation, and JSON:API body
// handling. The entity accessors (devices, sites, contacts, user) hold
// one of these each and stay focused on collection semantics.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::AuthContext;
use crate::error::Error;
use crate::models::Envelope;

/// Root of the registry backend.
pub const DEFAULT_BASE_URL: &str = "https://pid-sms-tst.bodc.uk/backend/api/v1";

/// Blocking HTTP client for the registry backend.
///
/// Calls are synchronous with no timeout and no retry: a transport
/// failure or an unexpected status code surfaces immediately as an
/// [`Error`]. Success is per-method -- GET and PATCH expect 200, POST
/// (create) expects 201.
pub struct RegistryClient {
    http: reqwest::blocking::Client,
    base_url: Url,
    auth: AuthContext,
}

impl RegistryClient {
    /// Create a client against [`DEFAULT_BASE_URL`].
    pub fn new(auth: AuthContext) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL.parse()?, auth)
    }

    /// Create a client against an explicit backend root (used by tests
    /// to point at a local server).
    pub fn with_base_url(base_url: Url, auth: AuthContext) -> Result<Self, Error> {
        // No request timeout; callers impose their own deadlines.
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("sensora/", env!("CARGO_PKG_VERSION")))
            .timeout(None)
            .build()?;

        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// The backend root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Supply the API key after construction.
    pub fn set_api_key(&mut self, api_key: secrecy::SecretString) {
        self.auth.set_api_key(api_key);
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.auth.has_api_key()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL from a path like `"/devices"`.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    fn headers(&self) -> Result<HeaderMap, Error> {
        self.auth.headers()
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a path and parse the JSON body. Expects 200.
    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).headers(self.headers()?).send()?;
        let resp = expect_status(resp, StatusCode::OK, operation)?;
        parse_body(resp)
    }

    /// GET a path with query parameters and parse the JSON body.
    /// Expects 200. Filter parameters use the backend's bracket style,
    /// e.g. `("filter[device_id]", id)`.
    pub(crate) fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        operation: &str,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(url)
            .headers(self.headers()?)
            .query(params)
            .send()?;
        let resp = expect_status(resp, StatusCode::OK, operation)?;
        parse_body(resp)
    }

    /// POST a JSON:API envelope to a path. Expects 201; the response
    /// body is discarded.
    pub(crate) fn post(
        &self,
        path: &str,
        body: &Envelope<'_>,
        operation: &str,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .headers(self.headers()?)
            .json(body)
            .send()?;
        expect_status(resp, StatusCode::CREATED, operation)?;
        Ok(())
    }

    /// PATCH a JSON:API envelope to a path. Expects 200; the response
    /// body is discarded.
    pub(crate) fn patch(
        &self,
        path: &str,
        body: &Envelope<'_>,
        operation: &str,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self
            .http
            .patch(url)
            .headers(self.headers()?)
            .json(body)
            .send()?;
        expect_status(resp, StatusCode::OK, operation)?;
        Ok(())
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Validate the response status against the one the operation expects.
fn expect_status(
    resp: reqwest::blocking::Response,
    expected: StatusCode,
    operation: &str,
) -> Result<reqwest::blocking::Response, Error> {
    let status = resp.status();
    if status == expected {
        Ok(resp)
    } else {
        Err(Error::RequestFailed {
            operation: operation.to_owned(),
            status: status.as_u16(),
        })
    }
}

/// Parse a JSON body, keeping the raw text around for diagnostics.
fn parse_body<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> Result<T, Error> {
    let body = resp.text()?;
    serde_json::from_str(&body).map_err(|e| {
        let preview = &body[..body.len().min(200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
