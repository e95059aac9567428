// API-key authentication state
//
// The key resolves from an explicit argument or the SENSORS_API_KEY
// environment variable; absence is legal and only disables operations
// that need a user identity. The environment read happens in `resolve`
// and nowhere else -- every other component is a pure function of the
// headers derived here.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Environment variable consulted when no explicit API key is given.
pub const API_KEY_ENV: &str = "SENSORS_API_KEY";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "X-APIKEY";

/// JSON:API media type, used for both `accept` and `content-type`.
const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Authentication state shared by every registry accessor.
///
/// Headers are a pure function of the resolved key: the fixed JSON:API
/// content-negotiation pair, plus `X-APIKEY` when a key is present
/// (omitted entirely when it is not).
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    api_key: Option<SecretString>,
}

impl AuthContext {
    /// Resolve the API key: an explicit key wins, otherwise the
    /// [`API_KEY_ENV`] environment variable, otherwise no key.
    pub fn resolve(explicit_key: Option<SecretString>) -> Self {
        let api_key =
            explicit_key.or_else(|| std::env::var(API_KEY_ENV).ok().map(SecretString::from));
        Self { api_key }
    }

    /// Supply the API key after construction (when it was omitted
    /// initially).
    pub fn set_api_key(&mut self, api_key: SecretString) {
        self.api_key = Some(api_key);
    }

    /// Whether a key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Derive the request headers for the current key.
    ///
    /// The key header is marked sensitive so it never shows up in
    /// debug output.
    pub fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API_MEDIA_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API_MEDIA_TYPE));

        if let Some(key) = &self.api_key {
            let mut value = HeaderValue::from_str(key.expose_secret()).map_err(|e| {
                Error::Authentication {
                    message: format!("invalid API key header value: {e}"),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_produces_key_header() {
        let auth = AuthContext::resolve(Some(SecretString::from("abc123".to_owned())));
        assert!(auth.has_api_key());

        let headers = auth.headers().unwrap();
        assert_eq!(headers.get("X-APIKEY").unwrap(), "abc123");
        assert_eq!(headers.get(ACCEPT).unwrap(), JSON_API_MEDIA_TYPE);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), JSON_API_MEDIA_TYPE);
    }

    #[test]
    fn missing_key_omits_key_header() {
        let auth = AuthContext::default();
        assert!(!auth.has_api_key());

        let headers = auth.headers().unwrap();
        assert!(headers.get("X-APIKEY").is_none());
        assert_eq!(headers.get(ACCEPT).unwrap(), JSON_API_MEDIA_TYPE);
    }

    #[test]
    fn key_can_be_added_after_construction() {
        let mut auth = AuthContext::default();
        auth.set_api_key(SecretString::from("later".to_owned()));
        assert!(auth.has_api_key());
        assert_eq!(auth.headers().unwrap().get("X-APIKEY").unwrap(), "later");
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let auth = AuthContext::resolve(Some(SecretString::from("bad\nkey".to_owned())));
        assert!(matches!(
            auth.headers(),
            Err(Error::Authentication { .. })
        ));
    }
}
