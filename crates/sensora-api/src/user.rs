// User and permission-group accessor
//
// The only operations that require a user identity. With no API key
// configured, user-scoped operations degrade to `Ok(None)` after a
// non-fatal warning instead of failing -- the single swallowed failure
// in the crate.

use serde_json::Value;
use tracing::warn;

use crate::auth::AuthContext;
use crate::client::RegistryClient;
use crate::error::Error;
use crate::models::{CollectionDocument, Resource, ResourceDocument};

/// Accessor for `/user-info` and `/permission-groups`.
pub struct UserInfo {
    client: RegistryClient,
}

impl UserInfo {
    /// Create an accessor against the default backend root.
    pub fn new(auth: AuthContext) -> Result<Self, Error> {
        Ok(Self::with_client(RegistryClient::new(auth)?))
    }

    /// Create an accessor around an existing client.
    pub fn with_client(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Supply the API key after construction.
    pub fn set_api_key(&mut self, api_key: secrecy::SecretString) {
        self.client.set_api_key(api_key);
    }

    /// Basic information on the authenticated user, or `None` (with a
    /// warning) when no API key is configured.
    ///
    /// `GET /user-info`
    pub fn info(&self) -> Result<Option<Resource>, Error> {
        if !self.client.has_api_key() {
            warn!("no user API key found");
            return Ok(None);
        }

        let doc: ResourceDocument = self.client.get("/user-info", "get user info")?;
        Ok(Some(doc.data))
    }

    /// All permission groups. No API key required.
    ///
    /// `GET /permission-groups`
    pub fn all_groups(&self) -> Result<CollectionDocument, Error> {
        self.client.get("/permission-groups", "get groups")
    }

    /// The permission groups the authenticated user is a member of, or
    /// `None` when no API key is configured.
    ///
    /// Filters `all_groups` by the id list in the user's `member`
    /// attribute.
    pub fn user_groups(&self) -> Result<Option<Vec<Resource>>, Error> {
        let Some(info) = self.info()? else {
            return Ok(None);
        };

        let member_ids: Vec<&str> = info
            .attribute("member")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let groups = self.all_groups()?;
        Ok(Some(
            groups
                .data
                .into_iter()
                .filter(|group| member_ids.contains(&group.id.as_str()))
                .collect(),
        ))
    }
}
