// Site accessor
//
// Same shape as the device accessor: snapshot-served name lookups,
// fresh requests for id lookups and updates. Sites are matched on
// their `label` attribute and cannot be created through this crate.

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::AuthContext;
use crate::client::RegistryClient;
use crate::error::Error;
use crate::models::{CollectionDocument, Envelope, EntityRef, Resource, ResourceDocument};
use crate::validate::{check_allowed, SITE_ATTRIBUTES};

/// Accessor for the `/sites` collection.
pub struct Sites {
    client: RegistryClient,
    snapshot: Option<CollectionDocument>,
}

impl Sites {
    /// Create an accessor against the default backend root.
    pub fn new(auth: AuthContext) -> Result<Self, Error> {
        Ok(Self::with_client(RegistryClient::new(auth)?))
    }

    /// Create an accessor around an existing client.
    pub fn with_client(client: RegistryClient) -> Self {
        Self {
            client,
            snapshot: None,
        }
    }

    /// Supply the API key after construction.
    pub fn set_api_key(&mut self, api_key: secrecy::SecretString) {
        self.client.set_api_key(api_key);
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch all sites and replace the snapshot.
    ///
    /// `GET /sites`
    pub fn refresh(&mut self) -> Result<&CollectionDocument, Error> {
        let doc: CollectionDocument = self.client.get("/sites", "get sites")?;
        Ok(&*self.snapshot.insert(doc))
    }

    /// All sites, fetching the snapshot first if absent.
    pub fn all(&mut self) -> Result<&CollectionDocument, Error> {
        if self.snapshot.is_none() {
            return self.refresh();
        }
        Ok(self.snapshot.as_ref().expect("snapshot just checked"))
    }

    /// Get a single site by id. Always issues a fresh request.
    ///
    /// `GET /sites/{id}`
    pub fn get_by_id(&self, site_id: &str) -> Result<Resource, Error> {
        let doc: ResourceDocument = self.client.get(&format!("/sites/{site_id}"), "get site")?;
        Ok(doc.data)
    }

    /// Get the first site whose `label` matches exactly.
    pub fn get_by_name(&mut self, site_name: &str) -> Result<Resource, Error> {
        let doc = self.all()?;
        doc.data
            .iter()
            .find(|site| site.attribute_str("label") == Some(site_name))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                entity: "site",
                query: site_name.to_owned(),
            })
    }

    /// Get every site whose `label` matches a regex pattern. Matches
    /// are anchored at the start of the label. Fails with `NotFound`
    /// when nothing matches.
    pub fn find_by_pattern(&mut self, pattern: &str) -> Result<Vec<Resource>, Error> {
        let re = Regex::new(pattern)?;
        let doc = self.all()?;

        let sites: Vec<Resource> = doc
            .data
            .iter()
            .filter(|site| {
                site.attribute_str("label")
                    .is_some_and(|label| re.find(label).is_some_and(|m| m.start() == 0))
            })
            .cloned()
            .collect();

        if sites.is_empty() {
            return Err(Error::NotFound {
                entity: "site",
                query: pattern.to_owned(),
            });
        }
        Ok(sites)
    }

    /// Get all configurations associated with a site identified by id,
    /// name, or both.
    ///
    /// `GET /sites/{id}/configurations`
    pub fn configurations(&mut self, site: EntityRef<'_>) -> Result<CollectionDocument, Error> {
        let site_id = self.resolve_id(site)?;
        self.client.get(
            &format!("/sites/{site_id}/configurations"),
            "get configuration",
        )
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Update attributes of a site by id.
    ///
    /// Attribute keys are checked against the site allow-list before
    /// any request is issued.
    ///
    /// `PATCH /sites/{id}`
    pub fn update_by_id(&self, site_id: &str, attributes: &Map<String, Value>) -> Result<(), Error> {
        check_allowed(attributes, SITE_ATTRIBUTES)?;

        debug!(id = site_id, "updating site");
        self.client.patch(
            &format!("/sites/{site_id}"),
            &Envelope::update("site", site_id, attributes),
            &format!("update site {site_id}"),
        )
    }

    /// Update attributes of a site by label, resolving the id through
    /// the snapshot.
    pub fn update_by_name(
        &mut self,
        site_name: &str,
        attributes: &Map<String, Value>,
    ) -> Result<(), Error> {
        check_allowed(attributes, SITE_ATTRIBUTES)?;

        let site_id = self.get_by_name(site_name)?.id;
        self.update_by_id(&site_id, attributes)
    }

    // ── Identifier resolution ────────────────────────────────────────

    /// Resolve an [`EntityRef`] to a site id, cross-checking when both
    /// an id and a name are supplied.
    fn resolve_id(&mut self, site: EntityRef<'_>) -> Result<String, Error> {
        match site {
            EntityRef::Id(id) => Ok(id.to_owned()),
            EntityRef::Name(name) => Ok(self.get_by_name(name)?.id),
            EntityRef::IdAndName { id, name } => {
                let site = self.get_by_id(id)?;
                if site.attribute_str("label") != Some(name) {
                    return Err(Error::IdentifierMismatch {
                        entity: "site",
                        id: id.to_owned(),
                        name: name.to_owned(),
                    });
                }
                Ok(id.to_owned())
            }
        }
    }
}
