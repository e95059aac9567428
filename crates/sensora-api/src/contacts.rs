// Contact accessor
//
// Read-only lookups over the contact collection. Name search returns
// every match (an empty list is a valid result); ORCID and email
// lookups return at most one contact. This asymmetry with the
// single-match device/site lookups is deliberate.

use crate::auth::AuthContext;
use crate::client::RegistryClient;
use crate::error::Error;
use crate::models::{CollectionDocument, Resource, ResourceDocument};

/// Accessor for the `/contacts` collection.
pub struct Contacts {
    client: RegistryClient,
    snapshot: Option<CollectionDocument>,
}

impl Contacts {
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

    /// Fetch all contacts and replace the snapshot.
    ///
    /// `GET /contacts`
    pub fn refresh(&mut self) -> Result<&CollectionDocument, Error> {
        let doc: CollectionDocument = self.client.get("/contacts", "get contacts")?;
        Ok(&*self.snapshot.insert(doc))
    }

    /// All contacts, fetching the snapshot first if absent.
    pub fn all(&mut self) -> Result<&CollectionDocument, Error> {
        if self.snapshot.is_none() {
            return self.refresh();
        }
        Ok(self.snapshot.as_ref().expect("snapshot just checked"))
    }

    /// Get a single contact by id. Always issues a fresh request.
    ///
    /// `GET /contacts/{id}`
    pub fn get_by_id(&self, contact_id: &str) -> Result<Resource, Error> {
        let doc: ResourceDocument = self
            .client
            .get(&format!("/contacts/{contact_id}"), "get contact")?;
        Ok(doc.data)
    }

    /// Get every contact matching a full name.
    ///
    /// The first word of `contact_name` is matched against
    /// `given_name` and the last word against `family_name`, both
    /// trimmed. Returns all matches; an empty list is a valid result.
    pub fn get_by_name(&mut self, contact_name: &str) -> Result<Vec<Resource>, Error> {
        let first = contact_name.split_whitespace().next().unwrap_or_default();
        let last = contact_name
            .split_whitespace()
            .next_back()
            .unwrap_or_default();

        let doc = self.all()?;
        Ok(doc
            .data
            .iter()
            .filter(|contact| {
                contact
                    .attribute_str("given_name")
                    .is_some_and(|name| name.trim() == first)
                    && contact
                        .attribute_str("family_name")
                        .is_some_and(|name| name.trim() == last)
            })
            .cloned()
            .collect())
    }

    /// Get the contact with a given ORCID (form 1234-5678-9012-3456),
    /// or `None`. Contacts without an ORCID are skipped.
    pub fn get_by_orcid(&mut self, contact_orcid: &str) -> Result<Option<Resource>, Error> {
        let doc = self.all()?;
        Ok(doc
            .data
            .iter()
            .find(|contact| {
                contact
                    .attribute_str("orcid")
                    .is_some_and(|orcid| orcid.trim() == contact_orcid.trim())
            })
            .cloned())
    }

    /// Get the contact with a given email address, or `None`.
    pub fn get_by_email(&mut self, contact_email: &str) -> Result<Option<Resource>, Error> {
        let doc = self.all()?;
        Ok(doc
            .data
            .iter()
            .find(|contact| {
                contact
                    .attribute_str("email")
                    .is_some_and(|email| email.trim() == contact_email.trim())
            })
            .cloned())
    }
}
