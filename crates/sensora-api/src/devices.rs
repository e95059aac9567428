// Device accessor
//
// Fetching, searching, updating, and creating devices. Name and pattern
// lookups are served from a memoized snapshot of the full collection;
// id lookups and mutations always issue a fresh request. There is no
// snapshot invalidation -- call `refresh` to re-fetch.

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::AuthContext;
use crate::client::RegistryClient;
use crate::error::Error;
use crate::models::{CollectionDocument, Envelope, EntityRef, Resource, ResourceDocument};
use crate::validate::{
    check_allowed, check_required, classify_visibility, fill_visibility_defaults,
    DEVICE_ATTRIBUTES,
};

/// Accessor for the `/devices` collection.
///
/// Holds a lazily-populated snapshot of all devices; `get_by_name` and
/// `find_by_pattern` search the snapshot without re-querying.
pub struct Devices {
    client: RegistryClient,
    snapshot: Option<CollectionDocument>,
}

impl Devices {
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

    /// Fetch all devices and replace the snapshot.
    ///
    /// `GET /devices`
    pub fn refresh(&mut self) -> Result<&CollectionDocument, Error> {
        let doc: CollectionDocument = self.client.get("/devices", "get devices")?;
        Ok(&*self.snapshot.insert(doc))
    }

    /// All devices, fetching the snapshot first if absent.
    pub fn all(&mut self) -> Result<&CollectionDocument, Error> {
        if self.snapshot.is_none() {
            return self.refresh();
        }
        Ok(self.snapshot.as_ref().expect("snapshot just checked"))
    }

    /// Get a single device by id. Always issues a fresh request; the
    /// snapshot is not consulted.
    ///
    /// `GET /devices/{id}`
    pub fn get_by_id(&self, device_id: &str) -> Result<Resource, Error> {
        let doc: ResourceDocument = self
            .client
            .get(&format!("/devices/{device_id}"), "get device")?;
        Ok(doc.data)
    }

    /// Get the first device whose `short_name` matches exactly.
    pub fn get_by_name(&mut self, device_name: &str) -> Result<Resource, Error> {
        let doc = self.all()?;
        doc.data
            .iter()
            .find(|device| device.attribute_str("short_name") == Some(device_name))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                entity: "device",
                query: device_name.to_owned(),
            })
    }

    /// Get every device whose `short_name` matches a regex pattern.
    /// Matches are anchored at the start of the name. Fails with
    /// `NotFound` when nothing matches.
    pub fn find_by_pattern(&mut self, pattern: &str) -> Result<Vec<Resource>, Error> {
        let re = Regex::new(pattern)?;
        let doc = self.all()?;

        let devices: Vec<Resource> = doc
            .data
            .iter()
            .filter(|device| {
                device
                    .attribute_str("short_name")
                    .is_some_and(|name| re.find(name).is_some_and(|m| m.start() == 0))
            })
            .cloned()
            .collect();

        if devices.is_empty() {
            return Err(Error::NotFound {
                entity: "device",
                query: pattern.to_owned(),
            });
        }
        Ok(devices)
    }

    /// Get the properties of a device identified by id, name, or both.
    ///
    /// `GET /device-properties?filter[device_id]={id}`
    pub fn properties(&mut self, device: EntityRef<'_>) -> Result<CollectionDocument, Error> {
        let device_id = self.resolve_id(device)?;
        self.client.get_with_params(
            "/device-properties",
            &[("filter[device_id]", device_id.as_str())],
            "get device properties",
        )
    }

    /// All devices carrying a given property, as ids (`return_ids`) or
    /// as short names resolved through `get_by_id`.
    ///
    /// `GET /device-properties?filter[property_name]={property}`
    pub fn by_property(&self, property: &str, return_ids: bool) -> Result<Vec<String>, Error> {
        let doc: CollectionDocument = self.client.get_with_params(
            "/device-properties",
            &[("filter[property_name]", property)],
            "get device properties",
        )?;

        let mut devices = Vec::new();
        for entry in &doc.data {
            let Some(device_id) = entry.related_id("device") else {
                continue;
            };
            if return_ids {
                devices.push(device_id.to_owned());
            } else if let Some(name) = self.get_by_id(device_id)?.attribute_str("short_name") {
                devices.push(name.to_owned());
            }
        }
        Ok(devices)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Update attributes of a device by id.
    ///
    /// Attribute keys are checked against the device allow-list before
    /// any request is issued.
    ///
    /// `PATCH /devices/{id}`
    pub fn update_by_id(
        &self,
        device_id: &str,
        attributes: &Map<String, Value>,
    ) -> Result<(), Error> {
        check_allowed(attributes, DEVICE_ATTRIBUTES)?;

        debug!(id = device_id, "updating device");
        self.client.patch(
            &format!("/devices/{device_id}"),
            &Envelope::update("device", device_id, attributes),
            &format!("update device {device_id}"),
        )
    }

    /// Update attributes of a device by short name, resolving the id
    /// through the snapshot.
    pub fn update_by_name(
        &mut self,
        device_name: &str,
        attributes: &Map<String, Value>,
    ) -> Result<(), Error> {
        check_allowed(attributes, DEVICE_ATTRIBUTES)?;

        let device_id = self.get_by_name(device_name)?.id;
        self.update_by_id(&device_id, attributes)
    }

    /// Add a new device.
    ///
    /// Visibility flags the caller omitted are filled with `false`, the
    /// set is classified, and the attribute keys are checked against
    /// the allow-list and the classified visibility's minimum-required
    /// set -- all before any request is issued.
    ///
    /// `POST /devices`
    pub fn create(&self, mut attributes: Map<String, Value>) -> Result<(), Error> {
        fill_visibility_defaults(&mut attributes);
        let visibility = classify_visibility(&attributes)?;
        check_allowed(&attributes, DEVICE_ATTRIBUTES)?;
        check_required(&attributes, visibility)?;

        debug!(%visibility, "adding device");
        self.client.post(
            "/devices",
            &Envelope::create("device", &attributes),
            "add new device",
        )
    }

    // ── Identifier resolution ────────────────────────────────────────

    /// Resolve an [`EntityRef`] to a device id, cross-checking when
    /// both an id and a name are supplied.
    fn resolve_id(&mut self, device: EntityRef<'_>) -> Result<String, Error> {
        match device {
            EntityRef::Id(id) => Ok(id.to_owned()),
            EntityRef::Name(name) => Ok(self.get_by_name(name)?.id),
            EntityRef::IdAndName { id, name } => {
                let device = self.get_by_id(id)?;
                if device.attribute_str("short_name") != Some(name) {
                    return Err(Error::IdentifierMismatch {
                        entity: "device",
                        id: id.to_owned(),
                        name: name.to_owned(),
                    });
                }
                Ok(id.to_owned())
            }
        }
    }
}
