// Attribute validation
//
// Pure checks that run before mutating calls: the per-entity attribute
// allow-lists, the visibility classification derived from the three
// mutually-exclusive flags, and the visibility-dependent
// minimum-required sets for device creation. No I/O here.

use serde_json::{Map, Value};

use crate::error::Error;

// ── Allow-lists ──────────────────────────────────────────────────────

/// Attribute names the backend recognizes on a device.
pub const DEVICE_ATTRIBUTES: &[&str] = &[
    "description",
    "short_name",
    "long_name",
    "serial_number",
    "manufacturer_uri",
    "manufacturer_name",
    "device_type_uri",
    "device_type_name",
    "status_uri",
    "status_name",
    "model",
    "inventory_number",
    "schema_version",
    "identifer_type",
    "website",
    "group_ids",
    "is_private",
    "is_internal",
    "is_public",
    "keywords",
    "country",
];

/// Attribute names the backend recognizes on a site.
pub const SITE_ATTRIBUTES: &[&str] = &[
    "label",
    "geometry",
    "description",
    "epsg_code",
    "is_internal",
    "is_public",
    "group_ids",
    "street",
    "street_number",
    "city",
    "zip_code",
    "country",
    "building",
    "room",
    "site_type_uri",
    "site_type_name",
    "site_usage_uri",
    "site_usage_name",
    "elevation",
    "elevation_datum_name",
    "elevation_datum_uri",
    "website",
    "keywords",
];

/// Minimum attributes for creating a private device.
pub const MIN_PRIVATE_DEVICE_ATTRIBUTES: &[&str] = &[
    "short_name",
    "manufacturer_name",
    "is_private",
    "is_internal",
    "is_public",
];

/// Minimum attributes for creating an internal device: the private set
/// plus `group_ids`.
pub const MIN_INTERNAL_DEVICE_ATTRIBUTES: &[&str] = &[
    "short_name",
    "manufacturer_name",
    "is_private",
    "is_internal",
    "is_public",
    "group_ids",
];

/// Minimum attributes for creating a public device. The backend
/// requires nothing beyond the internal set.
pub const MIN_PUBLIC_DEVICE_ATTRIBUTES: &[&str] = MIN_INTERNAL_DEVICE_ATTRIBUTES;

/// The three visibility flags, in the order conflicts are reported.
pub const VISIBILITY_FLAGS: [&str; 3] = ["is_public", "is_internal", "is_private"];

// ── Visibility ───────────────────────────────────────────────────────

/// Visibility class of a device, derived from exactly one of the three
/// flags being true. Governs which minimum attribute set applies at
/// creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

impl Visibility {
    /// The flag attribute that selects this class.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Private => "is_private",
            Self::Internal => "is_internal",
            Self::Public => "is_public",
        }
    }

    /// Minimum attributes required to create a device of this class.
    pub fn required_attributes(self) -> &'static [&'static str] {
        match self {
            Self::Private => MIN_PRIVATE_DEVICE_ATTRIBUTES,
            Self::Internal => MIN_INTERNAL_DEVICE_ATTRIBUTES,
            Self::Public => MIN_PUBLIC_DEVICE_ATTRIBUTES,
        }
    }

    fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "is_private" => Some(Self::Private),
            "is_internal" => Some(Self::Internal),
            "is_public" => Some(Self::Public),
            _ => None,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        })
    }
}

// ── Checks ───────────────────────────────────────────────────────────

/// Check every proposed attribute key against an allow-list.
///
/// Reports all offending keys at once. The empty attribute set passes.
pub fn check_allowed(attributes: &Map<String, Value>, allowed: &[&str]) -> Result<(), Error> {
    let invalid: Vec<String> = attributes
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .cloned()
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidAttribute { names: invalid })
    }
}

/// Coerce a visibility flag value to a boolean.
///
/// Booleans pass through; the strings true/1/false/0 (case-insensitive)
/// coerce; anything else is an error.
fn coerce_flag(name: &str, value: &Value) -> Result<bool, Error> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(Error::InvalidAttributeValue {
                name: name.to_owned(),
                value: s.clone(),
            }),
        },
        _ => Err(Error::InvalidAttributeType {
            name: name.to_owned(),
        }),
    }
}

/// Classify an attribute set as private, internal, or public.
///
/// Exactly one of the three flags must be true; a missing flag counts
/// as false. Zero true flags fails with [`Error::NoVisibilitySet`],
/// two or more with [`Error::ConflictingVisibility`] listing every
/// true flag.
pub fn classify_visibility(attributes: &Map<String, Value>) -> Result<Visibility, Error> {
    let mut true_flags = Vec::new();
    for flag in VISIBILITY_FLAGS {
        let set = match attributes.get(flag) {
            Some(value) => coerce_flag(flag, value)?,
            None => false,
        };
        if set {
            true_flags.push(flag);
        }
    }

    match true_flags.as_slice() {
        [] => Err(Error::NoVisibilitySet),
        [flag] => Ok(Visibility::from_flag(flag).unwrap_or(Visibility::Private)),
        _ => Err(Error::ConflictingVisibility {
            names: true_flags.iter().map(|f| (*f).to_owned()).collect(),
        }),
    }
}

/// Check the proposed attribute keys against the minimum-required set
/// for the classified visibility. Creation only -- updates never run
/// this check.
///
/// Reports every missing name at once.
pub fn check_required(
    attributes: &Map<String, Value>,
    visibility: Visibility,
) -> Result<(), Error> {
    let missing: Vec<String> = visibility
        .required_attributes()
        .iter()
        .filter(|name| !attributes.contains_key(**name))
        .map(|name| (*name).to_owned())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingRequiredAttributes { names: missing })
    }
}

/// Insert an explicit `false` for each visibility flag the caller
/// omitted. Runs before classification on create, so a request with no
/// flags at all fails with `NoVisibilitySet` instead of silently
/// picking a default, and the filled flags are what the backend
/// receives.
pub fn fill_visibility_defaults(attributes: &mut Map<String, Value>) {
    for flag in VISIBILITY_FLAGS {
        attributes.entry(flag).or_insert(Value::Bool(false));
    }
}
