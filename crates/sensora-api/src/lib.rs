// sensora-api: Blocking Rust client for the sensor metadata registry
// (devices, sites, contacts, users, permission groups) over JSON:API.

pub mod auth;
pub mod client;
pub mod contacts;
pub mod devices;
pub mod error;
pub mod models;
pub mod sites;
pub mod user;
pub mod validate;

pub use auth::{AuthContext, API_KEY_ENV};
pub use client::{RegistryClient, DEFAULT_BASE_URL};
pub use contacts::Contacts;
pub use devices::Devices;
pub use error::Error;
pub use models::{CollectionDocument, EntityRef, Resource, ResourceDocument};
pub use sites::Sites;
pub use user::UserInfo;
pub use validate::Visibility;
