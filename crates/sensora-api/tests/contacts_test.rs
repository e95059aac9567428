// Integration tests for the contact accessor against a local mock server.

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use sensora_api::{AuthContext, Contacts, RegistryClient};
use secrecy::SecretString;

fn contacts_for(server: &MockServer) -> Contacts {
    let client = RegistryClient::with_base_url(
        server.base_url().parse().unwrap(),
        AuthContext::resolve(Some(SecretString::from("test-key".to_owned()))),
    )
    .unwrap();
    Contacts::with_client(client)
}

fn contact_collection() -> serde_json::Value {
    json!({
        "data": [
            {
                "id": "1",
                "type": "contact",
                "attributes": {
                    "given_name": "Ada",
                    "family_name": "Lovelace",
                    "email": "ada@example.org",
                    "orcid": "0000-0001-2345-6789"
                }
            },
            {
                "id": "2",
                "type": "contact",
                "attributes": {
                    "given_name": "Ada ",
                    "family_name": " Lovelace",
                    "email": "ada.l@example.org",
                    "orcid": null
                }
            },
            {
                "id": "3",
                "type": "contact",
                "attributes": {
                    "given_name": "Grace",
                    "family_name": "Hopper",
                    "email": "grace@example.org",
                    "orcid": "0000-0002-0000-0000"
                }
            }
        ]
    })
}

#[test]
fn name_search_returns_every_match() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET).path("/contacts");
        then.status(200).json_body(contact_collection());
    });

    let mut contacts = contacts_for(&server);

    // Both Ada records match: name fields are compared trimmed.
    let matched = contacts.get_by_name("Ada Lovelace").unwrap();
    assert_eq!(matched.len(), 2);

    // No match is an empty list, not a failure.
    let matched = contacts.get_by_name("Alan Turing").unwrap();
    assert!(matched.is_empty());

    assert_eq!(list.calls(), 1);
}

#[test]
fn orcid_lookup_skips_contacts_without_one() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/contacts");
        then.status(200).json_body(contact_collection());
    });

    let mut contacts = contacts_for(&server);

    let found = contacts.get_by_orcid(" 0000-0002-0000-0000 ").unwrap();
    assert_eq!(found.unwrap().id, "3");

    let missing = contacts.get_by_orcid("9999-9999-9999-9999").unwrap();
    assert!(missing.is_none());
}

#[test]
fn email_lookup_returns_at_most_one() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/contacts");
        then.status(200).json_body(contact_collection());
    });

    let mut contacts = contacts_for(&server);

    let found = contacts.get_by_email("grace@example.org").unwrap();
    assert_eq!(found.unwrap().id, "3");

    let missing = contacts.get_by_email("nobody@example.org").unwrap();
    assert!(missing.is_none());
}

#[test]
fn get_by_id_returns_the_nested_resource() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/contacts/3");
        then.status(200).json_body(json!({
            "data": {
                "id": "3",
                "type": "contact",
                "attributes": { "given_name": "Grace", "family_name": "Hopper" }
            }
        }));
    });

    let contacts = contacts_for(&server);
    let contact = contacts.get_by_id("3").unwrap();
    assert_eq!(contact.attribute_str("family_name"), Some("Hopper"));
}
