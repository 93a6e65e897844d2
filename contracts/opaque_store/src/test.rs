extern crate std;

use soroban_sdk::{Bytes, Env, String};

use crate::{OpaqueStore, OpaqueStoreClient};

fn setup() -> (Env, OpaqueStoreClient<'static>) {
    let env = Env::default();
    let contract_id = env.register(OpaqueStore, ());
    let client = OpaqueStoreClient::new(&env, &contract_id);
    (env, client)
}

#[test]
fn test_is_available() {
    let (_env, client) = setup();
    assert!(client.is_available());
}

#[test]
fn test_unset_key_returns_empty_bytes() {
    let (env, client) = setup();
    let value = client.get_data(&String::from_str(&env, "project_keys"));
    assert_eq!(value.len(), 0);
}

#[test]
fn test_set_then_get() {
    let (env, client) = setup();
    let key = String::from_str(&env, "project_proj-1-abcd");
    let payload = Bytes::from_slice(&env, br#"{"name":"Reef"}"#);

    client.set_data(&key, &payload);

    assert_eq!(client.get_data(&key), payload);
}

#[test]
fn test_set_overwrites_previous_value() {
    let (env, client) = setup();
    let key = String::from_str(&env, "forum_keys");

    client.set_data(&key, &Bytes::from_slice(&env, br#"["post-1"]"#));
    client.set_data(&key, &Bytes::from_slice(&env, br#"["post-1","post-2"]"#));

    assert_eq!(
        client.get_data(&key),
        Bytes::from_slice(&env, br#"["post-1","post-2"]"#)
    );
}

#[test]
fn test_keys_are_independent() {
    let (env, client) = setup();
    let a = String::from_str(&env, "project_a");
    let b = String::from_str(&env, "project_b");

    client.set_data(&a, &Bytes::from_slice(&env, b"a"));

    assert_eq!(client.get_data(&a), Bytes::from_slice(&env, b"a"));
    assert_eq!(client.get_data(&b).len(), 0);
}
