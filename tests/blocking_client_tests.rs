//! Integration Tests for the Blocking Cache Client
//!
//! Same operations as the async client, driven from plain threads.

mod common;

use std::sync::mpsc;
use std::time::Duration;

use common::TestClass;
use redis_cache_client::{blocking, CacheError, JsonSerializer};

fn test_client(scope: &str) -> common::TestRedis<blocking::CacheClient> {
    common::connect_blocking(scope, JsonSerializer)
}

fn cleanup(client: &blocking::CacheClient) {
    if let Ok(keys) = client.search_keys("*") {
        let _ = client.remove_all(&keys);
    }
}

#[test]
fn test_blocking_add_and_get() {
    let client = test_client("blocking_add_get");

    let value = TestClass::new("my Key", "my Value".to_string());
    assert!(client.add("my Key", &value).unwrap());
    assert_eq!(client.get::<TestClass<String>>("my Key").unwrap(), Some(value));
    assert_eq!(client.get::<TestClass<String>>("missing").unwrap(), None);

    cleanup(&client);
}

#[test]
fn test_blocking_validation_errors() {
    let client = test_client("blocking_validation");

    assert!(matches!(
        client.get::<String>(""),
        Err(CacheError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.set_add("MySet", &Option::<i32>::None),
        Err(CacheError::NullArgument(_))
    ));
    assert!(matches!(
        client.list_get_from_right::<i32>(""),
        Err(CacheError::InvalidArgument(_))
    ));
}

#[test]
fn test_blocking_get_all_with_missing_key() {
    let client = test_client("blocking_get_all");

    client
        .add_all(&[("key1", 1), ("key2", 2), ("key3", 3)])
        .unwrap();
    let result = client
        .get_all::<_, i32>(&["key1", "key2", "key3", "key4"])
        .unwrap();

    assert_eq!(result.len(), 4);
    assert_eq!(result["key1"], Some(1));
    assert_eq!(result["key3"], Some(3));
    assert_eq!(result["key4"], None);

    cleanup(&client);
}

#[test]
fn test_blocking_hash_and_list() {
    let client = test_client("blocking_hash_list");

    assert!(client.hash_set("MyHash", "f", &"v1", true).unwrap());
    assert!(!client.hash_set("MyHash", "f", &"v2", true).unwrap());
    assert_eq!(client.hash_get::<String>("MyHash", "f").unwrap().as_deref(), Some("v1"));
    assert_eq!(client.hash_length("MyHash").unwrap(), 1);

    assert_eq!(client.list_add_to_left("MyList", &1).unwrap(), 1);
    assert_eq!(client.list_add_to_left("MyList", &2).unwrap(), 2);
    assert_eq!(client.list_get_from_right::<i32>("MyList").unwrap(), Some(1));

    cleanup(&client);
}

#[test]
fn test_blocking_publish_sequence_reaches_subscriber() {
    let client = test_client("blocking_pubsub");
    let channel = format!("{}numbers", client.namespace().prefix());

    let (tx, rx) = mpsc::channel();
    let subscription = client
        .subscribe(&channel, move |numbers: Vec<i32>| {
            let _ = tx.send(numbers);
        })
        .unwrap();

    let sent: Vec<i32> = (1..=10).collect();
    assert_eq!(client.publish(&channel, &sent).unwrap(), 1);

    let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(received, sent);

    subscription.unsubscribe();
}

#[test]
fn test_blocking_dispose() {
    let client = test_client("blocking_dispose");

    client.dispose();
    assert!(client.is_disposed());
    assert!(matches!(client.exists("key"), Err(CacheError::Disposed)));
}
