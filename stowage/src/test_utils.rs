use std::time::Duration;

use crate::stowage::now_millis;
use crate::{dev::*, *};

fn prefixed(key: &str) -> String {
    format!("{}{}", DEFAULT_PREFIX, key)
}

/// Read and decode the persisted expiry index straight from the medium
fn read_index<M: Medium>(medium: &M) -> Vec<ExpiryRecord> {
    let raw = medium
        .get_item(&prefixed(EXPIRY_KEY))
        .unwrap()
        .expect("expiry index entry should exist");
    match Value::decode(raw) {
        Value::Structured(value) => serde_json::from_value(value).unwrap(),
        other => panic!("expiry index should be a structured value, got {:?}", other),
    }
}

/// Testing the raw contract of a medium: string in, string out, counted,
/// removable, clearable
pub fn test_medium<M: Medium>(medium: M) {
    assert!(medium.get_item("key").unwrap().is_none());
    assert_eq!(medium.len().unwrap(), 0);

    assert!(medium.set_item("key", "val").is_ok());
    assert_eq!(medium.get_item("key").unwrap().as_deref(), Some("val"));
    assert_eq!(medium.len().unwrap(), 1);

    // Second set overwrites, it doesn't add an entry
    assert!(medium.set_item("key", "val2").is_ok());
    assert_eq!(medium.get_item("key").unwrap().as_deref(), Some("val2"));
    assert_eq!(medium.len().unwrap(), 1);

    assert!(medium.remove_item("key").is_ok());
    assert!(medium.get_item("key").unwrap().is_none());

    // Removing an absent key is a no-op, not an error
    assert!(medium.remove_item("key").is_ok());

    assert!(medium.set_item("key1", "val").is_ok());
    assert!(medium.set_item("key2", "val").is_ok());
    assert!(medium.clear().is_ok());
    assert_eq!(medium.len().unwrap(), 0);
}

pub fn test_store<M: 'static + Medium>(medium: M) {
    let store = Stowage::build().medium(medium).finish();
    let key = "store_key";
    let value = "val";

    assert!(store.set(key, value).is_ok());

    let get_res = store.get::<String>(key);
    assert!(get_res.is_ok());
    assert_eq!(get_res.unwrap(), Some(value.to_owned()));

    let has_res = store.has(key);
    assert!(has_res.is_ok());
    assert!(has_res.unwrap());

    assert!(store.remove(key).is_ok());

    // A removed or never set key reads back as None, not an error
    assert_eq!(store.get::<String>(key).unwrap(), None);
    assert_eq!(store.get_value("never_set").unwrap(), None);
    assert!(!store.has(key).unwrap());
}

pub fn test_store_values<M: 'static + Medium>(medium: M) {
    let store = Stowage::build().medium(medium).finish();

    // Numbers come back as numbers
    assert!(store.set("score", 42).is_ok());
    assert_eq!(store.get::<i64>("score").unwrap(), Some(42));
    assert_eq!(store.get_value("score").unwrap(), Some(Value::Number(42.0)));

    assert!(store.set("ratio", 13.37).is_ok());
    assert_eq!(store.get::<f64>("ratio").unwrap(), Some(13.37));

    // Strings come back as strings, even when they look numeric
    assert!(store.set("answer", "42").is_ok());
    assert_eq!(
        store.get_value("answer").unwrap(),
        Some(Value::String("42".to_owned()))
    );

    // Structured values come back deep-equal
    let cfg = serde_json::json!({"a": 1, "nested": {"list": [1, "two", null]}});
    assert!(store.set("cfg", cfg.clone()).is_ok());
    assert_eq!(store.get::<serde_json::Value>("cfg").unwrap(), Some(cfg));

    // Typed get with a mismatched type is an error, the value stays put
    assert!(store.get::<f64>("answer").is_err());
    assert!(store.has("answer").unwrap());
}

pub fn test_namespacing<M: 'static + Medium + Clone>(medium: M) {
    let store = Stowage::build().medium(medium.clone()).finish();

    assert!(store.set("key", "val").is_ok());
    assert_eq!(
        medium.get_item("localstorage:key").unwrap().as_deref(),
        Some("s:val")
    );

    // Two prefixes over one medium don't collide
    let other = Stowage::build()
        .medium(medium.clone())
        .prefix("other:")
        .finish();
    assert!(other.set("key", "other val").is_ok());
    assert_eq!(store.get::<String>("key").unwrap(), Some("val".to_owned()));
    assert_eq!(
        other.get::<String>("key").unwrap(),
        Some("other val".to_owned())
    );

    // is_empty doesn't care about prefixes: an entry written behind the
    // facade's back still counts
    assert!(store.clear().is_ok());
    assert!(store.is_empty().unwrap());
    assert!(medium.set_item("unrelated", "x").is_ok());
    assert!(!store.is_empty().unwrap());
}

pub fn test_expiry<M: 'static + Medium + Clone>(medium: M) {
    let store = Stowage::build().medium(medium).finish();
    let now = now_millis();

    // A key expired in the past is gone on the next read
    assert!(store.set("temp", 1).is_ok());
    assert!(store.expire_at("temp", now - 1).is_ok());
    assert!(!store.has("temp").unwrap());
    assert_eq!(store.get_value("temp").unwrap(), None);

    // A key expiring far in the future is not evicted prematurely
    assert!(store.set("keep", 1).is_ok());
    assert!(store.expire("keep", Duration::from_secs(10_000)).is_ok());
    assert!(store.has("keep").unwrap());
    assert_eq!(store.get::<i64>("keep").unwrap(), Some(1));

    // Expiring a key that doesn't exist is fine, the sweep's removal is
    // a no-op
    assert!(store.expire_at("never_set", now - 1).is_ok());
    assert!(store.has("keep").unwrap());

    // The relative form takes effect once the delay passes
    assert!(store.set("short", 1).is_ok());
    assert!(store.expire("short", Duration::from_millis(50)).is_ok());
    assert!(store.has("short").unwrap());
    std::thread::sleep(Duration::from_millis(100));
    assert!(!store.has("short").unwrap());
}

pub fn test_expiry_ordering<M: 'static + Medium + Clone>(medium: M) {
    let store = Stowage::build().medium(medium.clone()).finish();
    let base = now_millis() + 100_000;

    assert!(store.expire_at("c", base + 30).is_ok());
    assert!(store.expire_at("a", base + 10).is_ok());
    assert!(store.expire_at("b", base + 20).is_ok());
    // Duplicate records for one key both stay in the index
    assert!(store.expire_at("a", base + 40).is_ok());

    let records = read_index(&medium);
    assert_eq!(records.len(), 4);
    assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(records[0].key, "a");
    assert_eq!(records[3].key, "a");
}

pub fn test_lazy_sweep<M: 'static + Medium + Clone>(medium: M) {
    let store = Stowage::build().medium(medium.clone()).finish();
    let now = now_millis();

    assert!(store.set("temp", 1).is_ok());
    assert!(store.expire_at("temp", now - 1).is_ok());

    // Past due, but physically still there: neither expire_at nor the time
    // passing sweeps anything
    assert!(medium.get_item("localstorage:temp").unwrap().is_some());

    // A read of a completely different key evicts it
    assert!(!store.has("some_other_key").unwrap());
    assert!(medium.get_item("localstorage:temp").unwrap().is_none());

    // The index entry survives the sweep, emptied rather than deleted
    assert!(read_index(&medium).is_empty());
}

pub fn test_clear<M: 'static + Medium + Clone>(medium: M) {
    let store = Stowage::build().medium(medium.clone()).finish();

    assert!(store.set("key", "val").is_ok());
    assert!(store.expire("key", Duration::from_secs(10_000)).is_ok());
    assert!(medium.set_item("unrelated", "x").is_ok());
    assert!(!store.is_empty().unwrap());

    // clear is a full medium reset: prefixed entries, the expiry index and
    // foreign entries all go
    assert!(store.clear().is_ok());
    assert!(store.is_empty().unwrap());
    assert_eq!(store.get::<String>("key").unwrap(), None);
    assert!(medium.get_item("unrelated").unwrap().is_none());
    assert!(medium
        .get_item(&prefixed(EXPIRY_KEY))
        .unwrap()
        .is_none());
}
