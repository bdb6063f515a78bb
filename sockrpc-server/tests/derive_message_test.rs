//! `#[derive(Message)]` tests

use serde::{Deserialize, Serialize};
use sockrpc_core::{Message, ResponseType};
use sockrpc_macros::Message;

#[derive(Debug, Serialize, Deserialize, Message)]
struct Plain {
    id: u32,
}

#[derive(Debug, Serialize, Deserialize, Message)]
#[message(package = "inventory.v1")]
struct Item {
    sku: String,
}

#[derive(Debug, Serialize, Deserialize, Message)]
#[message(name = "legacy.ItemRecord")]
struct LegacyItem {
    sku: String,
}

#[test]
fn test_default_name_is_type_name() {
    assert_eq!(Plain::NAME, "Plain");
}

#[test]
fn test_package_prefixes_name() {
    assert_eq!(Item::NAME, "inventory.v1.Item");
}

#[test]
fn test_explicit_name() {
    assert_eq!(LegacyItem::NAME, "legacy.ItemRecord");
}

#[test]
fn test_derived_name_reaches_response_type() {
    let expected = ResponseType::of::<Item>();

    let err = expected
        .check(std::any::TypeId::of::<LegacyItem>(), LegacyItem::NAME)
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Expected response to be of type inventory.v1.Item but was legacy.ItemRecord"
    );
}
