//! Shape checks for fetched inventory documents
//!
//! These predicates gate what may enter the inventory cache. Content
//! documents have no validator of their own; their shape is decided by the
//! owning item's type (see [`super::Content::from_document`]).

use serde_json::{Map, Value};

use super::{ContentType, InventoryItem};

/// Looks up a field by its current name, falling back to the legacy name
fn field<'a>(obj: &'a Map<String, Value>, name: &str, legacy: &str) -> Option<&'a Value> {
    obj.get(name).or_else(|| obj.get(legacy))
}

/// Returns true if `value` looks like a single inventory item
///
/// Requires an object with a string title, a type of `"Flash"` or `"Quizz"`,
/// a string game and a non-empty string url.
pub fn is_valid_inventory_item(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    let title_ok = field(obj, "title", "titre").is_some_and(Value::is_string);
    let type_ok = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(ContentType::from_wire)
        .is_some();
    let game_ok = field(obj, "game", "jeux").is_some_and(Value::is_string);
    let url_ok = obj
        .get("url")
        .and_then(Value::as_str)
        .is_some_and(|url| !url.is_empty());

    title_ok && type_ok && game_ok && url_ok
}

/// Returns true if `value` is a non-empty array of valid inventory items
///
/// An empty array is rejected: an inventory with nothing in it is treated
/// as a broken document, not as "no content".
pub fn is_valid_inventory(value: &Value) -> bool {
    match value.as_array() {
        Some(items) if !items.is_empty() => items.iter().all(is_valid_inventory_item),
        _ => false,
    }
}

/// Typed counterpart of [`is_valid_inventory`]
///
/// Field types are already enforced by decoding, so only the emptiness
/// rules remain to be checked.
pub fn is_valid_inventory_items(items: &[InventoryItem]) -> bool {
    !items.is_empty() && items.iter().all(|item| !item.url.is_empty())
}
