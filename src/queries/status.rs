//! Status and outfit replies

use uuid::Uuid;

use crate::core::{AttachmentPoint, WearableType};
use crate::inventory::InventoryItem;
use crate::restrictions::RestrictionStore;

/// `getstatus[:filter[;sep]]` / `getstatusall[...]`.
///
/// Each matching entry is written as `<sep><command>[:<param>]`, in the order
/// the entries were added. `sender` limits the reply to one sender.
pub fn get_status(store: &RestrictionStore, sender: Option<Uuid>, option: Option<&str>) -> String {
    let (filter, separator) = match option.and_then(|o| o.split_once(';')) {
        Some((f, s)) if !s.is_empty() => (f, s),
        Some((f, _)) => (f, "/"),
        None => (option.unwrap_or(""), "/"),
    };

    store
        .all()
        .into_iter()
        .filter(|r| sender.map_or(true, |s| r.sender == s))
        .map(|r| r.status_key())
        .filter(|key| filter.is_empty() || key.contains(filter))
        .map(|key| format!("{}{}", separator, key))
        .collect()
}

/// `getblacklist[:filter]`: configured blacklist entries, comma-joined
pub fn get_blacklist(blacklist: &[String], filter: Option<&str>) -> String {
    blacklist
        .iter()
        .filter(|b| filter.map_or(true, |f| b.contains(f)))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn flag(on: bool) -> char {
    if on {
        '1'
    } else {
        '0'
    }
}

/// `getoutfit[:layer]`: `1`/`0` per layer in `WearableType::ALL` order
pub fn get_outfit(outfit: &[InventoryItem], layer: Option<WearableType>) -> String {
    let worn = |l: WearableType| outfit.iter().any(|i| i.worn_on == Some(l));
    match layer {
        Some(l) => flag(worn(l)).to_string(),
        None => WearableType::ALL.iter().map(|l| flag(worn(*l))).collect(),
    }
}

/// `getattach[:point]`: `1`/`0` per attachment point in id order
pub fn get_attach(outfit: &[InventoryItem], point: Option<AttachmentPoint>) -> String {
    let used = |p: AttachmentPoint| outfit.iter().any(|i| i.attached_to == Some(p));
    match point {
        Some(p) => flag(used(p)).to_string(),
        None => AttachmentPoint::ALL.iter().map(|p| flag(used(*p))).collect(),
    }
}
