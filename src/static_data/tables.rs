//! On-disk JSON shapes for the bundled static data assets (spec.md §4.1).

use serde::Deserialize;
use std::collections::HashMap;

/// `(name, mask)` pair as it appears in the room/screen/byte mask tables.
pub type NameMask = (String, u16);

/// `locationInfoByRoom[kind][roomId] -> [(name, mask)]` for the
/// `base`/`pots`/`sprites`/`misc`/`bosses` region kinds, and
/// `locationInfoByOwScreen["bonk_prizes"][screenId] -> [(name, mask)]`.
#[derive(Debug, Default, Deserialize)]
pub struct LocationInfoByKey {
    #[serde(flatten)]
    pub kinds: HashMap<String, HashMap<u16, Vec<NameMask>>>,
}

/// `locationInfoReversed[kind][memLoc] -> name` for `overworld`, `npcs`,
/// `shops`.
#[derive(Debug, Default, Deserialize)]
pub struct LocationInfoReversed {
    #[serde(flatten)]
    pub kinds: HashMap<String, HashMap<u16, String>>,
}

/// Raw shape of the bundled `location_info.json` asset.
#[derive(Debug, Default, Deserialize)]
pub struct LocationInfoAsset {
    pub by_room: LocationInfoByKey,
    pub by_ow_screen: LocationInfoByKey,
    pub reversed: LocationInfoReversed,
    /// `lookupNameToId[locationName] -> locationId` (spec.md §4.1) — maps a
    /// name emitted by the differ back to the numeric id the placement
    /// table is keyed on.
    #[serde(default)]
    pub lookup_name_to_id: HashMap<String, i64>,
}

/// Raw shape of the bundled `items.json` asset.
#[derive(Debug, Default, Deserialize)]
pub struct ItemTableAsset {
    /// item id -> item name
    pub items: HashMap<i64, String>,
}
