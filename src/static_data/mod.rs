//! Immutable lookup tables: item/location id↔name, SRAM region maps
//! (spec.md §4.1).
//!
//! Loaded once at startup from JSON assets bundled into the binary with
//! `include_str!`, the same "ship the data with the binary" approach the
//! teacher uses `embeddy` for with its dashboard assets. A missing key during
//! lookup is logged and skipped — never fatal.

pub mod tables;

use log::warn;
use std::collections::HashMap;

use tables::{ItemTableAsset, LocationInfoAsset, NameMask};

const LOCATION_INFO_JSON: &str = include_str!("../../assets/location_info.json");
const ITEMS_JSON: &str = include_str!("../../assets/items.json");

/// The region kinds addressed by `locationInfoByRoom`/`locationInfoReversed`.
pub mod region {
    pub const BASE: &str = "base";
    pub const POTS: &str = "pots";
    pub const SPRITES: &str = "sprites";
    pub const MISC: &str = "misc";
    pub const BOSSES: &str = "bosses";
    pub const OVERWORLD: &str = "overworld";
    pub const NPCS: &str = "npcs";
    pub const SHOPS: &str = "shops";
    pub const BONK_PRIZES: &str = "bonk_prizes";
}

/// The immutable static data tables, built once at startup.
pub struct StaticData {
    by_room: HashMap<String, HashMap<u16, Vec<NameMask>>>,
    by_ow_screen: HashMap<String, HashMap<u16, Vec<NameMask>>>,
    reversed: HashMap<String, HashMap<u16, String>>,
    id_to_name: HashMap<i64, String>,
    name_to_id: HashMap<String, i64>,
    location_name_to_id: HashMap<String, i64>,
}

impl StaticData {
    /// Parses the bundled assets. Logs and continues on a malformed asset —
    /// region/item tables are best-effort lookup data, not load-bearing for
    /// the process to start.
    pub fn load() -> Self {
        let location_info: LocationInfoAsset = serde_json::from_str(LOCATION_INFO_JSON)
            .unwrap_or_else(|err| {
                warn!("malformed bundled location_info.json, starting empty: {err}");
                LocationInfoAsset::default()
            });

        let items: ItemTableAsset = serde_json::from_str(ITEMS_JSON).unwrap_or_else(|err| {
            warn!("malformed bundled items.json, starting empty: {err}");
            ItemTableAsset::default()
        });

        let mut name_to_id = HashMap::with_capacity(items.items.len());
        for (id, name) in &items.items {
            name_to_id.insert(name.clone(), *id);
        }

        Self {
            by_room: location_info.by_room.kinds,
            by_ow_screen: location_info.by_ow_screen.kinds,
            reversed: location_info.reversed.kinds,
            id_to_name: items.items,
            name_to_id,
            location_name_to_id: location_info.lookup_name_to_id,
        }
    }

    /// `locationInfoByRoom[kind][roomId]`, or an empty slice if the kind or
    /// room is unregistered.
    pub fn by_room(&self, kind: &str, room_id: u16) -> &[NameMask] {
        self.by_room
            .get(kind)
            .and_then(|rooms| rooms.get(&room_id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `locationInfoByOwScreen["bonk_prizes"][screenId]`.
    pub fn bonk_prizes(&self, screen_id: u16) -> &[NameMask] {
        self.by_ow_screen
            .get(region::BONK_PRIZES)
            .and_then(|screens| screens.get(&screen_id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `locationInfoReversed[kind][memLoc]`.
    pub fn reversed(&self, kind: &str, mem_loc: u16) -> Option<&str> {
        self.reversed
            .get(kind)
            .and_then(|locs| locs.get(&mem_loc))
            .map(String::as_str)
    }

    pub fn item_name(&self, item_id: i64) -> Option<&str> {
        self.id_to_name.get(&item_id).map(String::as_str)
    }

    pub fn item_id(&self, name: &str) -> Option<i64> {
        self.name_to_id.get(name).copied()
    }

    /// `lookupNameToId[name]` — the numeric location id a placement table
    /// entry is keyed on, for a name the differ just emitted.
    pub fn location_id(&self, name: &str) -> Option<i64> {
        self.location_name_to_id.get(name).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn load_does_not_panic_on_bundled_assets() {
        let data = StaticData::load();
        assert!(!data.id_to_name.is_empty());
    }

    #[test]
    fn missing_lookup_returns_empty_not_panic() {
        let data = StaticData::load();
        assert!(data.by_room(region::BASE, 0xFFFF).is_empty());
        assert!(data.reversed(region::OVERWORLD, 0xFFFF).is_none());
        assert!(data.item_name(i64::MAX).is_none());
    }
}
