//! SRAM Differ (spec.md §4.2): byte-level diff between two save-RAM
//! snapshots, then per-region decoding into newly-checked location names.
//!
//! Never panics on malformed input — an unknown room, mask, or region is
//! logged and skipped, per the failure model in §4.2/§7.

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::static_data::{region, StaticData};

/// A save-RAM snapshot: region name -> raw bytes, exactly as uploaded by the
/// client in `update_memory` (spec.md §4.5).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SramSnapshot {
    #[serde(flatten)]
    pub regions: HashMap<String, Vec<u8>>,
}

impl SramSnapshot {
    fn region(&self, kind: &str) -> &[u8] {
        self.regions.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// `regionName -> {byteIndex -> newValue}`.
pub type RegionDiff = HashMap<String, HashMap<usize, u8>>;

/// Byte-level difference between `prev` and `cur`. Empty if identical.
/// A region present only in `cur` is diffed against an implicit
/// all-zero `prev`.
pub fn diff(prev: &SramSnapshot, cur: &SramSnapshot) -> RegionDiff {
    let mut out = RegionDiff::new();

    for (region_name, cur_bytes) in &cur.regions {
        let prev_bytes = prev.region(region_name);
        let mut changed = HashMap::new();
        for (idx, &cur_byte) in cur_bytes.iter().enumerate() {
            let prev_byte = prev_bytes.get(idx).copied().unwrap_or(0);
            if prev_byte != cur_byte {
                changed.insert(idx, cur_byte);
            }
        }
        if !changed.is_empty() {
            out.insert(region_name.clone(), changed);
        }
    }

    out
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    let lo = *bytes.get(offset).unwrap_or(&0) as u16;
    let hi = *bytes.get(offset + 1).unwrap_or(&0) as u16;
    lo | (hi << 8)
}

/// Decodes `diff` into the list of newly-checked location names, per the
/// region semantics of spec.md §4.2. Never panics; an unregistered room,
/// mask, or memory location is logged and skipped.
pub fn changed_locations(
    diff: &RegionDiff,
    prev: &SramSnapshot,
    cur: &SramSnapshot,
    static_data: &StaticData,
) -> Vec<String> {
    let mut out = Vec::new();

    for (region_name, bytes) in diff {
        match region_name.as_str() {
            kind @ (region::BASE | region::POTS | region::SPRITES) => {
                word_aligned_rooms(kind, bytes, prev, cur, static_data, &mut out);
            }
            region::OVERWORLD => overworld(bytes, prev, cur, static_data, &mut out),
            kind @ (region::NPCS | region::BOSSES) => {
                single_word_region(kind, prev, cur, static_data, &mut out);
            }
            region::MISC => misc(bytes, prev, cur, static_data, &mut out),
            region::SHOPS => shops(bytes, cur, static_data, &mut out),
            other => debug!("sram differ: ignoring unknown region {other}"),
        }
    }

    out
}

fn word_aligned_rooms(
    kind: &str,
    bytes: &HashMap<usize, u8>,
    prev: &SramSnapshot,
    cur: &SramSnapshot,
    static_data: &StaticData,
    out: &mut Vec<String>,
) {
    let mut visited_rooms = HashSet::new();
    for &byte_idx in bytes.keys() {
        let word_offset = byte_idx & !1;
        let room_id = (word_offset / 2) as u16;
        if !visited_rooms.insert(room_id) {
            continue;
        }

        let new_word = read_u16(cur.region(kind), word_offset);
        let prev_word = read_u16(prev.region(kind), word_offset);

        for (name, mask) in static_data.by_room(kind, room_id) {
            if newly_set(prev_word, new_word, *mask) {
                out.push(name.clone());
            }
        }
    }
}

fn single_word_region(
    kind: &str,
    prev: &SramSnapshot,
    cur: &SramSnapshot,
    static_data: &StaticData,
    out: &mut Vec<String>,
) {
    let new_word = read_u16(cur.region(kind), 0);
    let prev_word = read_u16(prev.region(kind), 0);

    for (name, mask) in static_data.by_room(kind, 0) {
        if newly_set(prev_word, new_word, *mask) {
            out.push(name.clone());
        }
    }
}

fn overworld(
    bytes: &HashMap<usize, u8>,
    prev: &SramSnapshot,
    cur: &SramSnapshot,
    static_data: &StaticData,
    out: &mut Vec<String>,
) {
    const CHECKED_BIT: u8 = 0x40;

    for &byte_idx in bytes.keys() {
        let screen_id = byte_idx as u16;
        let new_byte = cur.region(region::OVERWORLD).get(byte_idx).copied().unwrap_or(0);
        let prev_byte = prev.region(region::OVERWORLD).get(byte_idx).copied().unwrap_or(0);

        if newly_set(prev_byte as u16, new_byte as u16, CHECKED_BIT as u16) {
            match static_data.reversed(region::OVERWORLD, screen_id) {
                Some(name) => out.push(name.to_string()),
                None => debug!("sram differ: unregistered overworld screen {screen_id}"),
            }
        }

        for (name, mask) in static_data.bonk_prizes(screen_id) {
            if newly_set(prev_byte as u16, new_byte as u16, *mask) {
                out.push(name.clone());
            }
        }
    }
}

fn misc(
    bytes: &HashMap<usize, u8>,
    prev: &SramSnapshot,
    cur: &SramSnapshot,
    static_data: &StaticData,
    out: &mut Vec<String>,
) {
    for &byte_idx in bytes.keys() {
        let new_byte = cur.region(region::MISC).get(byte_idx).copied().unwrap_or(0);
        let prev_byte = prev.region(region::MISC).get(byte_idx).copied().unwrap_or(0);

        for (name, mask) in static_data.by_room(region::MISC, byte_idx as u16) {
            if newly_set(prev_byte as u16, new_byte as u16, *mask) {
                out.push(name.clone());
            }
        }
    }
}

fn shops(bytes: &HashMap<usize, u8>, cur: &SramSnapshot, static_data: &StaticData, out: &mut Vec<String>) {
    for (&byte_idx, &new_byte) in bytes {
        if new_byte == 0 {
            continue;
        }
        let mem_loc = byte_idx as u16;
        match static_data.reversed(region::SHOPS, mem_loc) {
            Some(name) => out.push(name.to_string()),
            None => debug!("sram differ: unregistered shop byte {mem_loc}"),
        }
        let _ = cur.region(region::SHOPS);
    }
}

/// True iff bit(s) `mask` are unset in `prev` and set in `cur` — the
/// "newly set" edge-trigger rule shared by every region except `shops`.
fn newly_set(prev_word: u16, new_word: u16, mask: u16) -> bool {
    (new_word & mask) != 0 && (prev_word & mask) == 0
}

#[cfg(test)]
mod test {
    use super::*;

    fn snapshot(region: &str, bytes: Vec<u8>) -> SramSnapshot {
        let mut regions = HashMap::new();
        regions.insert(region.to_string(), bytes);
        SramSnapshot { regions }
    }

    #[test]
    fn diff_of_identical_snapshots_is_empty() {
        let a = snapshot(region::BASE, vec![0x10, 0x00]);
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn idempotent_changed_locations_i3() {
        let static_data = StaticData::load();
        let a = snapshot(region::BASE, vec![0x10, 0x00]);
        let d = diff(&a, &a);
        assert!(changed_locations(&d, &a, &a, &static_data).is_empty());
    }

    #[test]
    fn edge_triggered_detection_i4() {
        let static_data = StaticData::load();
        // room 128 at byte offset 256 (mushroom = mask 16)
        let mut prev_bytes = vec![0u8; 258];
        prev_bytes[256] = 16;
        let mut cur_bytes = prev_bytes.clone();
        cur_bytes[257] = 0xFF; // touch the high byte without changing bit 16 in the low byte
        let prev = snapshot(region::BASE, prev_bytes);
        let cur = snapshot(region::BASE, cur_bytes);

        let d = diff(&prev, &cur);
        let locations = changed_locations(&d, &prev, &cur, &static_data);
        assert!(
            !locations.contains(&"Mushroom".to_string()),
            "bit already set in prev must not re-fire: {locations:?}"
        );
    }

    #[test]
    fn newly_set_bit_emits_location() {
        let static_data = StaticData::load();
        let prev = snapshot(region::BASE, vec![0u8; 258]);
        let mut cur_bytes = vec![0u8; 258];
        cur_bytes[256] = 16; // Mushroom mask
        let cur = snapshot(region::BASE, cur_bytes);

        let d = diff(&prev, &cur);
        let locations = changed_locations(&d, &prev, &cur, &static_data);
        assert!(locations.contains(&"Mushroom".to_string()));
    }

    #[test]
    fn shops_fire_without_prev_edge() {
        let static_data = StaticData::load();
        let prev = snapshot(region::SHOPS, vec![0u8; 304]);
        let mut cur_bytes = vec![0u8; 304];
        cur_bytes[302] = 3; // purchase count, any nonzero value
        let cur = snapshot(region::SHOPS, cur_bytes);

        let d = diff(&prev, &cur);
        let locations = changed_locations(&d, &prev, &cur, &static_data);
        assert!(locations.contains(&"Dark Lake Hylia Shop - Item 1".to_string()));
    }

    #[test]
    fn unknown_region_is_skipped_not_fatal() {
        let static_data = StaticData::load();
        let prev = SramSnapshot::default();
        let cur = snapshot("totally_unknown_region", vec![1, 2, 3]);
        let d = diff(&prev, &cur);
        assert!(changed_locations(&d, &prev, &cur, &static_data).is_empty());
    }
}
