//! Multidata upload parsing (spec.md §6): zlib-inflate the uploaded file,
//! then decode the placement table, player names, and ROM names out of its
//! JSON body.

use std::io::Read;

use flate2::read::ZlibDecoder;
use serde_json::Value;

use crate::{
    database::entities::mwsessions::{Multidata, PlacementEntry},
    error::{AppError, AppResult},
};

/// Inflates `raw` and decodes it into a `Multidata` record. Never panics;
/// any structural mismatch maps to `AppError::MalformedMultidata`.
pub fn parse(raw: &[u8], max_upload_bytes: usize) -> AppResult<Multidata> {
    if raw.len() > max_upload_bytes {
        return Err(AppError::MultidataTooLarge);
    }

    let mut decoder = ZlibDecoder::new(raw);
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|_| AppError::MalformedMultidata)?;

    let value: Value = serde_json::from_str(&text).map_err(|_| AppError::MalformedMultidata)?;

    let player_names = value
        .get("names")
        .and_then(Value::as_array)
        .and_then(|names| names.first())
        .and_then(Value::as_array)
        .ok_or(AppError::MalformedMultidata)?
        .iter()
        .map(|name| name.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or(AppError::MalformedMultidata)?;

    let rom_names = value
        .get("roms")
        .and_then(Value::as_array)
        .ok_or(AppError::MalformedMultidata)?
        .iter()
        .map(|rom| {
            rom.as_array()
                .and_then(|triple| triple.get(2))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect::<Option<Vec<_>>>()
        .ok_or(AppError::MalformedMultidata)?;

    let placements = value
        .get("locations")
        .and_then(Value::as_array)
        .ok_or(AppError::MalformedMultidata)?
        .iter()
        .map(parse_placement)
        .collect::<Option<Vec<_>>>()
        .ok_or(AppError::MalformedMultidata)?;

    Ok(Multidata {
        player_names,
        rom_names,
        placements,
    })
}

fn parse_placement(entry: &Value) -> Option<PlacementEntry> {
    let entry = entry.as_array()?;
    let key = entry.first()?.as_array()?;
    let value = entry.get(1)?.as_array()?;

    Some(PlacementEntry {
        location_id: key.first()?.as_i64()?,
        finder_player: key.get(1)?.as_i64()? as i32,
        item_id: value.first()?.as_i64()?,
        recipient_player: value.get(1)?.as_i64()? as i32,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::{write::ZlibEncoder, Compression};
    use std::io::Write;

    fn compress(text: &str) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn parses_well_formed_multidata() {
        let json = r#"{
            "names": [["Alice", "Bob"]],
            "roms": [[0, 0, "alice.sfc"], [0, 0, "bob.sfc"]],
            "locations": [[[10, 1], [170, 2]], [[20, 2], [1, 1]]]
        }"#;
        let raw = compress(json);

        let multidata = parse(&raw, 10 * 1024 * 1024).unwrap();
        assert_eq!(multidata.player_names, vec!["Alice", "Bob"]);
        assert_eq!(multidata.rom_names, vec!["alice.sfc", "bob.sfc"]);
        assert_eq!(multidata.placements.len(), 2);
        assert_eq!(multidata.placements[0].location_id, 10);
        assert_eq!(multidata.placements[0].recipient_player, 2);
    }

    #[test]
    fn rejects_oversized_upload() {
        let raw = compress("{}");
        assert!(matches!(parse(&raw, 1), Err(AppError::MultidataTooLarge)));
    }

    #[test]
    fn rejects_malformed_json() {
        let raw = compress("not json");
        assert!(matches!(parse(&raw, 10 * 1024 * 1024), Err(AppError::MalformedMultidata)));
    }
}
