//! Item Router (spec.md §4.4): placement lookup, recipient `toPlayerIdx`
//! allocation, `new_item` append.

use std::collections::HashMap;

use log::{debug, warn};
use sea_orm::{DatabaseConnection, DbErr};
use uuid::Uuid;

use crate::{
    database::{entities::mwsessions::Multidata, interface::events as event_store},
    error::AppResult,
    events::{Event, EventData, EventType},
};

/// `(locationId, finderPlayer) -> (itemId, recipientPlayer)`, built once
/// from a session's multidata and held for its life (spec.md §3).
#[derive(Debug, Default)]
pub struct PlacementIndex {
    by_finder: HashMap<(i64, i32), (i64, i32)>,
}

impl PlacementIndex {
    pub fn build(multidata: &Multidata) -> Self {
        let mut by_finder = HashMap::with_capacity(multidata.placements.len());
        for entry in &multidata.placements {
            by_finder.insert(
                (entry.location_id, entry.finder_player),
                (entry.item_id, entry.recipient_player),
            );
        }
        Self { by_finder }
    }

    pub fn lookup(&self, location_id: i64, finder_player: i32) -> Option<(i64, i32)> {
        self.by_finder.get(&(location_id, finder_player)).copied()
    }

    /// Every location this player is the finder of — used by `/missing`.
    pub fn locations_for_finder(&self, finder_player: i32) -> Vec<i64> {
        self.by_finder
            .keys()
            .filter(|&&(_, finder)| finder == finder_player)
            .map(|&(location_id, _)| location_id)
            .collect()
    }
}

/// Routes a single newly-checked location: resolves the placement,
/// allocates a `toPlayerIdx` for cross-player sends, and appends the
/// `new_item` event. Returns `Ok(None)` if the location has no placement
/// entry (seed mismatch) — logged, not an error.
pub async fn route_check(
    db: &DatabaseConnection,
    placement: &PlacementIndex,
    session_id: Uuid,
    finder_player: i32,
    location_id: i64,
    frame_time: i64,
) -> AppResult<Option<Event>> {
    let Some((item_id, recipient_player)) = placement.lookup(location_id, finder_player) else {
        debug!(
            "item router: no placement for location {location_id} found by player {finder_player} in session {session_id}"
        );
        return Ok(None);
    };

    if recipient_player == finder_player {
        let event = event_store::append(
            db,
            session_id,
            finder_player,
            recipient_player,
            None,
            Some(item_id),
            Some(location_id),
            EventType::NewItem,
            Some(frame_time),
            EventData::default(),
        )
        .await?;
        return Ok(Some(event));
    }

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let next_idx = event_store::max_to_player_idx(db, session_id, recipient_player)
            .await?
            .map(|max| max + 1)
            .unwrap_or(1);

        match event_store::append(
            db,
            session_id,
            finder_player,
            recipient_player,
            Some(next_idx),
            Some(item_id),
            Some(location_id),
            EventType::NewItem,
            Some(frame_time),
            EventData::default(),
        )
        .await
        {
            Ok(event) => return Ok(Some(event)),
            Err(err) if is_unique_violation(&err) => {
                if attempt % 8 == 0 {
                    warn!(
                        "item router: {attempt} retries allocating toPlayerIdx for player {recipient_player} in session {session_id}"
                    );
                }
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Sends `item_id` directly to `to_player`, outside the finder pipeline
/// (spec.md §6 `POST /session/{id}/adminSend`). Allocates a `toPlayerIdx`
/// with the same retry-on-conflict loop as `route_check`, since this is
/// still a cross-player delivery subject to the same contiguity
/// invariant (I1).
pub async fn admin_send(
    db: &DatabaseConnection,
    session_id: Uuid,
    to_player: i32,
    item_id: i64,
    location_id: Option<i64>,
) -> AppResult<Event> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let next_idx = event_store::max_to_player_idx(db, session_id, to_player)
            .await?
            .map(|max| max + 1)
            .unwrap_or(1);

        match event_store::append(
            db,
            session_id,
            crate::utils::types::ADMIN_PLAYER_ID,
            to_player,
            Some(next_idx),
            Some(item_id),
            location_id,
            EventType::NewItem,
            None,
            EventData::default(),
        )
        .await
        {
            Ok(event) => return Ok(event),
            Err(err) if is_unique_violation(&err) => {
                if attempt % 8 == 0 {
                    warn!(
                        "item router: {attempt} retries allocating toPlayerIdx for admin send to player {to_player} in session {session_id}"
                    );
                }
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("unique constraint") || message.contains("unique violation")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::entities::mwsessions::PlacementEntry;

    fn multidata(entries: Vec<(i64, i32, i64, i32)>) -> Multidata {
        Multidata {
            player_names: vec![],
            rom_names: vec![],
            placements: entries
                .into_iter()
                .map(|(location_id, finder_player, item_id, recipient_player)| PlacementEntry {
                    location_id,
                    finder_player,
                    item_id,
                    recipient_player,
                })
                .collect(),
        }
    }

    #[test]
    fn lookup_finds_placement_by_location_and_finder() {
        let index = PlacementIndex::build(&multidata(vec![(10, 1, 0xAA, 2)]));
        assert_eq!(index.lookup(10, 1), Some((0xAA, 2)));
        assert_eq!(index.lookup(10, 2), None);
    }

    #[test]
    fn locations_for_finder_filters_correctly() {
        let index = PlacementIndex::build(&multidata(vec![(10, 1, 1, 2), (20, 1, 2, 2), (30, 2, 3, 1)]));
        let mut locs = index.locations_for_finder(1);
        locs.sort();
        assert_eq!(locs, vec![10, 20]);
    }
}
