//! Shared application state (spec.md §2 AMBIENT). Replaces the teacher's
//! unsafe-static `GlobalState` with `Arc`-wrapped singletons handed to axum
//! as extensions — the same extension-lookup shape `middleware::auth` reads
//! from, minus the `unsafe`.

use std::{collections::HashMap, sync::Arc};

use log::debug;
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    config::Config,
    database::{self, interface::sessions as session_store, DbResult},
    fanout::FanoutBus,
    item_router::PlacementIndex,
    static_data::StaticData,
    utils::signing::ServerKey,
};

/// Every extension layer the HTTP/WebSocket surface reads from
/// `parts.extensions`, grouped for convenience at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub static_data: Arc<StaticData>,
    pub server_key: Arc<ServerKey>,
    pub fanout: Arc<FanoutBus>,
    pub placements: Arc<PlacementCache>,
}

impl AppState {
    pub async fn init(config: Config) -> std::io::Result<Self> {
        let db = database::connect().await?;
        let server_key = ServerKey::global().await;

        Ok(Self {
            db,
            config: Arc::new(config),
            static_data: Arc::new(StaticData::load()),
            server_key: Arc::new(server_key),
            fanout: Arc::new(FanoutBus::default()),
            placements: Arc::new(PlacementCache::default()),
        })
    }
}

/// Caches each session's immutable `PlacementIndex`, built once from its
/// multidata and reused for the session's life (spec.md §3).
#[derive(Default)]
pub struct PlacementCache {
    inner: RwLock<HashMap<Uuid, Arc<PlacementIndex>>>,
}

impl PlacementCache {
    pub async fn get_or_build(
        &self,
        db: &DatabaseConnection,
        session_id: Uuid,
    ) -> DbResult<Option<Arc<PlacementIndex>>> {
        if let Some(index) = self.inner.read().get(&session_id).cloned() {
            return Ok(Some(index));
        }

        let Some(session) = session_store::find_by_id(db, session_id).await? else {
            return Ok(None);
        };

        let index = Arc::new(PlacementIndex::build(&session.multidata));
        self.inner.write().insert(session_id, index.clone());
        debug!("placement cache: built index for session {session_id}");
        Ok(Some(index))
    }

    /// Drops a cached index, e.g. if a session's multidata were ever
    /// rewritten (not currently exposed by any route — sessions are
    /// immutable once created, per spec.md §3).
    pub fn invalidate(&self, session_id: Uuid) {
        self.inner.write().remove(&session_id);
    }
}
