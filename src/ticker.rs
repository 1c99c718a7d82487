//! Idle session sweep (spec.md §3 lifecycle SUPPLEMENT), grounded on the
//! teacher's periodic `servers/ticker.rs` task shape: a single
//! `tokio::spawn`ed loop woken on a fixed `tokio::time::interval`.
//!
//! "Inactive after 2 days of no events" is a derived lifecycle label, not
//! a persisted column — sessions are never deleted and no live connection
//! is ever closed by this sweep. It only logs, for operator visibility,
//! which sessions have crossed the idle threshold since the last tick.

use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use tokio::time::interval;

use crate::{database::interface::{events as event_store, sessions as session_store}, env, state::AppState};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub async fn run(state: AppState) {
    let mut ticker = interval(SWEEP_INTERVAL);
    let idle_days = env::u64_env(env::SESSION_IDLE_DAYS) as i64;

    loop {
        ticker.tick().await;
        sweep(&state, idle_days).await;
    }
}

async fn sweep(state: &AppState, idle_days: i64) {
    let session_ids = match session_store::all_ids(&state.db).await {
        Ok(ids) => ids,
        Err(err) => {
            warn!("idle sweep: failed to list sessions: {err}");
            return;
        }
    };

    let mut idle_count = 0u32;
    for session_id in session_ids {
        let last_event = match event_store::last_event_for_session(&state.db, session_id).await {
            Ok(value) => value,
            Err(err) => {
                warn!("idle sweep: failed to load last event for session {session_id}: {err}");
                continue;
            }
        };

        let Some(last_event) = last_event else {
            continue;
        };

        let age_days = Utc::now().signed_duration_since(last_event.timestamp).num_days();
        if age_days >= idle_days {
            idle_count += 1;
        }
    }

    debug!("idle sweep: {idle_count} session(s) past the {idle_days}-day idle threshold");
}
