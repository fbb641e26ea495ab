/*
 *  sync.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Event-feed sync payload codec: a string-keyed map addressed by a
 *  well-known path, carrying one JSON array of event records
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::timeline::Event;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Well-known path identifier the panel publishes event batches to.
pub const EVENTS_LIST_PATH: &str = "/events/list";

/// Key of the single text field holding the JSON-encoded record array.
pub const EVENTS_LIST_DATA_KEY: &str = "events_json";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("payload addressed to unknown path: {0}")]
    UnknownPath(String),
    #[error("payload is missing the events data field")]
    MissingData,
    #[error("event records malformed: {0}")]
    Records(#[from] serde_json::Error),
}

/// The on-wire shape: path identifier plus a flat string map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    pub path: String,
    pub data: BTreeMap<String, String>,
}

/// One event record as serialized by the panel side.
#[derive(Debug, Serialize, Deserialize)]
struct EventRecord {
    id: i64,
    #[serde(rename = "startInstant")]
    start_instant: i64,
    title: String,
    #[serde(rename = "calendarName")]
    calendar_name: String,
}

/// Decode a received payload into events. The caller keeps its previous
/// timeline on any error here - a bad payload never clears state.
pub fn decode_events(payload: &SyncPayload) -> Result<Vec<Event>, SyncError> {
    if payload.path != EVENTS_LIST_PATH {
        return Err(SyncError::UnknownPath(payload.path.clone()));
    }
    let json = payload
        .data
        .get(EVENTS_LIST_DATA_KEY)
        .ok_or(SyncError::MissingData)?;
    let records: Vec<EventRecord> = serde_json::from_str(json)?;
    Ok(records
        .into_iter()
        .map(|r| Event {
            id: r.id,
            start_ms: r.start_instant,
            title: r.title,
            calendar_name: r.calendar_name,
        })
        .collect())
}

/// Encode events for the outbound direction of the sync channel.
pub fn encode_events(events: &[Event]) -> Result<SyncPayload, serde_json::Error> {
    let records: Vec<EventRecord> = events
        .iter()
        .map(|e| EventRecord {
            id: e.id,
            start_instant: e.start_ms,
            title: e.title.clone(),
            calendar_name: e.calendar_name.clone(),
        })
        .collect();
    let mut data = BTreeMap::new();
    data.insert(EVENTS_LIST_DATA_KEY.to_string(), serde_json::to_string(&records)?);
    Ok(SyncPayload {
        path: EVENTS_LIST_PATH.to_string(),
        data,
    })
}
