//! Client-server API endpoints and wire types used by the HTTP adapters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::domain::{events::SyncBatch, message::TimelineEvent};

const CLIENT_API_PREFIX: &str = "/_matrix/client/r0";

pub const PASSWORD_LOGIN_TYPE: &str = "m.login.password";
const USER_IDENTIFIER_TYPE: &str = "m.id.user";

pub fn endpoint(base_url: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}{CLIENT_API_PREFIX}{path}",
        base_url.trim_end_matches('/')
    ))
}

/// Builds a `/sync` request URL.
///
/// The first sync (no `since` token) uses a zero timeout so the initial
/// state arrives immediately; later syncs long-poll.
pub fn sync_url(
    base_url: &str,
    since: Option<&str>,
    timeline_limit: u32,
    timeout_ms: u64,
) -> Result<Url, url::ParseError> {
    let mut url = endpoint(base_url, "/sync")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("filter", &sync_filter(timeline_limit));
        match since {
            Some(since) => {
                query.append_pair("since", since);
                query.append_pair("timeout", &timeout_ms.to_string());
            }
            None => {
                query.append_pair("timeout", "0");
            }
        }
    }

    Ok(url)
}

fn sync_filter(timeline_limit: u32) -> String {
    json!({ "room": { "timeline": { "limit": timeline_limit } } }).to_string()
}

pub fn guest_register_url(base_url: &str) -> Result<Url, url::ParseError> {
    let mut url = endpoint(base_url, "/register")?;
    url.query_pairs_mut().append_pair("kind", "guest");
    Ok(url)
}

#[derive(Debug, Serialize)]
pub struct PasswordLoginRequest<'a> {
    #[serde(rename = "type")]
    pub login_type: &'static str,
    pub identifier: UserIdentifier<'a>,
    pub password: &'a str,
    pub initial_device_display_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UserIdentifier<'a> {
    #[serde(rename = "type")]
    pub id_type: &'static str,
    pub user: &'a str,
}

impl<'a> PasswordLoginRequest<'a> {
    pub fn new(user: &'a str, password: &'a str, device_name: &'a str) -> Self {
        Self {
            login_type: PASSWORD_LOGIN_TYPE,
            identifier: UserIdentifier {
                id_type: USER_IDENTIFIER_TYPE,
                user,
            },
            password,
            initial_device_display_name: device_name,
        }
    }
}

/// Body of a successful `/login` or `/register` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub access_token: String,
    pub device_id: String,
}

/// Standard error body returned by the homeserver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MatrixErrorBody {
    #[serde(default)]
    pub errcode: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub retry_after_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    pub next_batch: String,
    #[serde(default)]
    rooms: SyncRooms,
}

#[derive(Debug, Default, Deserialize)]
struct SyncRooms {
    #[serde(default)]
    join: BTreeMap<String, JoinedRoom>,
}

#[derive(Debug, Default, Deserialize)]
struct JoinedRoom {
    #[serde(default)]
    timeline: Timeline,
}

#[derive(Debug, Default, Deserialize)]
struct Timeline {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    event_id: Option<String>,
    sender: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    content: Value,
}

impl SyncResponse {
    pub fn into_batch(self) -> SyncBatch {
        let events = self
            .rooms
            .join
            .into_iter()
            .flat_map(|(room_id, room)| {
                room.timeline
                    .events
                    .into_iter()
                    .map(move |event| TimelineEvent {
                        room_id: room_id.clone(),
                        event_id: event.event_id,
                        sender: event.sender,
                        event_type: event.event_type,
                        content: event.content,
                    })
            })
            .collect();

        SyncBatch {
            next_batch: self.next_batch,
            events,
        }
    }
}
