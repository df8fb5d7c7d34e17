use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Voice,
    Video,
    Screensharing,
}

/// Actions the composer hands to the application dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    PlaceCall {
        #[serde(rename = "type")]
        call_type: CallType,
        room_id: String,
    },
    Hangup {
        room_id: String,
    },
}

/// State of the VoIP call attached to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Ringing,
    Connecting,
    Connected,
    Ended,
}

impl CallState {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Ended)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCall {
    pub room_id: String,
    pub state: CallState,
}
