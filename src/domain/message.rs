use serde_json::Value;

const ROOM_MESSAGE_EVENT: &str = "m.room.message";

/// Kind of a room message, taken from its `msgtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    Emote,
    Notice,
    Image,
    File,
    Audio,
    Video,
    Location,
    Other,
}

impl MessageKind {
    pub fn from_msgtype(msgtype: Option<&str>) -> Self {
        match msgtype {
            Some("m.text") | None => Self::Text,
            Some("m.emote") => Self::Emote,
            Some("m.notice") => Self::Notice,
            Some("m.image") => Self::Image,
            Some("m.file") => Self::File,
            Some("m.audio") => Self::Audio,
            Some("m.video") => Self::Video,
            Some("m.location") => Self::Location,
            Some(_) => Self::Other,
        }
    }

    /// Returns a display label for media kinds, or None for plain text.
    pub fn display_label(&self) -> Option<&'static str> {
        match self {
            MessageKind::Text | MessageKind::Emote | MessageKind::Notice => None,
            MessageKind::Image => Some("[Image]"),
            MessageKind::File => Some("[File]"),
            MessageKind::Audio => Some("[Audio]"),
            MessageKind::Video => Some("[Video]"),
            MessageKind::Location => Some("[Location]"),
            MessageKind::Other => Some("[Message]"),
        }
    }
}

/// A timeline event of a joined room, as delivered by sync.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub room_id: String,
    pub event_id: Option<String>,
    pub sender: String,
    pub event_type: String,
    pub content: Value,
}

impl TimelineEvent {
    pub fn is_room_message(&self) -> bool {
        self.event_type == ROOM_MESSAGE_EVENT
    }

    pub fn message_kind(&self) -> Option<MessageKind> {
        if !self.is_room_message() {
            return None;
        }

        Some(MessageKind::from_msgtype(
            self.content.get("msgtype").and_then(Value::as_str),
        ))
    }

    pub fn body(&self) -> &str {
        self.content
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Returns the display content: kind label + body, or just the body.
    pub fn display_content(&self) -> String {
        let label = self.message_kind().and_then(|kind| kind.display_label());
        let body = self.body();

        match (label, body.is_empty()) {
            (Some(label), true) => label.to_owned(),
            (Some(label), false) => format!("{label} {body}"),
            (None, _) if self.message_kind() == Some(MessageKind::Emote) => {
                format!("* {} {}", self.sender, body)
            }
            (None, _) => body.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event(event_type: &str, content: Value) -> TimelineEvent {
        TimelineEvent {
            room_id: "!room:example.org".to_owned(),
            event_id: Some("$1".to_owned()),
            sender: "@bob:example.org".to_owned(),
            event_type: event_type.to_owned(),
            content,
        }
    }

    #[test]
    fn missing_msgtype_is_treated_as_text() {
        assert_eq!(MessageKind::from_msgtype(None), MessageKind::Text);
    }

    #[test]
    fn unknown_msgtype_maps_to_other() {
        assert_eq!(
            MessageKind::from_msgtype(Some("org.example.custom")),
            MessageKind::Other
        );
    }

    #[test]
    fn non_message_events_have_no_kind() {
        let member = event("m.room.member", json!({"membership": "join"}));

        assert_eq!(member.message_kind(), None);
        assert_eq!(member.display_content(), "");
    }

    #[test]
    fn display_content_returns_body_for_text() {
        let message = event(
            "m.room.message",
            json!({"msgtype": "m.text", "body": "Hello world"}),
        );

        assert_eq!(message.display_content(), "Hello world");
    }

    #[test]
    fn display_content_prefixes_media_label() {
        let message = event(
            "m.room.message",
            json!({"msgtype": "m.image", "body": "cat.png"}),
        );

        assert_eq!(message.display_content(), "[Image] cat.png");
    }

    #[test]
    fn display_content_returns_label_only_when_body_empty() {
        let message = event("m.room.message", json!({"msgtype": "m.audio"}));

        assert_eq!(message.display_content(), "[Audio]");
    }

    #[test]
    fn emote_is_rendered_with_sender() {
        let message = event(
            "m.room.message",
            json!({"msgtype": "m.emote", "body": "waves"}),
        );

        assert_eq!(message.display_content(), "* @bob:example.org waves");
    }
}
