//! Plain-text rendering of synced timeline events.
//!
//! Consecutive messages from the same sender show the sender only once.
//! File messages go through [`FileBodyView`] so their links are resolved
//! against the active client.

use crate::{
    domain::message::{MessageKind, TimelineEvent},
    matrix::MatrixClient,
    ui::file_body::FileBodyView,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineLine {
    pub room_id: String,
    /// Set on the first line of a run of messages from one sender.
    pub sender: Option<String>,
    pub content: String,
}

impl TimelineLine {
    pub fn to_text(&self) -> String {
        match &self.sender {
            Some(sender) => format!("[{}] {sender}: {}", self.room_id, self.content),
            None => format!("[{}]   {}", self.room_id, self.content),
        }
    }
}

/// Builds display lines for room messages; other events are skipped.
pub fn build_timeline_lines(
    events: &[TimelineEvent],
    client: Option<&dyn MatrixClient>,
) -> Vec<TimelineLine> {
    let mut lines = Vec::new();
    let mut prev: Option<(&str, &str)> = None;

    for event in events.iter().filter(|event| event.is_room_message()) {
        let key = (event.room_id.as_str(), event.sender.as_str());
        let sender = (prev != Some(key)).then(|| event.sender.clone());

        lines.push(TimelineLine {
            room_id: event.room_id.clone(),
            sender,
            content: event_content(event, client),
        });
        prev = Some(key);
    }

    lines
}

fn event_content(event: &TimelineEvent, client: Option<&dyn MatrixClient>) -> String {
    match event.message_kind() {
        Some(MessageKind::File) => FileBodyView::from_event(event, client).to_string(),
        _ => event.display_content(),
    }
}
