//! Room membership and power-level rules used to decide what a user may do.

use std::collections::HashMap;

const ROOM_MESSAGE_EVENT: &str = "m.room.message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Invite,
    Join,
    Leave,
    Ban,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMember {
    pub user_id: String,
    pub display_name: Option<String>,
    pub membership: Membership,
}

impl RoomMember {
    pub fn joined(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            membership: Membership::Join,
        }
    }
}

/// Content of a room's `m.room.power_levels` state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PowerLevels {
    pub users: HashMap<String, i64>,
    pub users_default: i64,
    pub events: HashMap<String, i64>,
    pub events_default: i64,
}

impl PowerLevels {
    pub fn user_level(&self, user_id: &str) -> i64 {
        self.users
            .get(user_id)
            .copied()
            .unwrap_or(self.users_default)
    }

    pub fn required_level(&self, event_type: &str) -> i64 {
        self.events
            .get(event_type)
            .copied()
            .unwrap_or(self.events_default)
    }
}

/// Read-only view of a room's current state.
pub trait RoomState {
    fn room_id(&self) -> &str;
    fn member(&self, user_id: &str) -> Option<&RoomMember>;
    fn may_send_message(&self, user_id: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    room_id: String,
    members: Vec<RoomMember>,
    power_levels: Option<PowerLevels>,
}

impl Room {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            members: Vec::new(),
            power_levels: None,
        }
    }

    pub fn with_member(mut self, member: RoomMember) -> Self {
        self.members.retain(|m| m.user_id != member.user_id);
        self.members.push(member);
        self
    }

    pub fn with_power_levels(mut self, power_levels: PowerLevels) -> Self {
        self.power_levels = Some(power_levels);
        self
    }

    fn may_send_event(&self, event_type: &str, user_id: &str) -> bool {
        let Some(member) = self.member(user_id) else {
            return false;
        };

        if member.membership == Membership::Leave {
            return false;
        }

        // Rooms without power levels allow everyone.
        let Some(levels) = &self.power_levels else {
            return true;
        };

        levels.user_level(user_id) >= levels.required_level(event_type)
    }
}

impl RoomState for Room {
    fn room_id(&self) -> &str {
        &self.room_id
    }

    fn member(&self, user_id: &str) -> Option<&RoomMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    fn may_send_message(&self, user_id: &str) -> bool {
        self.may_send_event(ROOM_MESSAGE_EVENT, user_id)
    }
}
