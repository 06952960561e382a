//! Chat rooms between marketplace users.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{MessageId, Role, UserId};

/// Validation errors raised by chat operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatValidationError {
    #[error("room id must not be empty")]
    EmptyRoomId,
    #[error("message content must not be empty")]
    EmptyContent,
    #[error("a direct chat needs two different participants")]
    SelfChat,
    #[error("room is closed")]
    RoomClosed,
}

/// Stable identifier of a chat room.
///
/// Direct rooms derive their id from the two participants, so the same
/// pair always lands in the same room regardless of who opens it.
///
/// # Examples
/// ```
/// use karigari::domain::{RoomId, UserId};
///
/// let a = UserId::random();
/// let b = UserId::random();
/// assert_eq!(RoomId::direct(a, b, None), RoomId::direct(b, a, None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct RoomId(String);

impl RoomId {
    /// Room id for a direct chat, optionally scoped to a related entity.
    pub fn direct(first: UserId, second: UserId, entity: Option<Uuid>) -> Self {
        let mut ids = [first.to_string(), second.to_string()];
        ids.sort();
        let [low, high] = ids;
        match entity {
            Some(entity) => Self(format!("{low}_{high}_{entity}")),
            None => Self(format!("{low}_{high}")),
        }
    }

    /// Fresh id for group and support rooms.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ChatValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ChatValidationError::EmptyRoomId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a participant holds inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Customer,
    Artisan,
    Admin,
}

impl From<Role> for ParticipantRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Customer => Self::Customer,
            Role::Artisan | Role::ArtisanPending => Self::Artisan,
            Role::Admin => Self::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user: UserId,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
    System,
    Quote,
    Order,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: UserId,
    pub content: String,
    pub message_type: MessageType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    #[default]
    Direct,
    Group,
    Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Product,
    Order,
    Customization,
    General,
}

/// What a room is about, when it is about something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntity {
    pub entity_type: EntityType,
    pub entity_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    #[default]
    Active,
    Archived,
    Closed,
}

/// Fields needed to open a room.
#[derive(Debug, Clone)]
pub struct NewChatRoom {
    pub participants: Vec<(UserId, ParticipantRole)>,
    pub chat_type: ChatType,
    pub subject: Option<String>,
    pub related_entity: Option<RelatedEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub room_id: RoomId,
    pub participants: Vec<Participant>,
    pub messages: Vec<ChatMessage>,
    pub chat_type: ChatType,
    pub subject: Option<String>,
    pub related_entity: Option<RelatedEntity>,
    pub status: ChatStatus,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatRoom {
    /// Open a room and assign its id.
    ///
    /// Direct rooms with exactly two participants get the deterministic
    /// pair id; every other room gets a random id.
    pub fn open(new: NewChatRoom, now: DateTime<Utc>) -> Result<Self, ChatValidationError> {
        let room_id = match (new.chat_type, new.participants.as_slice()) {
            (ChatType::Direct, [(first, _), (second, _)]) => {
                if first == second {
                    return Err(ChatValidationError::SelfChat);
                }
                let entity = new.related_entity.and_then(|related| related.entity_id);
                RoomId::direct(*first, *second, entity)
            }
            _ => RoomId::random(),
        };
        let participants = new
            .participants
            .into_iter()
            .map(|(user, role)| Participant {
                user,
                role,
                joined_at: now,
                last_seen: now,
            })
            .collect();
        Ok(Self {
            room_id,
            participants,
            messages: Vec::new(),
            chat_type: new.chat_type,
            subject: new
                .subject
                .map(|subject| subject.trim().to_owned())
                .filter(|subject| !subject.is_empty()),
            related_entity: new.related_entity,
            status: ChatStatus::Active,
            last_activity: now,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.participants.iter().any(|participant| participant.user == user)
    }

    /// Append a message from `sender`.
    pub fn post(
        &mut self,
        id: MessageId,
        sender: UserId,
        content: &str,
        message_type: MessageType,
        now: DateTime<Utc>,
    ) -> Result<ChatMessage, ChatValidationError> {
        if self.status == ChatStatus::Closed {
            return Err(ChatValidationError::RoomClosed);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatValidationError::EmptyContent);
        }
        let message = ChatMessage {
            id,
            sender,
            content: content.to_owned(),
            message_type,
            timestamp: now,
        };
        self.messages.push(message.clone());
        if let Some(participant) = self
            .participants
            .iter_mut()
            .find(|participant| participant.user == sender)
        {
            participant.last_seen = now;
        }
        self.last_activity = now;
        self.updated_at = now;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn direct(first: UserId, second: UserId, entity: Option<Uuid>) -> ChatRoom {
        ChatRoom::open(
            NewChatRoom {
                participants: vec![
                    (first, ParticipantRole::Customer),
                    (second, ParticipantRole::Artisan),
                ],
                chat_type: ChatType::Direct,
                subject: None,
                related_entity: entity.map(|id| RelatedEntity {
                    entity_type: EntityType::Product,
                    entity_id: Some(id),
                }),
            },
            Utc::now(),
        )
        .expect("valid room")
    }

    #[rstest]
    fn direct_room_id_ignores_participant_order() {
        let a = UserId::random();
        let b = UserId::random();
        let entity = Uuid::new_v4();
        assert_eq!(direct(a, b, None).room_id, direct(b, a, None).room_id);
        assert_eq!(
            direct(a, b, Some(entity)).room_id,
            direct(b, a, Some(entity)).room_id
        );
        assert_ne!(direct(a, b, None).room_id, direct(a, b, Some(entity)).room_id);
    }

    #[rstest]
    fn direct_room_id_joins_sorted_ids() {
        let low = UserId::from_uuid(Uuid::from_u128(1));
        let high = UserId::from_uuid(Uuid::from_u128(2));
        let id = RoomId::direct(high, low, None);
        assert_eq!(id.as_str(), format!("{low}_{high}"));
    }

    #[rstest]
    fn self_chat_is_refused() {
        let a = UserId::random();
        let err = ChatRoom::open(
            NewChatRoom {
                participants: vec![(a, ParticipantRole::Customer), (a, ParticipantRole::Customer)],
                chat_type: ChatType::Direct,
                subject: None,
                related_entity: None,
            },
            Utc::now(),
        )
        .expect_err("self chat");
        assert_eq!(err, ChatValidationError::SelfChat);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_messages_are_rejected(#[case] content: &str) {
        let a = UserId::random();
        let mut room = direct(a, UserId::random(), None);
        let err = room
            .post(MessageId::random(), a, content, MessageType::Text, Utc::now())
            .expect_err("blank message");
        assert_eq!(err, ChatValidationError::EmptyContent);
        assert!(room.messages.is_empty());
    }

    #[rstest]
    fn posting_updates_activity_and_sender_presence() {
        let a = UserId::random();
        let mut room = direct(a, UserId::random(), None);
        let later = room.last_activity + chrono::Duration::minutes(3);
        room.post(MessageId::random(), a, " namaste ", MessageType::Text, later)
            .expect("message accepted");
        assert_eq!(room.messages[0].content, "namaste");
        assert_eq!(room.last_activity, later);
        let sender = room
            .participants
            .iter()
            .find(|participant| participant.user == a)
            .expect("sender present");
        assert_eq!(sender.last_seen, later);
    }

    #[rstest]
    fn closed_rooms_refuse_messages() {
        let a = UserId::random();
        let mut room = direct(a, UserId::random(), None);
        room.status = ChatStatus::Closed;
        assert_eq!(
            room.post(MessageId::random(), a, "hi", MessageType::Text, Utc::now()),
            Err(ChatValidationError::RoomClosed)
        );
    }
}
