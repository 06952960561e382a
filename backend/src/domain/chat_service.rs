//! Chat use cases: opening rooms, reading them and posting messages.

use std::sync::Arc;

use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{debug, info};

use super::port_errors::{map_chat_error, map_user_error};
use super::ports::{ChatRepository, ChatRepositoryError, UserRepository};
use super::{
    Actor, ChatMessage, ChatRoom, ChatType, ChatValidationError, Error, MessageId, MessageType,
    NewChatRoom, ParticipantRole, RelatedEntity, RoomId, UserId,
};

const NOT_FOUND: &str = "Chat room not found";

/// A request to open (or rejoin) a room with other users.
#[derive(Debug, Clone)]
pub struct OpenRoom {
    /// Everyone besides the caller.
    pub participants: Vec<UserId>,
    pub chat_type: ChatType,
    pub subject: Option<String>,
    pub related_entity: Option<RelatedEntity>,
}

/// Room returned by [`ChatService::open`], flagged when it already existed.
#[derive(Debug, Clone)]
pub struct OpenedRoom {
    pub room: ChatRoom,
    pub created: bool,
}

#[derive(Clone)]
pub struct ChatService {
    rooms: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

fn chat_validation_error(error: ChatValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

impl ChatService {
    pub fn new(
        rooms: Arc<dyn ChatRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            users,
            clock,
        }
    }

    /// Rooms the caller takes part in, most recently active first.
    pub async fn rooms(&self, actor: &Actor, page: PageRequest) -> Result<Page<ChatRoom>, Error> {
        self.rooms
            .list_for_participant(&actor.id, page)
            .await
            .map_err(map_chat_error)
    }

    /// Open a room, or return the existing direct room for the same pair
    /// and context.
    pub async fn open(&self, actor: &Actor, request: OpenRoom) -> Result<OpenedRoom, Error> {
        if request.chat_type == ChatType::Direct && request.participants.len() != 1 {
            return Err(Error::invalid_request(
                "A direct chat needs exactly one other participant",
            ));
        }
        let mut participants = vec![(actor.id, ParticipantRole::from(actor.role))];
        for id in request.participants {
            if participants.iter().any(|(existing, _)| *existing == id) {
                continue;
            }
            let user = self
                .users
                .find_by_id(&id)
                .await
                .map_err(map_user_error)?
                .ok_or_else(|| Error::not_found(format!("User {id} not found")))?;
            participants.push((user.id, ParticipantRole::from(user.role)));
        }
        let room = ChatRoom::open(
            NewChatRoom {
                participants,
                chat_type: request.chat_type,
                subject: request.subject,
                related_entity: request.related_entity,
            },
            self.clock.utc(),
        )
        .map_err(chat_validation_error)?;

        if let Some(existing) = self.lookup(&room.room_id).await? {
            return Ok(OpenedRoom {
                room: existing,
                created: false,
            });
        }
        match self.rooms.insert(&room).await {
            Ok(()) => {
                info!(room_id = %room.room_id, opener = %actor.id, "chat room opened");
                Ok(OpenedRoom {
                    room,
                    created: true,
                })
            }
            Err(ChatRepositoryError::DuplicateRoom { .. }) => {
                debug!(room_id = %room.room_id, "chat room opened concurrently");
                let existing = self
                    .lookup(&room.room_id)
                    .await?
                    .ok_or_else(|| Error::not_found(NOT_FOUND))?;
                Ok(OpenedRoom {
                    room: existing,
                    created: false,
                })
            }
            Err(err) => Err(map_chat_error(err)),
        }
    }

    pub async fn get(&self, actor: &Actor, room_id: &RoomId) -> Result<ChatRoom, Error> {
        let room = self
            .lookup(room_id)
            .await?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        if actor.can_access_room(&room) {
            Ok(room)
        } else {
            Err(Error::forbidden("Access denied"))
        }
    }

    /// Post a message as the caller, who must be a participant or an admin.
    pub async fn post(
        &self,
        actor: &Actor,
        room_id: &RoomId,
        content: &str,
        message_type: MessageType,
    ) -> Result<ChatMessage, Error> {
        let mut room = self
            .lookup(room_id)
            .await?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        if !actor.can_access_room(&room) {
            return Err(Error::forbidden("Access denied"));
        }
        let message = room
            .post(
                MessageId::random(),
                actor.id,
                content,
                message_type,
                self.clock.utc(),
            )
            .map_err(chat_validation_error)?;
        let stored = self
            .rooms
            .append_message(&room, &message)
            .await
            .map_err(map_chat_error)?;
        if !stored {
            return Err(Error::not_found(NOT_FOUND));
        }
        debug!(room_id = %room_id, sender = %actor.id, "chat message posted");
        Ok(message)
    }

    async fn lookup(&self, room_id: &RoomId) -> Result<Option<ChatRoom>, Error> {
        self.rooms.find(room_id).await.map_err(map_chat_error)
    }
}

#[cfg(test)]
#[path = "chat_service_tests.rs"]
mod tests;
