//! Port for chat room persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{ChatMessage, ChatRoom, RoomId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by chat repository adapters.
    pub enum ChatRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "chat repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "chat repository query failed: {message}",
        /// A room with this id already exists.
        DuplicateRoom { room_id: String } => "chat room {room_id} already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn insert(&self, room: &ChatRoom) -> Result<(), ChatRepositoryError>;

    async fn find(&self, room_id: &RoomId) -> Result<Option<ChatRoom>, ChatRepositoryError>;

    /// Append `message` to the stored room and refresh its participants and
    /// activity timestamps from `room`.
    ///
    /// Messages already stored are never rewritten, so concurrent posters do
    /// not lose each other's messages. Returns `false` when the room is gone.
    async fn append_message(
        &self,
        room: &ChatRoom,
        message: &ChatMessage,
    ) -> Result<bool, ChatRepositoryError>;

    /// Rooms `user` participates in, most recently active first.
    async fn list_for_participant(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<ChatRoom>, ChatRepositoryError>;
}
