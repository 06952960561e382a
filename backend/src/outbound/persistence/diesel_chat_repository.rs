//! PostgreSQL-backed `ChatRepository` implementation using Diesel ORM.
//!
//! Messages are appended with `messages || $1` so concurrent posters never
//! overwrite each other's messages.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{ChatRepository, ChatRepositoryError};
use crate::domain::{ChatMessage, ChatRoom, RoomId, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::diesel_helpers::{page_window, total_from_count};
use super::json_serializers::{
    enum_to_text, from_json, from_optional_json, text_to_enum, to_json, to_optional_json,
};
use super::models::{ChatRoomRow, NewChatRoomRow};
use super::pool::{DbPool, PoolError};
use super::schema::chat_rooms;

/// Diesel-backed implementation of the chat repository port.
#[derive(Clone)]
pub struct DieselChatRepository {
    pool: DbPool,
}

impl DieselChatRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ChatRepositoryError {
    map_basic_pool_error(error, ChatRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ChatRepositoryError {
    map_basic_diesel_error(
        error,
        ChatRepositoryError::query,
        ChatRepositoryError::connection,
    )
}

fn participant_ids(room: &ChatRoom) -> Vec<Uuid> {
    room.participants
        .iter()
        .map(|participant| *participant.user.as_uuid())
        .collect()
}

fn row_to_room(row: ChatRoomRow) -> Result<ChatRoom, ChatRepositoryError> {
    let query = ChatRepositoryError::query;
    let ChatRoomRow {
        room_id,
        participant_ids: _,
        participants,
        messages,
        chat_type,
        subject,
        related_entity,
        status,
        last_activity,
        created_at,
        updated_at,
    } = row;

    Ok(ChatRoom {
        room_id: RoomId::try_from(room_id).map_err(|err| query(err.to_string()))?,
        participants: from_json(participants, "participants").map_err(query)?,
        messages: from_json(messages, "messages").map_err(query)?,
        chat_type: text_to_enum(&chat_type, "chat_type").map_err(query)?,
        subject,
        related_entity: from_optional_json(related_entity, "related_entity").map_err(query)?,
        status: text_to_enum(&status, "status").map_err(query)?,
        last_activity,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl ChatRepository for DieselChatRepository {
    async fn insert(&self, room: &ChatRoom) -> Result<(), ChatRepositoryError> {
        let query = ChatRepositoryError::query;
        let participants = to_json(&room.participants, "participants").map_err(query)?;
        let messages = to_json(&room.messages, "messages").map_err(query)?;
        let related = to_optional_json(room.related_entity.as_ref(), "related_entity")
            .map_err(query)?;
        let chat_type = enum_to_text(&room.chat_type, "chat_type").map_err(query)?;
        let status = enum_to_text(&room.status, "status").map_err(query)?;
        let ids = participant_ids(room);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewChatRoomRow {
            room_id: room.room_id.as_str(),
            participant_ids: &ids,
            participants: &participants,
            messages: &messages,
            chat_type: &chat_type,
            subject: room.subject.as_deref(),
            related_entity: related.as_ref(),
            status: &status,
            last_activity: room.last_activity,
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        diesel::insert_into(chat_rooms::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if unique_violation(&err).is_some() {
                    ChatRepositoryError::duplicate_room(room.room_id.as_str())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn find(&self, room_id: &RoomId) -> Result<Option<ChatRoom>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = chat_rooms::table
            .find(room_id.as_str())
            .select(ChatRoomRow::as_select())
            .first::<ChatRoomRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_room).transpose()
    }

    async fn append_message(
        &self,
        room: &ChatRoom,
        message: &ChatMessage,
    ) -> Result<bool, ChatRepositoryError> {
        let query = ChatRepositoryError::query;
        let appended = to_json(&[message], "messages").map_err(query)?;
        let participants = to_json(&room.participants, "participants").map_err(query)?;
        let ids = participant_ids(room);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(chat_rooms::table.find(room.room_id.as_str()))
            .set((
                chat_rooms::messages.eq(chat_rooms::messages.concat(appended)),
                chat_rooms::participants.eq(participants),
                chat_rooms::participant_ids.eq(ids),
                chat_rooms::last_activity.eq(room.last_activity),
                chat_rooms::updated_at.eq(room.updated_at),
            ))
            .execute(&mut conn)
            .await
            .map(|updated| updated > 0)
            .map_err(map_diesel_error)
    }

    async fn list_for_participant(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<ChatRoom>, ChatRepositoryError> {
        let (offset, limit) = page_window(page).map_err(ChatRepositoryError::query)?;
        let member = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = chat_rooms::table
            .filter(chat_rooms::participant_ids.contains(vec![member]))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ChatRoomRow> = chat_rooms::table
            .filter(chat_rooms::participant_ids.contains(vec![member]))
            .order((chat_rooms::last_activity.desc(), chat_rooms::room_id.asc()))
            .offset(offset)
            .limit(limit)
            .select(ChatRoomRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_room)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total_from_count(total)))
    }
}
