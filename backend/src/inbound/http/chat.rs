//! Chat room handlers.
//!
//! Direct rooms are keyed by their two participants, so opening the same
//! conversation twice returns the existing room with `200` instead of `201`.

use actix_web::{HttpResponse, get, post, web};
use pagination::{Page, PageDefaults};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ChatMessage, ChatRoom, ChatType, Error, MessageType, OpenRoom, RelatedEntity, RoomId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ChatRoomPage;
use crate::inbound::http::session::CurrentActor;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, missing_field_error, page_request, parse_id,
};

/// Query string for `GET /api/chat/rooms`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Body for `POST /api/chat/rooms`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenRoomRequest {
    /// Everyone besides the caller; exactly one for direct chats.
    pub participants: Vec<String>,
    /// `direct` (default), `group` or `support`.
    pub chat_type: Option<ChatType>,
    pub subject: Option<String>,
    pub related_entity: Option<RelatedEntity>,
}

/// Body for `POST /api/chat/rooms/{room_id}/messages`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PostMessageRequest {
    pub content: Option<String>,
    /// Defaults to `text`.
    pub message_type: Option<MessageType>,
}

fn room_id(raw: String) -> Result<RoomId, Error> {
    RoomId::try_from(raw).map_err(|err| field_error(FieldName::new("roomId"), err.to_string()))
}

impl TryFrom<OpenRoomRequest> for OpenRoom {
    type Error = Error;

    fn try_from(value: OpenRoomRequest) -> Result<Self, Self::Error> {
        let field = FieldName::new("participants");
        if value.participants.is_empty() {
            return Err(missing_field_error(field));
        }
        let participants = value
            .participants
            .iter()
            .map(|raw| parse_id::<UserId>(raw, field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            participants,
            chat_type: value.chat_type.unwrap_or_default(),
            subject: value.subject,
            related_entity: value.related_entity,
        })
    }
}

/// Rooms the caller takes part in, most recently active first.
#[utoipa::path(
    get,
    path = "/api/chat/rooms",
    params(RoomsQuery),
    responses(
        (status = 200, description = "Rooms", body = ChatRoomPage),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["chat"],
    operation_id = "listRooms"
)]
#[get("/rooms")]
pub async fn list_rooms(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    query: web::Query<RoomsQuery>,
) -> ApiResult<web::Json<Page<ChatRoom>>> {
    let page = page_request(query.page, query.limit, PageDefaults::STANDARD)?;
    state.chat.rooms(&actor, page).await.map(web::Json)
}

#[utoipa::path(
    post,
    path = "/api/chat/rooms",
    request_body = OpenRoomRequest,
    responses(
        (status = 201, description = "Room opened", body = ChatRoom),
        (status = 200, description = "Existing room", body = ChatRoom),
        (status = 400, description = "Invalid participants", body = Error),
        (status = 404, description = "Participant not found", body = Error)
    ),
    tags = ["chat"],
    operation_id = "openRoom"
)]
#[post("/rooms")]
pub async fn open_room(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    payload: web::Json<OpenRoomRequest>,
) -> ApiResult<HttpResponse> {
    let request = OpenRoom::try_from(payload.into_inner())?;
    let opened = state.chat.open(&actor, request).await?;
    let response = if opened.created {
        HttpResponse::Created().json(opened.room)
    } else {
        HttpResponse::Ok().json(opened.room)
    };
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/chat/rooms/{room_id}",
    params(("room_id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room with its messages", body = ChatRoom),
        (status = 403, description = "Access denied", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["chat"],
    operation_id = "getRoom"
)]
#[get("/rooms/{room_id}")]
pub async fn get_room(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<ChatRoom>> {
    let id = room_id(path.into_inner())?;
    state.chat.get(&actor, &id).await.map(web::Json)
}

#[utoipa::path(
    post,
    path = "/api/chat/rooms/{room_id}/messages",
    params(("room_id" = String, Path, description = "Room identifier")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message posted", body = ChatMessage),
        (status = 400, description = "Empty message or closed room", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["chat"],
    operation_id = "postMessage"
)]
#[post("/rooms/{room_id}/messages")]
pub async fn post_message(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
    payload: web::Json<PostMessageRequest>,
) -> ApiResult<HttpResponse> {
    let id = room_id(path.into_inner())?;
    let PostMessageRequest {
        content,
        message_type,
    } = payload.into_inner();
    let content = content.ok_or_else(|| missing_field_error(FieldName::new("content")))?;
    let message = state
        .chat
        .post(&actor, &id, &content, message_type.unwrap_or_default())
        .await?;
    Ok(HttpResponse::Created().json(message))
}
