//! Tests for the chat service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockChatRepository, MockUserRepository};
use crate::domain::{
    AccountStatus, EmailAddress, ErrorCode, PersonName, Profile, Role, User,
};
use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 5, 18, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn clock(now: DateTime<Utc>) -> Arc<MockClock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    Arc::new(clock)
}

fn actor(role: Role) -> Actor {
    Actor {
        id: UserId::random(),
        name: PersonName::new("Isha").expect("valid name"),
        role,
        status: AccountStatus::Approved,
    }
}

fn user(role: Role, now: DateTime<Utc>) -> User {
    User::register(
        UserId::random(),
        PersonName::new("Devraj").expect("valid name"),
        EmailAddress::new("devraj@example.com").expect("valid email"),
        role,
        Profile::default(),
        now,
    )
}

fn users_knowing(known: User) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(move |id| {
        Ok((*id == known.id).then(|| known.clone()))
    });
    users
}

fn direct_with(other: UserId) -> OpenRoom {
    OpenRoom {
        participants: vec![other],
        chat_type: ChatType::Direct,
        subject: None,
        related_entity: None,
    }
}

fn room_between(first: &Actor, second: UserId, now: DateTime<Utc>) -> ChatRoom {
    ChatRoom::open(
        NewChatRoom {
            participants: vec![
                (first.id, ParticipantRole::from(first.role)),
                (second, ParticipantRole::Artisan),
            ],
            chat_type: ChatType::Direct,
            subject: None,
            related_entity: None,
        },
        now,
    )
    .expect("valid room")
}

#[rstest]
#[tokio::test]
async fn opening_a_new_direct_room_inserts_it(now: DateTime<Utc>) {
    let customer = actor(Role::Customer);
    let artisan = user(Role::Artisan, now);
    let expected = RoomId::direct(customer.id, artisan.id, None);
    let artisan_id = artisan.id;
    let mut rooms = MockChatRepository::new();
    rooms.expect_find().returning(|_| Ok(None));
    rooms
        .expect_insert()
        .withf(move |room| room.room_id == expected && room.participants.len() == 2)
        .times(1)
        .returning(|_| Ok(()));
    let service = ChatService::new(Arc::new(rooms), Arc::new(users_knowing(artisan)), clock(now));

    let opened = service
        .open(&customer, direct_with(artisan_id))
        .await
        .expect("opened");
    assert!(opened.created);
}

#[rstest]
#[tokio::test]
async fn reopening_returns_the_existing_room(now: DateTime<Utc>) {
    let customer = actor(Role::Customer);
    let artisan = user(Role::Artisan, now);
    let artisan_id = artisan.id;
    let existing = room_between(&customer, artisan_id, now);
    let mut rooms = MockChatRepository::new();
    rooms
        .expect_find()
        .returning(move |_| Ok(Some(existing.clone())));
    rooms.expect_insert().never();
    let service = ChatService::new(Arc::new(rooms), Arc::new(users_knowing(artisan)), clock(now));

    let opened = service
        .open(&customer, direct_with(artisan_id))
        .await
        .expect("rejoined");
    assert!(!opened.created);
    assert_eq!(opened.room.room_id, RoomId::direct(artisan_id, customer.id, None));
}

#[rstest]
#[tokio::test]
async fn losing_the_insert_race_returns_the_winner(now: DateTime<Utc>) {
    let customer = actor(Role::Customer);
    let artisan = user(Role::Artisan, now);
    let artisan_id = artisan.id;
    let winner = room_between(&customer, artisan_id, now);
    let mut rooms = MockChatRepository::new();
    let mut lookups = 0;
    rooms.expect_find().returning(move |_| {
        lookups += 1;
        Ok((lookups > 1).then(|| winner.clone()))
    });
    rooms
        .expect_insert()
        .returning(|room| Err(ChatRepositoryError::duplicate_room(room.room_id.as_str())));
    let service = ChatService::new(Arc::new(rooms), Arc::new(users_knowing(artisan)), clock(now));

    let opened = service
        .open(&customer, direct_with(artisan_id))
        .await
        .expect("winner returned");
    assert!(!opened.created);
}

#[rstest]
#[tokio::test]
async fn unknown_participant_is_not_found(now: DateTime<Utc>) {
    let service = ChatService::new(
        Arc::new(MockChatRepository::new()),
        Arc::new(users_knowing(user(Role::Artisan, now))),
        clock(now),
    );

    let err = service
        .open(&actor(Role::Customer), direct_with(UserId::random()))
        .await
        .expect_err("unknown user");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(Role::Customer, ErrorCode::Forbidden)]
#[case(Role::Artisan, ErrorCode::Forbidden)]
#[tokio::test]
async fn outsiders_cannot_read_rooms(
    now: DateTime<Utc>,
    #[case] role: Role,
    #[case] code: ErrorCode,
) {
    let room = room_between(&actor(Role::Customer), UserId::random(), now);
    let room_id = room.room_id.clone();
    let mut rooms = MockChatRepository::new();
    rooms.expect_find().returning(move |_| Ok(Some(room.clone())));
    let service = ChatService::new(
        Arc::new(rooms),
        Arc::new(MockUserRepository::new()),
        clock(now),
    );

    let err = service
        .get(&actor(role), &room_id)
        .await
        .expect_err("outsider");
    assert_eq!(err.code(), code);
}

#[rstest]
#[tokio::test]
async fn admins_may_read_and_post(now: DateTime<Utc>) {
    let room = room_between(&actor(Role::Customer), UserId::random(), now);
    let room_id = room.room_id.clone();
    let admin = actor(Role::Admin);
    let admin_id = admin.id;
    let mut rooms = MockChatRepository::new();
    rooms.expect_find().returning(move |_| Ok(Some(room.clone())));
    rooms
        .expect_append_message()
        .withf(move |_, message| message.sender == admin_id)
        .times(1)
        .returning(|_, _| Ok(true));
    let service = ChatService::new(
        Arc::new(rooms),
        Arc::new(MockUserRepository::new()),
        clock(now),
    );

    service.get(&admin, &room_id).await.expect("admin read");
    let message = service
        .post(&admin, &room_id, "Moderator here", MessageType::Text)
        .await
        .expect("admin post");
    assert_eq!(message.sender, admin_id);
}

#[rstest]
#[tokio::test]
async fn outsiders_may_not_post(now: DateTime<Utc>) {
    let room = room_between(&actor(Role::Customer), UserId::random(), now);
    let room_id = room.room_id.clone();
    let mut rooms = MockChatRepository::new();
    rooms.expect_find().returning(move |_| Ok(Some(room.clone())));
    rooms.expect_append_message().never();
    let service = ChatService::new(
        Arc::new(rooms),
        Arc::new(MockUserRepository::new()),
        clock(now),
    );

    let err = service
        .post(&actor(Role::Artisan), &room_id, "hello", MessageType::Text)
        .await
        .expect_err("not a participant");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn posting_appends_one_message(now: DateTime<Utc>) {
    let customer = actor(Role::Customer);
    let room = room_between(&customer, UserId::random(), now);
    let room_id = room.room_id.clone();
    let mut rooms = MockChatRepository::new();
    rooms.expect_find().returning(move |_| Ok(Some(room.clone())));
    rooms
        .expect_append_message()
        .withf(|room, message| room.messages.len() == 1 && message.content == "Is this in stock?")
        .times(1)
        .returning(|_, _| Ok(true));
    let service = ChatService::new(
        Arc::new(rooms),
        Arc::new(MockUserRepository::new()),
        clock(now),
    );

    let message = service
        .post(&customer, &room_id, "  Is this in stock?  ", MessageType::Text)
        .await
        .expect("posted");
    assert_eq!(message.sender, customer.id);
    assert_eq!(message.timestamp, now);
}

#[rstest]
#[tokio::test]
async fn blank_messages_are_invalid(now: DateTime<Utc>) {
    let customer = actor(Role::Customer);
    let room = room_between(&customer, UserId::random(), now);
    let room_id = room.room_id.clone();
    let mut rooms = MockChatRepository::new();
    rooms.expect_find().returning(move |_| Ok(Some(room.clone())));
    let service = ChatService::new(
        Arc::new(rooms),
        Arc::new(MockUserRepository::new()),
        clock(now),
    );

    let err = service
        .post(&customer, &room_id, "   ", MessageType::Text)
        .await
        .expect_err("blank");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
