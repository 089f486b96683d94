mod common;

use api_adapters::wire::{Event, EventDelete, EventList, EventPost, EventUpdate, StateResponse};
use api_adapters::encode_cutoff;
use axum::http::{Method, StatusCode};
use common::{router, send, TOKEN};
use domains::timeline::parse_storage;
use domains::{DomainError, EventId, MockEventRepository, MockImageStore};
use mockall::predicate::eq;
use prost::Message;

const UUID: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";

fn new_event(title: &str) -> Event {
    Event {
        uuid: UUID.into(),
        title: Some(title.into()),
        time: Some("2024/03/05".into()),
        ..Default::default()
    }
}

fn message(body: &[u8]) -> String {
    StateResponse::decode(body).unwrap().message
}

#[tokio::test]
async fn wrong_token_is_rejected_before_any_write() {
    let mut repo = MockEventRepository::new();
    repo.expect_insert_many().never();
    repo.expect_update().never();
    repo.expect_delete_many().never();
    let app = router(repo, MockImageStore::new());

    let post = EventPost {
        token: "bad".into(),
        events: vec![new_event("x")],
    };
    let (status, _, body) = send(&app, Method::POST, "/api/events", post.encode_to_vec()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message(&body), "failed");

    let update = EventUpdate {
        token: "bad".into(),
        event: Some(new_event("y")),
    };
    let (status, _, _) = send(&app, Method::PUT, "/api/events", update.encode_to_vec()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let delete = EventDelete {
        token: String::new(),
        uuids: vec![UUID.into()],
    };
    let (status, _, _) = send(&app, Method::DELETE, "/api/events", delete.encode_to_vec()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_body_is_bad_request() {
    let app = router(MockEventRepository::new(), MockImageStore::new());

    let (status, headers, body) = send(&app, Method::POST, "/api/events", vec![0x12, 0xff, 0xff]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["content-type"], "application/octet-stream");
    assert_eq!(message(&body), "failed");
}

#[tokio::test]
async fn malformed_uuid_is_bad_request_even_with_valid_token() {
    let mut repo = MockEventRepository::new();
    repo.expect_delete_many().never();
    let app = router(repo, MockImageStore::new());

    let delete = EventDelete {
        token: TOKEN.into(),
        uuids: vec![UUID.into(), "1' OR '1'='1".into()],
    };
    let (status, _, body) = send(&app, Method::DELETE, "/api/events", delete.encode_to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "failed");
}

#[tokio::test]
async fn create_inserts_converted_events() {
    let mut repo = MockEventRepository::new();
    repo.expect_insert_many()
        .withf(|events| {
            events.len() == 1
                && events[0].uuid.as_str() == UUID
                && events[0].time == parse_storage("2024-03-05 00:00:00").unwrap()
                && events[0].description.is_empty()
        })
        .times(1)
        .returning(|_| Ok(()));
    let app = router(repo, MockImageStore::new());

    let post = EventPost {
        token: TOKEN.into(),
        events: vec![new_event("launch")],
    };
    let (status, _, body) = send(&app, Method::POST, "/api/events", post.encode_to_vec()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "success");
}

#[tokio::test]
async fn backend_failure_reports_generic_message() {
    let mut repo = MockEventRepository::new();
    repo.expect_insert_many()
        .returning(|_| Err(DomainError::Backend("UNIQUE constraint failed: events.uuid".into())));
    let app = router(repo, MockImageStore::new());

    let post = EventPost {
        token: TOKEN.into(),
        events: vec![new_event("dup")],
    };
    let (status, _, body) = send(&app, Method::POST, "/api/events", post.encode_to_vec()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message(&body), "internal error");
}

#[tokio::test]
async fn update_without_event_is_bad_request() {
    let app = router(MockEventRepository::new(), MockImageStore::new());

    let update = EventUpdate {
        token: TOKEN.into(),
        event: None,
    };
    let (status, _, _) = send(&app, Method::PUT, "/api/events", update.encode_to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_of_unknown_uuid_still_succeeds() {
    let mut repo = MockEventRepository::new();
    repo.expect_update()
        .withf(|uuid, patch| uuid.as_str() == UUID && patch.title.as_deref() == Some("X") && patch.href.is_none())
        .times(1)
        .returning(|_, _| Ok(0));
    let app = router(repo, MockImageStore::new());

    let update = EventUpdate {
        token: TOKEN.into(),
        event: Some(Event {
            uuid: UUID.into(),
            title: Some("X".into()),
            ..Default::default()
        }),
    };
    let (status, _, body) = send(&app, Method::PUT, "/api/events", update.encode_to_vec()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "success");
}

#[tokio::test]
async fn list_decodes_cutoff_and_needs_no_token() {
    let cutoff = parse_storage("2024-07-10 00:00:00").unwrap();
    let stored = domains::Event {
        uuid: EventId::parse(UUID).unwrap(),
        time: parse_storage("2024-05-01 09:00:00").unwrap(),
        title: "spring".into(),
        href: Some("https://example.com".into()),
        description: "d".into(),
        image_hash: None,
    };

    let mut repo = MockEventRepository::new();
    repo.expect_list_between()
        .with(eq(parse_storage("2024-01-10 00:00:00").unwrap()), eq(cutoff))
        .times(1)
        .returning(move |_, _| Ok(vec![stored.clone()]));
    let app = router(repo, MockImageStore::new());

    let uri = format!("/api/events/?q={}", encode_cutoff(&cutoff));
    let (status, _, body) = send(&app, Method::GET, &uri, vec![]).await;
    assert_eq!(status, StatusCode::OK);

    let list = EventList::decode(body).unwrap();
    assert_eq!(list.events.len(), 1);
    assert_eq!(list.events[0].time.as_deref(), Some("2024/05/01"));
    assert_eq!(list.events[0].href.as_deref(), Some("https://example.com"));
    assert_eq!(list.events[0].image_hash, None);
}

#[tokio::test]
async fn undecodable_cutoff_is_bad_request() {
    let mut repo = MockEventRepository::new();
    repo.expect_list_between().never();
    let app = router(repo, MockImageStore::new());

    let (status, _, _) = send(&app, Method::GET, "/api/events?q=%21%21%21", vec![]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_query_string_answers_with_protobuf_failure() {
    let mut repo = MockEventRepository::new();
    repo.expect_list_between().never();
    let app = router(repo, MockImageStore::new());

    let (status, headers, body) = send(&app, Method::GET, "/api/events?q=a&q=b", vec![]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["content-type"], "application/octet-stream");
    assert_eq!(message(&body), "failed");
}
