//! ApiClient against an in-process axum backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use famcal_client::{ApiClient, ApiError, ChildFilter, Session};
use famcal_core::grid::ViewMode;
use famcal_core::{EventDraft, EventTime};
use serde_json::{Value, json};

const TOKEN: &str = "test-token";

/// Requests the backend saw, as "METHOD path?query" strings.
type Log = Arc<Mutex<Vec<String>>>;

type Reply = (StatusCode, Json<Value>);

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "error": "Invalid token" })),
    )
}

fn ok(data: Value) -> Reply {
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

fn event_json(id: i64, start: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Event {id}"),
        "startDate": start,
        "isAllDay": false,
        "type": "school",
        "priority": "medium",
        "color": "#3B82F6",
        "childId": null,
        "hasReminder": false,
        "reminderMinutes": null
    })
}

async fn login(Json(body): Json<Value>) -> Reply {
    if body["password"] == "correct-horse" {
        ok(json!({
            "token": TOKEN,
            "user": { "id": 1, "name": "Sam", "email": body["email"] }
        }))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Invalid email or password" })),
        )
    }
}

async fn list_children(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!([{
        "id": 3,
        "name": "Maya",
        "gradeLevel": "3rd Grade",
        "schoolName": "Lincoln Elementary",
        "birthDate": "2016-09-14T00:00:00.000Z"
    }]))
}

async fn monthly(
    State(log): State<Log>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    let month: u32 = query["month"].parse().unwrap_or(0);
    log.lock().unwrap().push(format!(
        "GET /calendar/monthly?year={}&month={}&childId={}",
        query["year"], month, query["childId"]
    ));

    let (event, key) = if month == 3 {
        (event_json(1, "2025-03-05T10:00:00Z"), "2025-03-05")
    } else {
        (event_json(2, "2025-02-24T16:00:00Z"), "2025-02-24")
    };
    ok(json!({ "events": [event.clone()], "eventsByDate": { key: [event] } }))
}

async fn list_events(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    if query.get("childId").map(String::as_str) == Some("99") {
        return ok(json!([event_json(1, "Invalid Date")]));
    }
    ok(json!([event_json(1, "2025-03-05T10:00:00Z")]))
}

async fn create_event(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    log.lock().unwrap().push("POST /events".to_string());

    if body["title"] == "Clash" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "success": false,
                "error": "Validation failed",
                "errors": { "startDate": ["Overlaps with another event"] }
            })),
        );
    }

    let mut event = body.clone();
    event["id"] = json!(42);
    ok(event)
}

async fn get_event(headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": format!("Event {id} not found") })),
    )
}

async fn delete_event(headers: HeaderMap, Path(_id): Path<i64>) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    StatusCode::NO_CONTENT
}

async fn analyze_email(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({
        "events": [{
            "title": "Parent-teacher conference",
            "startDate": "2025-04-02T17:30:00Z",
            "type": "school",
            "childId": body["childId"]
        }],
        "summary": "Found 1 event"
    }))
}

async fn analyze_image(headers: HeaderMap, mut multipart: Multipart) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut seen = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap();
        seen.push(json!({
            "name": name,
            "fileName": file_name,
            "contentType": content_type,
            "len": bytes.len()
        }));
    }

    ok(json!({
        "events": [{ "title": "Picture day", "startDate": "2025-04-09", "isAllDay": true }],
        "summary": serde_json::to_string(&seen).unwrap()
    }))
}

async fn spawn() -> (String, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/children", get(list_children))
        .route("/calendar/monthly", get(monthly))
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event).delete(delete_event))
        .route("/ai/analyze-email", post(analyze_email))
        .route("/ai/analyze-image", post(analyze_image))
        .with_state(log.clone());
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api"), log)
}

async fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(5))
        .unwrap()
        .with_session(&Session::new(TOKEN, None))
}

fn draft(title: &str) -> EventDraft {
    let mut draft = EventDraft::new(title, EventTime::parse("2025-03-05T10:00:00Z").unwrap());
    draft.end_date = Some(EventTime::parse("2025-03-05T11:00:00Z").unwrap());
    draft
}

#[tokio::test]
async fn login_session_authenticates_later_calls() {
    let (base, _) = spawn().await;
    let anonymous = ApiClient::new(&base, Duration::from_secs(5)).unwrap();

    let auth = anonymous.login("sam@example.com", "correct-horse").await.unwrap();
    assert_eq!(auth.user.name, "Sam");

    let session = Session::from(auth);
    assert_eq!(session.token, TOKEN);

    let children = anonymous.with_session(&session).list_children().await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].birth_date, NaiveDate::from_ymd_opt(2016, 9, 14));
}

#[tokio::test]
async fn wrong_password_surfaces_server_message() {
    let (base, _) = spawn().await;
    let anonymous = ApiClient::new(&base, Duration::from_secs(5)).unwrap();

    let err = anonymous.login("sam@example.com", "nope").await.unwrap_err();
    match err {
        ApiError::Server { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn rejected_token_is_unauthorized() {
    let (base, _) = spawn().await;
    let stale = ApiClient::new(&base, Duration::from_secs(5))
        .unwrap()
        .with_session(&Session::new("expired", None));

    let err = stale.list_children().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn monthly_calendar_sends_filters_and_dedupes() {
    let (base, log) = spawn().await;
    let api = client(&base).await;

    let calendar = api.monthly_calendar(2025, 3, ChildFilter::All).await.unwrap();

    let day = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    let on_day = calendar.events_on(day);
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].id, 1);

    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["GET /calendar/monthly?year=2025&month=3&childId=-1"]
    );
}

#[tokio::test]
async fn month_view_loads_the_backfilled_month_too() {
    let (base, log) = spawn().await;
    let api = client(&base).await;

    let reference = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let calendar = api
        .calendar_view(reference, ViewMode::Month, ChildFilter::Child(3))
        .await
        .unwrap();

    assert_eq!(calendar.events.len(), 2);
    let feb_24 = NaiveDate::from_ymd_opt(2025, 2, 24).unwrap();
    assert_eq!(calendar.events_on(feb_24)[0].id, 2);
    assert_eq!(
        log.lock().unwrap().as_slice(),
        [
            "GET /calendar/monthly?year=2025&month=2&childId=3",
            "GET /calendar/monthly?year=2025&month=3&childId=3",
        ]
    );
}

#[tokio::test]
async fn invalid_month_is_rejected_locally() {
    let (base, log) = spawn().await;
    let api = client(&base).await;

    let err = api.monthly_calendar(2025, 13, ChildFilter::All).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_dates_are_rejected_at_decode() {
    let (base, _) = spawn().await;
    let api = client(&base).await;

    let err = api.list_events(None, ChildFilter::Child(99)).await.unwrap_err();
    match err {
        ApiError::Decode(message) => assert!(message.contains("Invalid date"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_event_round_trip() {
    let (base, log) = spawn().await;
    let api = client(&base).await;

    let created = api.create_event(&draft("Science fair")).await.unwrap();
    assert_eq!(created.id, 42);
    assert_eq!(created.title, "Science fair");
    assert_eq!(log.lock().unwrap().as_slice(), ["POST /events"]);
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_server() {
    let (base, log) = spawn().await;
    let api = client(&base).await;

    let err = api.create_event(&draft("  ")).await.unwrap_err();
    match err {
        ApiError::Validation(errors) => assert!(errors.has("title")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn server_field_errors_are_validation_errors() {
    let (base, _) = spawn().await;
    let api = client(&base).await;

    let err = api.create_event(&draft("Clash")).await.unwrap_err();
    match err {
        ApiError::Validation(errors) => {
            assert_eq!(errors.field("startDate"), ["Overlaps with another event"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn not_found_and_no_content() {
    let (base, _) = spawn().await;
    let api = client(&base).await;

    let err = api.get_event(7).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 404, ref message } if message == "Event 7 not found"));

    api.delete_event(7).await.unwrap();
}

#[tokio::test]
async fn missing_session_fails_before_sending() {
    let (base, log) = spawn().await;
    let anonymous = ApiClient::new(&base, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        anonymous.list_children().await,
        Err(ApiError::NotLoggedIn)
    ));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn analyze_email_returns_drafts() {
    let (base, _) = spawn().await;
    let api = client(&base).await;

    let result = api
        .analyze_email("Conferences are on April 2 at 5:30pm", Some(3))
        .await
        .unwrap();

    assert_eq!(result.events.len(), 1);
    assert_eq!(result.events[0].child_id, Some(3));
    assert_eq!(result.summary.as_deref(), Some("Found 1 event"));
}

#[tokio::test]
async fn analyze_image_uploads_multipart() {
    let (base, _) = spawn().await;
    let api = client(&base).await;

    let result = api
        .analyze_image("flyer.png", vec![0x89, b'P', b'N', b'G'], Some(3))
        .await
        .unwrap();

    assert!(result.events[0].is_all_day);

    let seen: Vec<Value> = serde_json::from_str(result.summary.as_deref().unwrap()).unwrap();
    assert_eq!(seen[0]["name"], "image");
    assert_eq!(seen[0]["fileName"], "flyer.png");
    assert_eq!(seen[0]["contentType"], "image/png");
    assert_eq!(seen[0]["len"], 4);
    assert_eq!(seen[1]["name"], "childId");
}

#[tokio::test]
async fn unsupported_image_type_is_rejected_locally() {
    let (base, _) = spawn().await;
    let api = client(&base).await;

    let err = api.analyze_image("notes.pdf", vec![1, 2, 3], None).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
