/// Integration tests for the Ilmo web server
///
/// These tests require a running PostgreSQL database:
/// - Registration through the public form
/// - Backup registrations on full events
/// - Field specification uploads
/// - Admin listing, mark-as-paid and CSV export

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{admin_json_request, body_bytes, form_request, TestContext, CONTACT_SPEC};
use ilmo_shared::gender::Gender;
use ilmo_shared::models::attendee::EventAttendee;
use ilmo_shared::models::event::Event;
use serde_json::json;
use uuid::Uuid;

async fn register(ctx: &TestContext, alias: &str, body: &str) {
    let response = ctx.send(form_request(&format!("/{}/", alias), body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/thanks");
}

#[tokio::test]
async fn test_registration_round_trip() {
    let ctx = TestContext::new().await.unwrap();
    let event = ctx.create_event(None, CONTACT_SPEC).await.unwrap();

    let page = ctx
        .send(
            Request::builder()
                .uri(format!("/{}/", event.url_alias))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(page.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(page).await).unwrap();
    assert!(html.contains("Test Event"));
    assert!(html.contains(r#"name="email""#));

    register(
        &ctx,
        &event.url_alias,
        "name=Jane+Doe&email=j%40example.com&phone=123&extra=x",
    )
    .await;

    let attendees = EventAttendee::list_by_event(&ctx.db, event.id).await.unwrap();
    assert_eq!(attendees.len(), 1);

    let attendee = &attendees[0];
    assert_eq!(attendee.attendee_name, "Jane Doe");
    assert_eq!(attendee.attendee_email, "j@example.com");
    assert_eq!(attendee.attendee_phone, "123");
    assert_eq!(attendee.attendee_gender, Gender::Female);
    assert!(!attendee.isbackup);
    assert!(!attendee.haspaid);
    assert_eq!(attendee.details(), json!({"extra": "x"}).as_object().cloned().unwrap());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_long_contact_answers_are_stored() {
    let ctx = TestContext::new().await.unwrap();
    let event = ctx.create_event(None, CONTACT_SPEC).await.unwrap();

    let name = "A".repeat(300);
    let phone = "1".repeat(100);
    register(
        &ctx,
        &event.url_alias,
        &format!("name={}&email=j%40example.com&phone={}", name, phone),
    )
    .await;

    let attendees = EventAttendee::list_by_event(&ctx.db, event.id).await.unwrap();
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].attendee_name, name);
    assert_eq!(attendees[0].attendee_phone, phone);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_registration_on_full_event_is_backup() {
    let ctx = TestContext::new().await.unwrap();
    let event = ctx.create_event(Some(1), CONTACT_SPEC).await.unwrap();

    register(&ctx, &event.url_alias, "name=Matti+Meikalainen&email=m%40example.com").await;
    register(&ctx, &event.url_alias, "name=Jane+Doe&email=j%40example.com").await;

    let attendees = EventAttendee::list_by_event(&ctx.db, event.id).await.unwrap();
    assert_eq!(attendees.len(), 2);
    assert!(!attendees[0].isbackup);
    assert_eq!(attendees[0].attendee_gender, Gender::Male);
    assert!(attendees[1].isbackup);
    assert!(event.is_full(&ctx.db).await.unwrap());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_invalid_submission_rerenders_form() {
    let ctx = TestContext::new().await.unwrap();
    let event = ctx.create_event(None, CONTACT_SPEC).await.unwrap();

    let response = ctx
        .send(form_request(
            &format!("/{}/", event.url_alias),
            "name=&email=not-an-email&phone=555",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("This field is required."));
    assert!(html.contains("Enter a valid email address."));
    assert!(html.contains(r#"value="555""#));

    assert_eq!(Event::attendee_count(&ctx.db, event.id).await.unwrap(), 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(
            Request::builder()
                .uri(format!("/no-such-event-{}/", Uuid::new_v4().simple()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_field_spec_upload() {
    let ctx = TestContext::new().await.unwrap();
    let event = ctx.create_event(None, CONTACT_SPEC).await.unwrap();
    let uri = format!("/admin/events/{}/fields", event.url_alias);

    let upload = |body: &str| {
        Request::builder()
            .method("PUT")
            .uri(&uri)
            .header("authorization", ctx.auth_header())
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    // Missing name on one entry rejects the whole upload
    let response = ctx
        .send(upload(r#"[{"type": "text", "name": "name"}, {"type": "checkbox"}]"#))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["message"].as_str().unwrap().contains("'name'"));

    let response = ctx.send(upload(r#"[{"type": "slider", "name": "volume"}]"#)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let stored = Event::find_by_id(&ctx.db, event.id).await.unwrap().unwrap();
    assert_eq!(stored.form_fields.0.len(), 4);

    let response = ctx
        .send(upload(
            r#"[{"type": "text", "name": "name", "required": true},
                {"type": "checkbox", "name": "sauna", "label": "Sauna"}]"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["fields"], 2);

    register(&ctx, &event.url_alias, "name=Maija&sauna=on").await;
    let attendees = EventAttendee::list_by_event(&ctx.db, event.id).await.unwrap();
    assert_eq!(attendees[0].attendee_email, "N/A");
    assert_eq!(attendees[0].attendee_details, r#"{"sauna":"Yes"}"#);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_mark_paid_updates_exactly_selected() {
    let ctx = TestContext::new().await.unwrap();
    let event = ctx.create_event(None, CONTACT_SPEC).await.unwrap();

    for name in ["A", "B", "C"] {
        register(&ctx, &event.url_alias, &format!("name={}&email=a%40example.com", name)).await;
    }
    let attendees = EventAttendee::list_by_event(&ctx.db, event.id).await.unwrap();
    let selected = vec![attendees[0].id, attendees[2].id];

    let response = ctx
        .send(admin_json_request(
            "POST",
            "/admin/attendees/mark-paid",
            json!({ "ids": selected }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["updated"], 2);

    let attendees = EventAttendee::list_by_event(&ctx.db, event.id).await.unwrap();
    let paid: Vec<bool> = attendees.iter().map(|a| a.haspaid).collect();
    assert_eq!(paid, vec![true, false, true]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_export_selected_attendees() {
    let ctx = TestContext::new().await.unwrap();
    let event = ctx.create_event(None, CONTACT_SPEC).await.unwrap();

    register(&ctx, &event.url_alias, "name=A&email=a%40x.fi&phone=1&extra=").await;
    register(&ctx, &event.url_alias, "name=B&email=b%40x.fi&phone=2&extra=Oulu").await;

    let ids: Vec<Uuid> = EventAttendee::list_by_event(&ctx.db, event.id)
        .await
        .unwrap()
        .iter()
        .map(|a| a.id)
        .collect();

    let response = ctx
        .send(admin_json_request("POST", "/admin/attendees/export", json!({ "ids": ids })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=osallistujat.csv"
    );

    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let csv = csv.strip_prefix('\u{feff}').unwrap();
    let mut lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.remove(0), "event;name;email;phone;extra");
    lines.sort();
    assert_eq!(
        lines,
        vec!["Test Event;A;a@x.fi;1;", "Test Event;B;b@x.fi;2;Oulu"]
    );

    let response = ctx
        .send(admin_json_request("POST", "/admin/attendees/export", json!({ "ids": [] })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_admin_creates_event_with_payment() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(admin_json_request(
            "POST",
            "/admin/payments",
            json!({
                "recipient": "Kilta ry",
                "account_number": "FI21 1234 5600 0007 85",
                "amount_cents": 1250,
                "due_date": "2030-01-15"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();

    let alias = format!("sitsit-{}", Uuid::new_v4().simple());
    let response = ctx
        .send(admin_json_request(
            "POST",
            "/admin/events",
            json!({
                "url_alias": alias,
                "title": "Sitsit",
                "starts_at": "2099-01-20T18:00:00Z",
                "capacity": 80,
                "place_id": ctx.place.id,
                "payment_id": payment["id"],
                "form_fields": [{"type": "text", "name": "name", "required": true}]
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate alias
    let response = ctx
        .send(admin_json_request(
            "POST",
            "/admin/events",
            json!({
                "url_alias": alias,
                "title": "Sitsit again",
                "starts_at": "2099-01-20T18:00:00Z",
                "place_id": ctx.place.id
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    register(&ctx, &alias, "name=Jane").await;

    let page = ctx
        .send(Request::builder().uri(format!("/{}/", alias)).body(Body::empty()).unwrap())
        .await;
    let html = String::from_utf8(body_bytes(page).await).unwrap();
    assert!(html.contains("12.50"));
    assert!(html.contains("FI21 1234 5600 0007 85"));
    assert!(html.contains("Jane"));

    let response = ctx
        .send(
            Request::builder()
                .uri(format!("/admin/events/{}/attendees", alias))
                .header("authorization", ctx.auth_header())
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let reference = listing[0]["reference_number"].as_str().unwrap();
    assert!(html.contains(reference));
    assert!(ilmo_shared::reference::is_valid(reference));

    // Payments are not owned by the test place
    let payment_id = Uuid::parse_str(payment["id"].as_str().unwrap()).unwrap();
    sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(payment_id)
        .execute(&ctx.db)
        .await
        .unwrap();

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_event_list_shows_upcoming_only() {
    let ctx = TestContext::new().await.unwrap();
    let upcoming = ctx.create_event(None, CONTACT_SPEC).await.unwrap();

    let past_alias = format!("past-{}", Uuid::new_v4().simple());
    sqlx::query(
        "INSERT INTO events (url_alias, title, starts_at, place_id) VALUES ($1, 'Old', NOW() - INTERVAL '1 day', $2)",
    )
    .bind(&past_alias)
    .bind(ctx.place.id)
    .execute(&ctx.db)
    .await
    .unwrap();

    let response = ctx
        .send(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains(&upcoming.url_alias));
    assert!(!html.contains(&past_alias));

    ctx.cleanup().await.unwrap();
}
