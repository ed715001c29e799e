use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use contacts_api::config::{ApiConfig, BasicCredential};
use contacts_api::negotiation::{APPLICATION_XML, JSON_PATCH, PROBLEM_JSON, VENDOR_CONTACT_JSON, VENDOR_CONTACT_WITH_PHONES_JSON};
use contacts_api::{ContactsEndpoint, router};
use contacts_store::{InMemoryContactStore, seed_contacts};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|error| panic!("body is not JSON ({error}): {:?}", self.body))
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

fn app() -> Router {
    app_with(ApiConfig::default())
}

fn app_with(config: ApiConfig) -> Router {
    let store = InMemoryContactStore::with_contacts(seed_contacts()).expect("seed store");
    router(ContactsEndpoint::new(Arc::new(config), Arc::new(store)))
}

fn request(method: Method, uri: &str, headers: &[(&str, &str)], body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body.into()).expect("valid request")
}

fn get(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    request(Method::GET, uri, headers, Body::empty())
}

fn json_request(method: Method, uri: &str, content_type: &str, body: Value) -> Request<Body> {
    request(method, uri, &[("content-type", content_type)], body.to_string())
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    TestResponse { status, headers, body }
}

#[tokio::test(start_paused = true)]
async fn create_get_patch_and_read_after_ttl() {
    let app = app();

    let created = send(
        &app,
        json_request(
            Method::POST,
            "/contacts",
            "application/json",
            json!({"firstName": "Jan", "lastName": "Kowalski", "email": "jk@u.pl"}),
        ),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json()["id"].as_i64().expect("created id");
    let location = format!("/contacts/{id}");
    assert_eq!(created.header("location"), Some(location.as_str()));

    let fetched = send(&app, get(&location, &[])).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.header("cache-control"), Some("public, max-age=60"));
    assert_eq!(
        fetched.json(),
        json!({"id": id, "firstName": "Jan", "lastName": "Kowalski", "email": "jk@u.pl", "phones": []})
    );

    let patched = send(
        &app,
        json_request(
            Method::PATCH,
            &location,
            JSON_PATCH,
            json!([{"op": "replace", "path": "/email", "value": "new@new.pl"}]),
        ),
    )
    .await;
    assert_eq!(patched.status, StatusCode::NO_CONTENT);

    tokio::time::advance(Duration::from_secs(61)).await;
    let refreshed = send(&app, get(&location, &[])).await;
    assert_eq!(refreshed.json()["email"], "new@new.pl");
    assert_eq!(refreshed.json()["firstName"], "Jan");
}

#[tokio::test(start_paused = true)]
async fn cached_read_lags_writes_until_ttl_expires() {
    let app = app();

    let first = send(&app, get("/contacts/2", &[])).await;
    let replaced = send(
        &app,
        json_request(
            Method::PUT,
            "/contacts/2",
            "application/json",
            json!({"firstName": "Adam", "lastName": "Nowicki", "email": "anowak@u.pl"}),
        ),
    )
    .await;
    assert_eq!(replaced.status, StatusCode::NO_CONTENT);

    let second = send(&app, get("/contacts/2", &[])).await;
    assert_eq!(first.body, second.body, "cached representation should be served within the TTL");

    tokio::time::advance(Duration::from_secs(60)).await;
    let third = send(&app, get("/contacts/2", &[])).await;
    assert_eq!(third.json()["lastName"], "Nowicki");
}

#[tokio::test]
async fn unknown_identifiers_are_not_found() {
    let app = app();
    let body = json!({"firstName": "A", "lastName": "B"});

    let responses = [
        send(&app, get("/contacts/404", &[])).await,
        send(&app, json_request(Method::PUT, "/contacts/404", "application/json", body)).await,
        send(
            &app,
            json_request(Method::PATCH, "/contacts/404", JSON_PATCH, json!([{"op": "remove", "path": "/email"}])),
        )
        .await,
        send(&app, request(Method::DELETE, "/contacts/404", &[], Body::empty())).await,
        send(&app, get("/contacts/404/phones", &[])).await,
    ];
    for response in responses {
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.header("content-type"), Some(PROBLEM_JSON));
        assert_eq!(response.json()["status"], 404);
    }
}

#[tokio::test]
async fn repeated_delete_is_not_found() {
    let app = app();
    let delete = || request(Method::DELETE, "/contacts/1", &[], Body::empty());

    assert_eq!(send(&app, delete()).await.status, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, delete()).await.status, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/contacts", &[])).await.json().as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn vendor_media_type_selects_summary_on_the_same_route() {
    let app = app();

    let details = send(&app, get("/contacts/1", &[])).await;
    assert_eq!(details.json()["phones"].as_array().map(Vec::len), Some(2));

    let vendor = send(&app, get("/contacts/1", &[("accept", VENDOR_CONTACT_JSON)])).await;
    assert_eq!(vendor.status, StatusCode::OK);
    assert_eq!(vendor.header("content-type"), Some(VENDOR_CONTACT_JSON));
    assert_eq!(vendor.json(), json!({"id": 1, "fullName": "Jan Kowalski"}));
}

#[tokio::test]
async fn accept_header_drives_format_and_rejects_unknown_types() {
    let app = app();

    let xml = send(&app, get("/contacts/1", &[("accept", "text/html, application/xml;q=0.9")])).await;
    assert_eq!(xml.header("content-type"), Some(APPLICATION_XML));
    assert!(xml.body.starts_with(b"<contact>"));

    let wildcard = send(&app, get("/contacts", &[("accept", "*/*")])).await;
    assert_eq!(wildcard.header("content-type"), Some("application/json"));

    let rejected = send(&app, get("/contacts/1", &[("accept", "text/json")])).await;
    assert_eq!(rejected.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(rejected.json()["status"], 406);
}

#[tokio::test]
async fn unregistered_content_type_is_unsupported() {
    let app = app();
    let response = send(
        &app,
        json_request(Method::POST, "/contacts", "text/plain", json!({"firstName": "A", "lastName": "B"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let patch_as_json = send(
        &app,
        json_request(Method::PATCH, "/contacts/1", "application/json", json!([])),
    )
    .await;
    assert_eq!(patch_as_json.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn vendor_creation_persists_phones_and_returns_details() {
    let app = app();
    let created = send(
        &app,
        json_request(
            Method::POST,
            "/contacts",
            VENDOR_CONTACT_WITH_PHONES_JSON,
            json!({
                "firstName": "Ewa",
                "lastName": "Lis",
                "phones": [{"number": "333-333-3333", "description": "Komórka"}]
            }),
        ),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let body = created.json();
    assert_eq!(body["firstName"], "Ewa");
    assert_eq!(body["phones"][0]["number"], "333-333-3333");

    let phones = send(&app, get(&format!("/contacts/{}/phones", body["id"]), &[])).await;
    assert_eq!(phones.json()[0]["description"], "Komórka");

    let missing_phones = send(
        &app,
        json_request(
            Method::POST,
            "/contacts",
            VENDOR_CONTACT_WITH_PHONES_JSON,
            json!({"firstName": "Ewa", "lastName": "Lis"}),
        ),
    )
    .await;
    assert_eq!(missing_phones.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(missing_phones.json()["errors"]["phones"].is_array());
}

#[tokio::test]
async fn invalid_input_reports_field_errors() {
    let app = app();
    let response = send(
        &app,
        json_request(
            Method::POST,
            "/contacts",
            "application/json",
            json!({"firstName": "Same", "lastName": "Same", "email": "nope"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let problem = response.json();
    assert_eq!(problem["errors"]["wrongName"][0], "First name and last name cannot be the same.");
    assert_eq!(problem["errors"]["email"][0], "The Email field is not a valid e-mail address.");

    let malformed = send(&app, request(Method::POST, "/contacts", &[("content-type", "application/json")], "{")).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_rejections_carry_reason_codes() {
    let app = app();

    let structural = send(
        &app,
        json_request(
            Method::PATCH,
            "/contacts/1",
            JSON_PATCH,
            json!([{"op": "replace", "path": "/nickname", "value": "JK"}]),
        ),
    )
    .await;
    assert_eq!(structural.status, StatusCode::BAD_REQUEST);
    assert_eq!(structural.json()["reason"], "invalid_path");

    let invalid = send(
        &app,
        json_request(
            Method::PATCH,
            "/contacts/1",
            JSON_PATCH,
            json!([
                {"op": "replace", "path": "/firstName", "value": "X"},
                {"op": "replace", "path": "/lastName", "value": "X"}
            ]),
        ),
    )
    .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(invalid.json()["reason"], "validation_failed");
    assert!(invalid.json()["errors"]["wrongName"].is_array());

    let unchanged = send(&app, get("/contacts", &[])).await;
    assert_eq!(unchanged.json()[0]["fullName"], "Jan Kowalski");
}

#[tokio::test]
async fn search_filters_by_last_name() {
    let app = app();
    let matches = send(&app, get("/contacts?search=KOW", &[])).await;
    assert_eq!(matches.json(), json!([{"id": 1, "fullName": "Jan Kowalski"}]));

    let none = send(&app, get("/contacts?search=zzz", &[])).await;
    assert_eq!(none.status, StatusCode::OK);
    assert_eq!(none.json(), json!([]));

    let xml = send(&app, get("/contacts", &[("accept", APPLICATION_XML)])).await;
    let xml = String::from_utf8(xml.body.to_vec()).expect("utf-8 body");
    assert!(xml.starts_with("<contacts><contact>"), "{xml}");
}

#[tokio::test]
async fn phones_are_scoped_to_their_contact() {
    let app = app();
    let phone = send(&app, get("/contacts/1/phones/2", &[])).await;
    assert_eq!(phone.json(), json!({"id": 2, "number": "222-222-2222", "description": "Służbowy"}));

    let foreign = send(&app, get("/contacts/2/phones/2", &[])).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn version_header_selects_operation_table() {
    let config = ApiConfig {
        credentials: vec![BasicCredential {
            username: "reader".into(),
            password: "secret".into(),
        }],
        ..ApiConfig::default()
    };
    let app = app_with(config);

    let unsupported = send(&app, get("/contacts", &[("x-api-version", "3.0")])).await;
    assert_eq!(unsupported.status, StatusCode::BAD_REQUEST);

    let missing_operation = send(&app, get("/contacts/1", &[("x-api-version", "2.0")])).await;
    assert_eq!(missing_operation.status, StatusCode::BAD_REQUEST);

    let anonymous = send(&app, get("/contacts", &[("x-api-version", "2")])).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.header("www-authenticate"), Some(r#"Basic realm="contacts""#));

    let credentials = format!("Basic {}", BASE64.encode("reader:secret"));
    let authenticated = send(
        &app,
        get("/contacts", &[("x-api-version", "2"), ("authorization", credentials.as_str())]),
    )
    .await;
    assert_eq!(authenticated.status, StatusCode::OK);
    assert_eq!(authenticated.json().as_array().map(Vec::len), Some(2));

    let version_one = send(&app, get("/contacts", &[("x-api-version", "1.0")])).await;
    assert_eq!(version_one.status, StatusCode::OK);
}

#[tokio::test]
async fn every_response_advertises_supported_versions() {
    let app = app();
    for request in [get("/contacts", &[]), get("/contacts/999", &[]), get("/contacts", &[("x-api-version", "9")])] {
        let response = send(&app, request).await;
        assert_eq!(response.header("api-supported-versions"), Some("1.0, 2.0"));
    }
}

#[tokio::test]
async fn cors_headers_only_for_allowed_origins() {
    let app = app();

    let preflight = send(
        &app,
        request(
            Method::OPTIONS,
            "/contacts",
            &[
                ("origin", "http://localhost:3000"),
                ("access-control-request-method", "POST"),
                ("access-control-request-headers", "content-type, x-api-version"),
            ],
            Body::empty(),
        ),
    )
    .await;
    assert_eq!(preflight.status, StatusCode::NO_CONTENT);
    assert_eq!(preflight.header("access-control-allow-origin"), Some("http://localhost:3000"));
    assert_eq!(preflight.header("access-control-allow-headers"), Some("content-type, x-api-version"));

    let allowed = send(&app, get("/contacts", &[("origin", "http://localhost:5173")])).await;
    assert_eq!(allowed.header("access-control-allow-origin"), Some("http://localhost:5173"));
    assert_eq!(allowed.headers.get(header::VARY).and_then(|value| value.to_str().ok()), Some("origin"));

    let foreign = send(&app, get("/contacts", &[("origin", "https://evil.example")])).await;
    assert_eq!(foreign.status, StatusCode::OK);
    assert!(foreign.header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn null_required_member_is_a_field_error() {
    let app = app();
    let body = json!({"firstName": null, "lastName": "x"});

    for method in [Method::POST, Method::PUT] {
        let uri = if method == Method::POST { "/contacts" } else { "/contacts/1" };
        let response = send(&app, json_request(method.clone(), uri, "application/json", body.clone())).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{method} {uri}");
        assert_eq!(response.json()["errors"]["firstName"][0], "The FirstName field is required.");
    }
}
