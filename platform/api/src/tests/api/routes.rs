use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, HeaderMap, Method, Request, StatusCode};
use serde_json::{json, Value};
use ulid::Ulid;
use utils::http::router::Router;
use utils::http::RouteError;
use utils::prelude::FutureTimeout;

use crate::api::error::ApiError;
use crate::api::{routes, Body};
use crate::config::AppConfig;
use crate::database::PoemStore;
use crate::global::GlobalState;
use crate::tests::global::{mock_global_state, token_for, MockGlobal};

type TestRouter = Router<Body, RouteError<ApiError>>;

struct Reply {
	status: StatusCode,
	headers: HeaderMap,
	body: Option<Value>,
}

fn router(global: &Arc<GlobalState>) -> TestRouter {
	routes::<GlobalState, Body>(global).expect("failed to build router")
}

fn request(method: Method, uri: &str, token: Option<&str>, body: impl Into<Bytes>) -> Request<Body> {
	let mut req = Request::builder()
		.method(method)
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json");

	if let Some(token) = token {
		req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
	}

	req.body(Full::new(body.into())).expect("failed to build request")
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
	request(method, uri, token, body.to_string())
}

async fn send(router: &TestRouter, req: Request<Body>) -> Reply {
	let resp = router
		.handle(req)
		.timeout(Duration::from_secs(5))
		.await
		.expect("request timed out")
		.expect("router did not produce a response");

	let status = resp.status();
	let headers = resp.headers().clone();
	let bytes = resp.into_body().collect().await.expect("failed to read body").to_bytes();
	let body = (!bytes.is_empty()).then(|| serde_json::from_slice(&bytes).expect("body is not json"));

	Reply { status, headers, body }
}

async fn create_poem(router: &TestRouter, token: &str) -> Value {
	let reply = send(
		router,
		json_request(
			Method::POST,
			"/poems",
			Some(token),
			json!({ "poem": { "title": "Ozymandias", "writer": "Percy Bysshe Shelley", "description": "A sonnet" } }),
		),
	)
	.await;

	assert_eq!(reply.status, StatusCode::CREATED);
	reply.body.expect("missing body")["poem"].clone()
}

#[tokio::test]
async fn test_create_and_read_poems() {
	let MockGlobal { global, store, .. } = mock_global_state(AppConfig::default());
	let router = router(&global);

	let owner = Ulid::new();
	let token = token_for(&global, owner);

	let reply = send(
		&router,
		json_request(
			Method::POST,
			"/poems",
			Some(&token),
			json!({ "poem": { "title": "The Raven", "writer": "Edgar Allan Poe", "owner": Ulid::new().to_string() } }),
		),
	)
	.await;

	assert_eq!(reply.status, StatusCode::CREATED);
	let poem = reply.body.expect("missing body")["poem"].clone();
	assert_eq!(poem["owner"], json!(owner.to_string()));
	assert_eq!(poem["title"], json!("The Raven"));
	assert_eq!(poem["description"], Value::Null);
	assert_eq!(store.len().await, 1);

	let id = poem["id"].as_str().expect("id is a string").to_string();

	let reply = send(&router, request(Method::GET, &format!("/poems/{id}"), None, "")).await;
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.body.expect("missing body")["poem"], poem);

	let reply = send(&router, request(Method::GET, "/v1/poems", None, "")).await;
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.body.expect("missing body"), json!({ "poems": [poem] }));
}

#[tokio::test]
async fn test_missing_and_invalid_ids() {
	let MockGlobal { global, .. } = mock_global_state(AppConfig::default());
	let router = router(&global);
	let token = token_for(&global, Ulid::new());

	let reply = send(&router, request(Method::GET, &format!("/poems/{}", Ulid::new()), None, "")).await;
	assert_eq!(reply.status, StatusCode::NOT_FOUND);
	assert_eq!(reply.body, Some(json!({ "message": "not found", "success": false })));

	let reply = send(&router, request(Method::GET, "/poems/not-a-ulid", None, "")).await;
	assert_eq!(reply.status, StatusCode::NOT_FOUND);

	let reply = send(&router, request(Method::DELETE, &format!("/poems/{}", Ulid::new()), Some(&token), "")).await;
	assert_eq!(reply.status, StatusCode::NOT_FOUND);

	let reply = send(
		&router,
		json_request(
			Method::PATCH,
			&format!("/poems/{}", Ulid::new()),
			Some(&token),
			json!({ "poem": { "title": "t" } }),
		),
	)
	.await;
	assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_writes_require_a_valid_token() {
	let MockGlobal { global, store, .. } = mock_global_state(AppConfig::default());
	let router = router(&global);

	let body = json!({ "poem": { "title": "t", "writer": "w" } });

	let reply = send(&router, json_request(Method::POST, "/poems", None, body.clone())).await;
	assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
	assert_eq!(reply.headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
	assert_eq!(reply.body, Some(json!({ "message": "not logged in", "success": false })));

	let reply = send(&router, json_request(Method::POST, "/poems", Some("garbage"), body.clone())).await;
	assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
	assert_eq!(reply.body, Some(json!({ "message": "invalid token", "success": false })));

	let mut req = json_request(Method::POST, "/poems", None, body);
	req.headers_mut().insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
	let reply = send(&router, req).await;
	assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
	assert_eq!(
		reply.body,
		Some(json!({ "message": "token must be a bearer token", "success": false }))
	);

	// Auth is checked before the id, so an unknown poem still reports 401.
	let reply = send(&router, request(Method::DELETE, &format!("/poems/{}", Ulid::new()), None, "")).await;
	assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

	assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_only_the_owner_can_modify() {
	let MockGlobal { global, store, .. } = mock_global_state(AppConfig::default());
	let router = router(&global);

	let owner = token_for(&global, Ulid::new());
	let other = token_for(&global, Ulid::new());

	let poem = create_poem(&router, &owner).await;
	let uri = format!("/poems/{}", poem["id"].as_str().unwrap());

	let reply = send(
		&router,
		json_request(Method::PATCH, &uri, Some(&other), json!({ "poem": { "title": "stolen" } })),
	)
	.await;
	assert_eq!(reply.status, StatusCode::FORBIDDEN);
	assert_eq!(reply.body, Some(json!({ "message": "forbidden", "success": false })));

	let reply = send(&router, request(Method::DELETE, &uri, Some(&other), "")).await;
	assert_eq!(reply.status, StatusCode::FORBIDDEN);

	let reply = send(&router, request(Method::GET, &uri, None, "")).await;
	assert_eq!(reply.body.expect("missing body")["poem"], poem);
	assert_eq!(store.len().await, 1);

	let reply = send(&router, request(Method::DELETE, &uri, Some(&owner), "")).await;
	assert_eq!(reply.status, StatusCode::NO_CONTENT);
	assert_eq!(reply.body, None);

	let reply = send(&router, request(Method::GET, &uri, None, "")).await;
	assert_eq!(reply.status, StatusCode::NOT_FOUND);
	assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_update_ignores_blank_fields() {
	let MockGlobal { global, store, .. } = mock_global_state(AppConfig::default());
	let router = router(&global);

	let owner_id = Ulid::new();
	let owner = token_for(&global, owner_id);
	let poem = create_poem(&router, &owner).await;
	let id: Ulid = poem["id"].as_str().unwrap().parse().unwrap();
	let uri = format!("/poems/{id}");

	let reply = send(
		&router,
		json_request(
			Method::PATCH,
			&uri,
			Some(&owner),
			json!({ "poem": { "title": "", "writer": "Shelley", "owner": Ulid::new().to_string() } }),
		),
	)
	.await;
	assert_eq!(reply.status, StatusCode::NO_CONTENT);

	let stored = store.find_by_id(id).await.unwrap().unwrap();
	assert_eq!(stored.title, "Ozymandias");
	assert_eq!(stored.writer, "Shelley");
	assert_eq!(stored.description.as_deref(), Some("A sonnet"));
	assert_eq!(stored.owner, owner_id);

	let reply = send(
		&router,
		json_request(Method::PATCH, &uri, Some(&owner), json!({ "poem": { "description": null } })),
	)
	.await;
	assert_eq!(reply.status, StatusCode::NO_CONTENT);
	assert_eq!(store.find_by_id(id).await.unwrap().unwrap().description, None);

	let reply = send(
		&router,
		json_request(Method::PATCH, &uri, Some(&owner), json!({ "poem": { "writer": null } })),
	)
	.await;
	assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(reply.body, Some(json!({ "message": "writer is required", "success": false })));
}

#[tokio::test]
async fn test_bad_bodies() {
	let mut config = AppConfig::default();
	config.extra.api.max_body_size = 64;

	let MockGlobal { global, store, .. } = mock_global_state(config);
	let router = router(&global);
	let token = token_for(&global, Ulid::new());

	let reply = send(&router, request(Method::POST, "/poems", Some(&token), "{not json")).await;
	assert_eq!(reply.status, StatusCode::BAD_REQUEST);

	let reply = send(&router, json_request(Method::POST, "/poems", Some(&token), json!({ "title": "t" }))).await;
	assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(reply.body, Some(json!({ "message": "poem is required", "success": false })));

	let reply = send(
		&router,
		json_request(Method::POST, "/poems", Some(&token), json!({ "poem": { "title": "t" } })),
	)
	.await;
	assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(reply.body, Some(json!({ "message": "writer is required", "success": false })));

	let reply = send(
		&router,
		json_request(
			Method::POST,
			"/poems",
			Some(&token),
			json!({ "poem": { "title": "t".repeat(128), "writer": "w" } }),
		),
	)
	.await;
	assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);

	assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_health_cors_and_fallback() {
	let MockGlobal { global, .. } = mock_global_state(AppConfig::default());
	let router = router(&global);

	let reply = send(&router, request(Method::GET, "/v1/health", None, "")).await;
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.body, Some(json!({ "status": "ok" })));

	let reply = send(&router, request(Method::GET, "/nothing/here", None, "")).await;
	assert_eq!(reply.status, StatusCode::NOT_FOUND);
	assert_eq!(reply.body, Some(json!({ "message": "not found", "success": false })));

	let mut req = request(Method::OPTIONS, "/poems", None, "");
	req.headers_mut().insert(header::ORIGIN, "https://poetry.example".parse().unwrap());
	req.headers_mut()
		.insert(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH".parse().unwrap());
	let reply = send(&router, req).await;
	assert_eq!(reply.status, StatusCode::NO_CONTENT);
	assert_eq!(reply.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "https://poetry.example");

	let mut req = request(Method::GET, "/poems", None, "");
	req.headers_mut().insert(header::ORIGIN, "https://poetry.example".parse().unwrap());
	let reply = send(&router, req).await;
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "https://poetry.example");
}

#[tokio::test]
async fn test_invalid_patch_reports_ownership_first() {
	let MockGlobal { global, .. } = mock_global_state(AppConfig::default());
	let router = router(&global);

	let owner = token_for(&global, Ulid::new());
	let other = token_for(&global, Ulid::new());

	let poem = create_poem(&router, &owner).await;
	let uri = format!("/poems/{}", poem["id"].as_str().expect("id is a string"));

	let reply = send(
		&router,
		json_request(Method::PATCH, &uri, Some(&other), json!({ "poem": { "title": null } })),
	)
	.await;
	assert_eq!(reply.status, StatusCode::FORBIDDEN);

	let reply = send(
		&router,
		json_request(
			Method::PATCH,
			&format!("/poems/{}", Ulid::new()),
			Some(&owner),
			json!({ "poem": { "writer": null } }),
		),
	)
	.await;
	assert_eq!(reply.status, StatusCode::NOT_FOUND);
}
