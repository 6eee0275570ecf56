use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};
use ulid::Ulid;
use utils::prelude::FutureTimeout;

use crate::api;
use crate::config::AppConfig;
use crate::tests::global::{mock_global_state, token_for, MockGlobal};

#[tokio::test]
async fn test_serve_poems_over_http() {
	let port = portpicker::pick_unused_port().expect("failed to pick port");

	let mut config = AppConfig::default();
	config.extra.api.bind_address = SocketAddr::from(([127, 0, 0, 1], port));

	let MockGlobal { global, store, handler } = mock_global_state(config);

	let owner = token_for(&global, Ulid::new());
	let other = token_for(&global, Ulid::new());

	let server = tokio::spawn(api::run(global.clone()));

	// Wait for the server to start
	tokio::time::sleep(Duration::from_millis(300)).await;

	let client = reqwest::Client::new();
	let base = format!("http://127.0.0.1:{port}");

	let resp = client
		.post(format!("{base}/poems"))
		.bearer_auth(&owner)
		.json(&json!({ "poem": { "title": "Ozymandias", "writer": "Percy Bysshe Shelley" } }))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

	let poem: Value = resp.json().await.unwrap();
	let id = poem["poem"]["id"].as_str().unwrap().to_string();

	let resp = client
		.patch(format!("{base}/poems/{id}"))
		.bearer_auth(&other)
		.json(&json!({ "poem": { "title": "stolen" } }))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);

	let resp = client.get(format!("{base}/v1/poems/{id}")).send().await.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::OK);
	let fetched: Value = resp.json().await.unwrap();
	assert_eq!(fetched["poem"]["title"], json!("Ozymandias"));

	let resp = client
		.delete(format!("{base}/poems/{}", Ulid::new()))
		.bearer_auth(&owner)
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

	let resp = client.delete(format!("{base}/poems/{id}")).send().await.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
	assert_eq!(resp.headers().get("www-authenticate").unwrap(), "Bearer");

	assert_eq!(store.len().await, 1);

	drop(global);
	drop(client);

	handler
		.cancel()
		.timeout(Duration::from_secs(5))
		.await
		.expect("failed to cancel context");

	server
		.timeout(Duration::from_secs(5))
		.await
		.expect("api server did not stop")
		.expect("api server panicked")
		.expect("api server failed");
}
