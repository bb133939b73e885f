use std::sync::Arc;

pub use axum::http::{header::AUTHORIZATION, HeaderValue};
pub use axum_test::TestServer;
pub use serde_json::{json, Value};

use crate::{session::Keys, store::MemoryStore, State};

/// A registered user and their session token.
pub struct TestUser {
	pub id: String,
	pub token: String,
}

/// Builds the full application on top of a fresh in-memory store.
pub fn app() -> TestServer {
	let store = Arc::new(MemoryStore::new());
	let state = State::new(store.clone(), store, Keys::new(b"test secret"));

	TestServer::new(crate::router(state)).unwrap()
}

pub fn bearer(token: &str) -> HeaderValue {
	HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

pub async fn register(app: &TestServer, email: &str) -> TestUser {
	let response = app
		.post("/auth/register")
		.json(&json!({
			"name": "Test User",
			"email": email,
			"password": "hunter2hunter",
		}))
		.await;

	assert_eq!(response.status_code(), 201);

	let body = response.json::<Value>();

	TestUser {
		id: body["id"].as_str().unwrap().to_owned(),
		token: body["token"].as_str().unwrap().to_owned(),
	}
}

/// Creates a post as `user`, returning its id.
pub async fn create_post(app: &TestServer, user: &TestUser, title: &str) -> String {
	let response = app
		.post("/posts")
		.add_header(AUTHORIZATION, bearer(&user.token))
		.json(&json!({ "title": title, "body": "Some content" }))
		.await;

	assert_eq!(response.status_code(), 201);

	response.json::<Value>()["id"].as_str().unwrap().to_owned()
}
