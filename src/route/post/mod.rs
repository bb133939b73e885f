use aide::axum::{
	routing::{get_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, store::StoreError, AppState};

pub mod model;
pub mod route;
pub mod service;

pub use service::PostService;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error("only the author can modify post {0}")]
	NotAuthor(Uuid),
	#[error("{reason}")]
	Invalid {
		field: &'static str,
		reason: &'static str,
	},
	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.api_route(
			"/:id/comments",
			put_with(replace_comments, replace_comments_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::NotAuthor(..) => StatusCode::FORBIDDEN,
			Self::Invalid { .. } => StatusCode::BAD_REQUEST,
			Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UnknownPost(post) | Self::NotAuthor(post) => {
				message.detail("post", post.to_string()).into_vec()
			}
			Self::Invalid { field, .. } => message.field(*field).into_vec(),
			Self::Store(..) => message.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_posts_require_token() {
		let app = app();

		assert_eq!(app.get("/posts").await.status_code(), 401);
		assert_eq!(
			app.post("/posts")
				.json(&json!({ "title": "Hello", "body": "World" }))
				.await
				.status_code(),
			401
		);
	}

	#[tokio::test]
	async fn test_create_then_get() {
		let app = app();
		let john = register(&app, "john@smith.com").await;

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "title": "Hello world", "body": "My first post" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let created = response.json::<Value>();
		let id = created["id"].as_str().unwrap();

		let response = app
			.get(&format!("/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 200);

		let post = response.json::<Value>();

		assert_eq!(post["title"], "Hello world");
		assert_eq!(post["body"], "My first post");
		assert_eq!(post["author"], json!(john.id));
		assert_eq!(post["comments"], json!([]));
		assert_eq!(post["created_at"], created["created_at"]);
	}

	#[tokio::test]
	async fn test_create_validation() {
		let app = app();
		let john = register(&app, "john@smith.com").await;

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "title": "Hi", "body": "" }))
			.await;

		assert_eq!(response.status_code(), 400);

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "title": "Hello world" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[tokio::test]
	async fn test_unknown_post() {
		let app = app();
		let john = register(&app, "john@smith.com").await;

		let response = app
			.get("/posts/00000000-0000-0000-0000-000000000000")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.delete("/posts/00000000-0000-0000-0000-000000000000")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.put("/posts/00000000-0000-0000-0000-000000000000")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "title": "Hello world", "body": "Edited" }))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.put("/posts/00000000-0000-0000-0000-000000000000/comments")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "comments": ["first"] }))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.get("/posts/not-a-uuid")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[tokio::test]
	async fn test_pagination() {
		let app = app();
		let john = register(&app, "john@smith.com").await;

		for i in 0..15 {
			create_post(&app, &john, &format!("Post number {i}")).await;
		}

		let first = app
			.get("/posts")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await
			.json::<Vec<Value>>();

		let second = app
			.get("/posts?page=2")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await
			.json::<Vec<Value>>();

		assert_eq!(first.len(), 10);
		assert_eq!(second.len(), 5);
		assert_eq!(first[0]["title"], "Post number 14");
		assert_eq!(second[4]["title"], "Post number 0");

		let response = app
			.get("/posts?page=0")
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[tokio::test]
	async fn test_ownership() {
		let app = app();
		let john = register(&app, "john@smith.com").await;
		let post = create_post(&app, &john, "Hello world").await;
		let jane = register(&app, "jane@smith.com").await;

		let response = app
			.put(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.json(&json!({ "title": "Hijacked", "body": "Mine now" }))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.delete(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.put(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "title": "Edited title", "body": "Edited body" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.get(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&jane.token))
			.await;

		assert_eq!(response.json::<Value>()["title"], "Edited title");
	}

	#[tokio::test]
	async fn test_comments() {
		let app = app();
		let john = register(&app, "john@smith.com").await;
		let post = create_post(&app, &john, "Hello world").await;

		let response = app
			.put(&format!("/posts/{post}/comments"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "comments": ["first!", "second"] }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(
			response.json::<Value>()["comments"],
			json!(["first!", "second"])
		);

		let response = app
			.put(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.json(&json!({ "title": "Edited title", "body": "Edited body" }))
			.await;

		assert_eq!(
			response.json::<Value>()["comments"],
			json!(["first!", "second"])
		);
	}

	#[tokio::test]
	async fn test_delete() {
		let app = app();
		let john = register(&app, "john@smith.com").await;
		let post = create_post(&app, &john, "Hello world").await;

		let response = app
			.delete(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["message"], "post deleted");

		let response = app
			.get(&format!("/posts/{post}"))
			.add_header(AUTHORIZATION, bearer(&john.token))
			.await;

		assert_eq!(response.status_code(), 404);
	}
}
