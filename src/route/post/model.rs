pub use crate::route::model::{IdInput, Paginate};

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::route::auth::model::UserId;

fn validate_comments(comments: &[String]) -> Result<(), ValidationError> {
	if comments.iter().any(|comment| comment.trim().is_empty()) {
		return Err(ValidationError::new("blank_comment"));
	}

	Ok(())
}

/// A single post, created by a user.
#[model]
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The user that created the post. This never changes.
	#[serde(skip_deserializing)]
	pub author: UserId,
	/// The title of the post.
	#[validate(length(min = 3, max = 256))]
	pub title: String,
	/// The content of the post.
	#[validate(length(min = 1, max = 65536))]
	pub body: String,
	/// Comments on the post, oldest first.
	#[serde(skip_deserializing)]
	pub comments: Vec<String>,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The last time the post was modified.
	#[serde(skip_deserializing)]
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The full list of comments to store on a post.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct CommentsInput {
	#[validate(length(max = 500), custom(function = "validate_comments"))]
	pub comments: Vec<String>,
}

/// Confirms that a post was deleted.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Deleted {
	pub message: &'static str,
}
