use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The unique identifier of a user.
///
/// Post ownership is decided by comparing these directly.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	JsonSchema,
	sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for UserId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// A single user.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: UserId,
	/// The name displayed to other users.
	pub name: String,
	/// The email address used for logging in.
	pub email: String,
	/// The Argon2 hash of the password, salted with `id`.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The last time the user was modified.
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A user summary with a freshly issued session token.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Authenticated {
	/// The unique identifier of the user.
	pub id: UserId,
	/// The name displayed to other users.
	pub name: String,
	/// The email address used for logging in.
	pub email: String,
	/// A bearer token valid for 30 days.
	pub token: String,
}

impl Authenticated {
	pub fn new(user: User, token: String) -> Self {
		Self {
			id: user.id,
			name: user.name,
			email: user.email,
			token,
		}
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(length(min = 1, max = 320))]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	/// The name displayed to other users.
	#[validate(length(min = 1, max = 64))]
	pub name: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

/// Normalises an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}
