//! Persistence for users and posts.
//!
//! Services only see the [`UserStore`] and [`PostStore`] traits, so the
//! backing store is chosen once at startup and injected.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use uuid::Uuid;

use crate::route::{
	auth::model::{User, UserId},
	post::model::Post,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// A unique constraint was violated.
	#[error("duplicate {0}")]
	Conflict(&'static str),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Holds user records. Email addresses are unique.
#[axum::async_trait]
pub trait UserStore: Send + Sync {
	async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

	async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

	/// Inserts a new user, failing with [`StoreError::Conflict`] if the
	/// email address is already in use.
	async fn insert(&self, user: &User) -> Result<(), StoreError>;
}

/// Holds post records.
#[axum::async_trait]
pub trait PostStore: Send + Sync {
	/// Lists posts newest first.
	async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Post>, StoreError>;

	async fn find(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

	async fn insert(&self, post: &Post) -> Result<(), StoreError>;

	/// Overwrites the mutable fields of a post owned by `post.author`.
	///
	/// Returns `false` if no such post exists.
	async fn update(&self, post: &Post) -> Result<bool, StoreError>;

	/// Returns `false` if no such post exists.
	async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub type Users = Arc<dyn UserStore>;
pub type Posts = Arc<dyn PostStore>;
