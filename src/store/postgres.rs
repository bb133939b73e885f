use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{PostStore, StoreError, UserStore};
use crate::route::{
	auth::model::{User, UserId},
	post::model::Post,
};

/// Name of the unique constraint on `user.email`.
const USER_EMAIL_KEY: &str = "user_email_key";

/// A Postgres-backed store for users and posts.
#[derive(Clone)]
pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	/// Connects to the database and applies pending migrations.
	pub async fn connect(url: &str) -> Result<Self, StoreError> {
		let pool = PgPoolOptions::new().connect(url).await?;

		sqlx::migrate!().run(&pool).await?;

		Ok(Self::new(pool))
	}
}

#[axum::async_trait]
impl UserStore for PgStore {
	async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
		let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE id = $1"#)
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(user)
	}

	async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
		let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE email = $1"#)
			.bind(email)
			.fetch_optional(&self.pool)
			.await?;

		Ok(user)
	}

	async fn insert(&self, user: &User) -> Result<(), StoreError> {
		sqlx::query(
			r#"
				INSERT INTO "user" (id, name, email, password, created_at, updated_at)
				VALUES ($1, $2, $3, $4, $5, $6)
			"#,
		)
		.bind(user.id)
		.bind(&user.name)
		.bind(&user.email)
		.bind(&user.password)
		.bind(user.created_at)
		.bind(user.updated_at)
		.execute(&self.pool)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref d) if d.constraint() == Some(USER_EMAIL_KEY) => {
				StoreError::Conflict("email")
			}
			e => StoreError::from(e),
		})?;

		Ok(())
	}
}

#[axum::async_trait]
impl PostStore for PgStore {
	async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Post>, StoreError> {
		let posts = sqlx::query_as::<_, Post>(
			r#"
				SELECT * FROM post
				ORDER BY created_at DESC, id DESC
				LIMIT $1 OFFSET $2
			"#,
		)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(posts)
	}

	async fn find(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
		let post = sqlx::query_as::<_, Post>("SELECT * FROM post WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(post)
	}

	async fn insert(&self, post: &Post) -> Result<(), StoreError> {
		sqlx::query(
			r#"
				INSERT INTO post (id, author, title, body, comments, created_at, updated_at)
				VALUES ($1, $2, $3, $4, $5, $6, $7)
			"#,
		)
		.bind(post.id)
		.bind(post.author)
		.bind(&post.title)
		.bind(&post.body)
		.bind(&post.comments)
		.bind(post.created_at)
		.bind(post.updated_at)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn update(&self, post: &Post) -> Result<bool, StoreError> {
		let status = sqlx::query(
			r#"
				UPDATE post
				SET title = $1, body = $2, comments = $3, updated_at = $4
				WHERE id = $5 AND author = $6
			"#,
		)
		.bind(&post.title)
		.bind(&post.body)
		.bind(&post.comments)
		.bind(post.updated_at)
		.bind(post.id)
		.bind(post.author)
		.execute(&self.pool)
		.await?;

		Ok(status.rows_affected() > 0)
	}

	async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
		let status = sqlx::query("DELETE FROM post WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(status.rows_affected() > 0)
	}
}
