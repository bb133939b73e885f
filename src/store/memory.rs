use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PostStore, StoreError, UserStore};
use crate::route::{
	auth::model::{User, UserId},
	post::model::Post,
};

/// An in-memory store, used when no database is configured and in tests.
///
/// Posts are kept in insertion order so that posts created within the same
/// clock tick still list newest first.
#[derive(Default)]
pub struct MemoryStore {
	users: RwLock<HashMap<UserId, User>>,
	posts: RwLock<Vec<Post>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[axum::async_trait]
impl UserStore for MemoryStore {
	async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
		Ok(self.users.read().await.get(&id).cloned())
	}

	async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
		Ok(self
			.users
			.read()
			.await
			.values()
			.find(|user| user.email == email)
			.cloned())
	}

	async fn insert(&self, user: &User) -> Result<(), StoreError> {
		let mut users = self.users.write().await;

		if users.values().any(|u| u.email == user.email) {
			return Err(StoreError::Conflict("email"));
		}

		users.insert(user.id, user.clone());
		Ok(())
	}
}

#[axum::async_trait]
impl PostStore for MemoryStore {
	async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Post>, StoreError> {
		let offset = usize::try_from(offset).unwrap_or(0);
		let limit = usize::try_from(limit).unwrap_or(0);

		let mut posts = self
			.posts
			.read()
			.await
			.iter()
			.rev()
			.cloned()
			.collect::<Vec<_>>();

		// stable, so equal timestamps keep the newest insertion first
		posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

		Ok(posts.into_iter().skip(offset).take(limit).collect())
	}

	async fn find(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
		Ok(self
			.posts
			.read()
			.await
			.iter()
			.find(|post| post.id == id)
			.cloned())
	}

	async fn insert(&self, post: &Post) -> Result<(), StoreError> {
		self.posts.write().await.push(post.clone());
		Ok(())
	}

	async fn update(&self, post: &Post) -> Result<bool, StoreError> {
		let mut posts = self.posts.write().await;

		let Some(stored) = posts
			.iter_mut()
			.find(|p| p.id == post.id && p.author == post.author)
		else {
			return Ok(false);
		};

		stored.title.clone_from(&post.title);
		stored.body.clone_from(&post.body);
		stored.comments.clone_from(&post.comments);
		stored.updated_at = post.updated_at;

		Ok(true)
	}

	async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
		let mut posts = self.posts.write().await;
		let before = posts.len();

		posts.retain(|post| post.id != id);

		Ok(posts.len() < before)
	}
}

#[cfg(test)]
mod test {
	use chrono::{Duration, Utc};

	use super::*;

	fn post(author: UserId, title: &str, age: i64) -> Post {
		let created_at = Utc::now() - Duration::minutes(age);

		Post {
			id: Uuid::new_v4(),
			author,
			title: title.into(),
			body: "body".into(),
			comments: Vec::new(),
			created_at,
			updated_at: created_at,
		}
	}

	#[tokio::test]
	async fn test_list_newest_first() {
		let store = MemoryStore::new();
		let author = UserId::new();

		for (title, age) in [("old", 10), ("newest", 0), ("middle", 5)] {
			PostStore::insert(&store, &post(author, title, age))
				.await
				.unwrap();
		}

		let titles = store
			.list(0, 10)
			.await
			.unwrap()
			.into_iter()
			.map(|post| post.title)
			.collect::<Vec<_>>();

		assert_eq!(titles, ["newest", "middle", "old"]);

		let page = store.list(1, 1).await.unwrap();

		assert_eq!(page.len(), 1);
		assert_eq!(page[0].title, "middle");
	}

	#[tokio::test]
	async fn test_duplicate_email() {
		let store = MemoryStore::new();
		let now = Utc::now();
		let user = User {
			id: UserId::new(),
			name: "john".into(),
			email: "john@smith.com".into(),
			password: Vec::new(),
			created_at: now,
			updated_at: now,
		};

		UserStore::insert(&store, &user).await.unwrap();

		let duplicate = User {
			id: UserId::new(),
			..user.clone()
		};

		assert!(matches!(
			UserStore::insert(&store, &duplicate).await,
			Err(StoreError::Conflict("email"))
		));
		assert_eq!(store.users.read().await.len(), 1);
	}

	#[tokio::test]
	async fn test_update_and_delete() {
		let store = MemoryStore::new();
		let author = UserId::new();
		let mut post = post(author, "first", 0);

		PostStore::insert(&store, &post).await.unwrap();

		post.title = "second".into();
		assert!(store.update(&post).await.unwrap());
		assert_eq!(store.find(post.id).await.unwrap().unwrap().title, "second");

		let mut foreign = post.clone();
		foreign.author = UserId::new();
		assert!(!store.update(&foreign).await.unwrap());

		assert!(store.delete(post.id).await.unwrap());
		assert!(!store.delete(post.id).await.unwrap());
		assert!(store.find(post.id).await.unwrap().is_none());
	}
}
