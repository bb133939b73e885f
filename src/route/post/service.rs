use chrono::Utc;
use uuid::Uuid;

use crate::{route::auth::model::UserId, store::Posts};

use super::{
	model::{self, Paginate, Post},
	Error,
};

const MIN_TITLE_LENGTH: usize = 3;

/// Trims a title, checking it is still long enough afterwards.
fn clean_title(title: &str) -> Result<String, Error> {
	let title = title.trim();

	if title.chars().count() < MIN_TITLE_LENGTH {
		return Err(Error::Invalid {
			field: "title",
			reason: "title must be at least 3 characters long",
		});
	}

	Ok(title.to_owned())
}

fn clean_body(body: &str) -> Result<String, Error> {
	let body = body.trim();

	if body.is_empty() {
		return Err(Error::Invalid {
			field: "body",
			reason: "body must not be empty",
		});
	}

	Ok(body.to_owned())
}

/// Lists, reads and mutates posts. Only the author of a post may change it.
#[derive(Clone)]
pub struct PostService {
	posts: Posts,
}

impl PostService {
	pub fn new(posts: Posts) -> Self {
		Self { posts }
	}

	/// Returns a page of posts, newest first.
	pub async fn list(&self, paginate: &Paginate) -> Result<Vec<Post>, Error> {
		Ok(self
			.posts
			.list(paginate.offset(), paginate.limit())
			.await?)
	}

	pub async fn get(&self, id: Uuid) -> Result<Post, Error> {
		self.posts.find(id).await?.ok_or(Error::UnknownPost(id))
	}

	pub async fn create(&self, author: UserId, input: model::CreatePost) -> Result<Post, Error> {
		let now = Utc::now();
		let post = Post {
			id: Uuid::new_v4(),
			author,
			title: clean_title(&input.title)?,
			body: clean_body(&input.body)?,
			comments: Vec::new(),
			created_at: now,
			updated_at: now,
		};

		self.posts.insert(&post).await?;

		tracing::info!(post = %post.id, %author, "created post");

		Ok(post)
	}

	/// Fetches a post that `caller` is allowed to modify.
	async fn owned(&self, caller: UserId, id: Uuid) -> Result<Post, Error> {
		let post = self.get(id).await?;

		if post.author != caller {
			tracing::info!(post = %id, %caller, "rejected change by non-author");
			return Err(Error::NotAuthor(id));
		}

		Ok(post)
	}

	async fn save(&self, mut post: Post) -> Result<Post, Error> {
		post.updated_at = Utc::now();

		if !self.posts.update(&post).await? {
			return Err(Error::UnknownPost(post.id));
		}

		Ok(post)
	}

	/// Overwrites the title and body of a post. Omitted fields are kept.
	pub async fn edit(
		&self,
		caller: UserId,
		id: Uuid,
		input: model::UpdatePost,
	) -> Result<Post, Error> {
		// validate before touching the store
		let title = input.title.as_deref().map(clean_title).transpose()?;
		let body = input.body.as_deref().map(clean_body).transpose()?;

		let mut post = self.owned(caller, id).await?;

		if let Some(title) = title {
			post.title = title;
		}

		if let Some(body) = body {
			post.body = body;
		}

		self.save(post).await
	}

	/// Replaces the whole comment list of a post.
	pub async fn replace_comments(
		&self,
		caller: UserId,
		id: Uuid,
		input: model::CommentsInput,
	) -> Result<Post, Error> {
		let mut post = self.owned(caller, id).await?;

		post.comments = input
			.comments
			.iter()
			.map(|comment| comment.trim().to_owned())
			.collect();

		self.save(post).await
	}

	pub async fn delete(&self, caller: UserId, id: Uuid) -> Result<(), Error> {
		self.owned(caller, id).await?;

		if !self.posts.delete(id).await? {
			return Err(Error::UnknownPost(id));
		}

		tracing::info!(post = %id, %caller, "deleted post");

		Ok(())
	}
}
