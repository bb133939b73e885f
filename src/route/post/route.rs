use axum::extract::State;
use macros::route;

use crate::{
	extract::{Created, Json, Path, Query, Session},
	openapi::tag,
};

use super::{model, PostService, RouteError};

/// Get all posts
/// Returns a page of ten posts, newest first.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(posts): State<PostService>,
	_session: Session,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	Ok(Json(posts.list(&paginate).await?))
}

/// Get single post
/// Returns a single post by its unique id.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(posts): State<PostService>,
	_session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(posts.get(path.id).await?))
}

/// Create post
/// Creates a new post authored by the authenticated user.
#[route(tag = tag::POST, response(status = 201, description = "Post created.", shape = "Json<model::Post>"))]
pub async fn create_post(
	State(posts): State<PostService>,
	session: Session,
	Json(input): Json<model::CreatePost>,
) -> Result<Created<model::Post>, RouteError> {
	Ok(Created(posts.create(session.user.id, input).await?))
}

/// Update post
/// Updates the title and body of a post. Only the author can update a post.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(posts): State<PostService>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdatePost>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(posts.edit(session.user.id, path.id, input).await?))
}

/// Replace comments
/// Replaces the comments of a post with the given list. Only the author can change comments.
#[route(tag = tag::POST)]
pub async fn replace_comments(
	State(posts): State<PostService>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::CommentsInput>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(
		posts
			.replace_comments(session.user.id, path.id, input)
			.await?,
	))
}

/// Delete post
/// Deletes a post by its unique id. Only the author can delete a post, and this cannot be undone.
#[route(tag = tag::POST)]
pub async fn delete_post(
	State(posts): State<PostService>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Deleted>, RouteError> {
	posts.delete(session.user.id, path.id).await?;

	Ok(Json(model::Deleted {
		message: "post deleted",
	}))
}
