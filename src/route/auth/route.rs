use axum::extract::State;
use macros::route;

use crate::{
	extract::{Created, Json, Session},
	openapi::tag,
};

use super::{model, AuthService, RouteError};

/// Register account
/// Registers a new account, returning the user and a session token.
#[route(tag = tag::AUTH, response(status = 201, description = "Registered successfully.", shape = "Json<model::Authenticated>"))]
pub async fn register(
	State(auth): State<AuthService>,
	Json(input): Json<model::RegisterInput>,
) -> Result<Created<model::Authenticated>, RouteError> {
	Ok(Created(auth.register(input).await?))
}

/// Log in
/// Logs in to an account, returning the user and a session token.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::Authenticated>"))]
pub async fn login(
	State(auth): State<AuthService>,
	Json(input): Json<model::LoginInput>,
) -> Result<Json<model::Authenticated>, RouteError> {
	Ok(Json(auth.login(input).await?))
}

/// Get profile
/// Returns the profile of the authenticated user.
#[route(tag = tag::AUTH)]
pub async fn get_profile(
	State(auth): State<AuthService>,
	session: Session,
) -> Result<Json<model::User>, RouteError> {
	Ok(Json(auth.profile(session.user.id).await?))
}
