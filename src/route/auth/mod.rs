use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, store::StoreError, AppState};

pub mod model;
pub mod route;
pub mod service;

pub use service::AuthService;

/// An error that can occur during authentication.
///
/// Messages of client errors are presented to the client, so they should not
/// contain sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidEmailOrPassword,
	#[error("email already taken")]
	EmailTaken,
	#[error("missing bearer token")]
	MissingToken,
	#[error("invalid or expired token")]
	InvalidToken,
	#[error("user not found")]
	UnknownUser,
	#[error("password hashing error: {0}")]
	Argon(#[from] argon2::Error),
	#[error("token signing error: {0}")]
	Token(#[from] jsonwebtoken::errors::Error),
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
		.api_route("/register", post_with(register, register_docs))
		.api_route("/login", post_with(login, login_docs))
		.api_route("/profile", get_with(get_profile, get_profile_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidEmailOrPassword | Self::MissingToken | Self::InvalidToken => {
				StatusCode::UNAUTHORIZED
			}
			Self::EmailTaken => StatusCode::BAD_REQUEST,
			Self::UnknownUser => StatusCode::NOT_FOUND,
			Self::Argon(..) | Self::Token(..) | Self::Store(..) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::EmailTaken => message.field("email").into_vec(),
			_ => message.into_vec(),
		}
	}
}
