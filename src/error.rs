use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection::{JsonRejection, PathRejection, QueryRejection},
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A human-readable description of the error.
	pub content: Cow<'a, str>,
	/// The input field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional machine-readable context.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// Describes how a component error is presented over HTTP.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	/// The messages sent to the client. Only called for non-5xx statuses,
	/// internal errors are replaced with a generic message.
	fn errors(&self) -> Vec<Message<'_>> {
		Message::new(self.to_string()).into_vec()
	}
}

/// Error type returned by route handlers.
///
/// The [`std::fmt::Display`] output is only logged, never sent to the client,
/// so it can contain sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<T> {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] PathRejection),
	#[error(transparent)]
	Route(T),
}

impl<T: ErrorShape> RouteError<T> {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Query(..) | Self::Path(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::Route(error) => error.status(),
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| {
						let content = error
							.message
							.as_ref()
							.map_or_else(|| error.code.to_string(), ToString::to_string);

						Message::new(content).field(field.to_string())
					})
				})
				.collect(),
			Self::Json(error) => Message::new(error.body_text()).into_vec(),
			Self::Query(error) => Message::new(error.body_text()).into_vec(),
			Self::Path(error) => Message::new(error.body_text()).into_vec(),
			Self::Route(error) => error.errors(),
		}
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		let errors = if status.is_server_error() {
			tracing::error!(error = %self, "request failed");

			Message::new("internal server error").into_vec()
		} else {
			self.errors()
		};

		(
			status,
			axum::Json(ErrorResponse {
				success: false,
				errors,
			}),
		)
			.into_response()
	}
}

/// Used as the rejection of extractors that have no component error.
impl ErrorShape for std::convert::Infallible {
	fn status(&self) -> StatusCode {
		match *self {}
	}
}

impl<T> OperationOutput for RouteError<T> {
	type Inner = Self;
}

/// Errors raised outside of a route handler, such as by middleware.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("too many requests")]
	TooManyRequests,
	#[error("rate limiter error: {0:?}")]
	RateLimit(tower_governor::GovernorError),
}

impl From<tower_governor::GovernorError> for Error {
	fn from(error: tower_governor::GovernorError) -> Self {
		match error {
			tower_governor::GovernorError::TooManyRequests { .. } => Self::TooManyRequests,
			error => Self::RateLimit(error),
		}
	}
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
			Self::RateLimit(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		RouteError::Route(self).into_response()
	}
}
