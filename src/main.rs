#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod openapi;
mod ratelimit;
mod route;
mod session;
mod store;
#[cfg(test)]
mod test;
mod trace;

use std::{net::SocketAddr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{
	config::Config,
	route::{auth::AuthService, post::PostService},
	session::Keys,
	store::{MemoryStore, PgStore, Posts, Users},
};

pub type AppState = State;

/// The shared application state.
///
/// Each service holds its own handle to the store it needs, so handlers
/// extract only the service they use.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub auth: AuthService,
	pub posts: PostService,
}

impl State {
	pub fn new(users: Users, posts: Posts, keys: Keys) -> Self {
		Self {
			auth: AuthService::new(users, keys),
			posts: PostService::new(posts),
		}
	}
}

/// Builds the application router, including the `OpenAPI` documentation.
pub fn router(state: AppState) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.route("/", get(|| async { "running" }))
		.nest("/auth", route::auth::routes())
		.nest("/posts", route::post::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.with_state(state)
}

async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for shutdown signal");
	}

	tracing::info!("shutting down");
}

#[tokio::main]
async fn main() {
	let config = match Config::from_env() {
		Ok(config) => config,
		Err(error) => {
			eprintln!("invalid configuration: {error}");
			std::process::exit(1);
		}
	};

	let _guard = match trace::init(config.otlp) {
		Ok(guard) => guard,
		Err(error) => {
			eprintln!("failed to initialize tracing: {error}");
			std::process::exit(1);
		}
	};

	let (users, posts): (Users, Posts) = match &config.database_url {
		Some(url) => {
			let store = match PgStore::connect(url).await {
				Ok(store) => Arc::new(store),
				Err(error) => {
					tracing::error!(%error, "failed to connect to database");
					std::process::exit(1);
				}
			};

			(store.clone() as Users, store as Posts)
		}
		None => {
			tracing::warn!("DATABASE_URL is not set, data will not outlive the process");

			let store = Arc::new(MemoryStore::new());

			(store.clone() as Users, store as Posts)
		}
	};

	let state = State::new(users, posts, Keys::new(config.jwt_secret.as_bytes()));

	let mut app = router(state).layer(
		ServiceBuilder::new()
			.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
			.layer(TraceLayer::new_for_http())
			.layer(PropagateRequestIdLayer::x_request_id())
			.layer(CorsLayer::permissive())
			.layer(CompressionLayer::new()),
	);

	if let Some(config) =
		ratelimit::per_peer(config.rate_limit_per_second, config.rate_limit_burst)
	{
		app = app.layer(tower_governor::GovernorLayer { config });
	}

	let listener = match tokio::net::TcpListener::bind((config.host, config.port)).await {
		Ok(listener) => listener,
		Err(error) => {
			tracing::error!(%error, port = config.port, "failed to bind");
			std::process::exit(1);
		}
	};

	tracing::info!("listening on {}:{}", config.host, config.port);

	if let Err(error) = axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await
	{
		tracing::error!(%error, "server error");
	}
}
