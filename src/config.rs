use std::{env, net::IpAddr, str::FromStr};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} is invalid: {value:?}")]
	Invalid { name: &'static str, value: String },
}

/// Service configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
	/// Secret used to sign session tokens.
	pub jwt_secret: String,
	/// Postgres connection string. The in-memory store is used if unset.
	pub database_url: Option<String>,
	pub host: IpAddr,
	pub port: u16,
	/// Sustained requests per second allowed from a single peer.
	pub rate_limit_per_second: u64,
	/// Requests a single peer can burst above the sustained rate.
	pub rate_limit_burst: u32,
	/// Whether traces and metrics are exported over OTLP.
	pub otlp: bool,
}

impl Config {
	/// Reads the configuration from the environment, after loading a
	/// `.env` file if one exists.
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Ok(Self {
			jwt_secret: required("JWT_SECRET")?,
			database_url: optional("DATABASE_URL"),
			host: parse_or("HOST", IpAddr::from([127, 0, 0, 1]))?,
			port: parse_or("PORT", 5100)?,
			rate_limit_per_second: parse_or("RATE_LIMIT_PER_SECOND", 10)?,
			rate_limit_burst: parse_or("RATE_LIMIT_BURST", 50)?,
			otlp: optional("OTEL_EXPORTER_OTLP_ENDPOINT").is_some(),
		})
	}
}

fn optional(name: &'static str) -> Option<String> {
	env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, Error> {
	optional(name).ok_or(Error::Missing(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, Error> {
	match optional(name) {
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| Error::Invalid { name, value }),
		None => Ok(default),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_parse_or() {
		// not set in any test environment
		assert_eq!(parse_or("BLOG_API_TEST_UNSET_PORT", 5100u16).unwrap(), 5100);
		assert!(matches!(
			required("BLOG_API_TEST_UNSET_SECRET"),
			Err(Error::Missing("BLOG_API_TEST_UNSET_SECRET"))
		));
	}
}
