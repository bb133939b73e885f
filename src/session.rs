use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::route::auth::model::UserId;

/// How many days a session token stays valid after it is issued.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// The claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
	/// The user the token was issued to.
	pub sub: UserId,
	/// Issue time, in seconds since the epoch.
	pub iat: i64,
	/// Expiry time, in seconds since the epoch.
	pub exp: i64,
}

/// Signing and verification keys for session tokens.
///
/// Tokens are not stored anywhere. A token is valid if its signature
/// verifies and its expiry has not passed.
pub struct Keys {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
}

impl Keys {
	pub fn new(secret: &[u8]) -> Self {
		let mut validation = Validation::default();

		// expiry is checked against the caller's clock in `verify_at`
		validation.validate_exp = false;
		validation.set_required_spec_claims(&["exp", "sub"]);

		Self {
			encoding: EncodingKey::from_secret(secret),
			decoding: DecodingKey::from_secret(secret),
			validation,
		}
	}

	/// Issues a token for `user` that expires [`TOKEN_TTL_DAYS`] from now.
	pub fn issue(&self, user: UserId) -> Result<String, jsonwebtoken::errors::Error> {
		self.issue_at(user, Utc::now())
	}

	pub fn issue_at(
		&self,
		user: UserId,
		now: DateTime<Utc>,
	) -> Result<String, jsonwebtoken::errors::Error> {
		let claims = Claims {
			sub: user,
			iat: now.timestamp(),
			exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
		};

		jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
	}

	/// Returns the user a token was issued to, or [`None`] if the token
	/// is malformed, has a bad signature or has expired.
	pub fn verify(&self, token: &str) -> Option<UserId> {
		self.verify_at(token, Utc::now())
	}

	pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<UserId> {
		let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
			.map_err(|error| tracing::debug!(%error, "rejected session token"))
			.ok()?
			.claims;

		if now.timestamp() >= claims.exp {
			tracing::debug!(user = %claims.sub, "session token expired");
			return None;
		}

		Some(claims.sub)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn keys() -> Keys {
		Keys::new(b"test secret")
	}

	#[test]
	fn test_token_valid_within_ttl() {
		let keys = keys();
		let user = UserId::new();
		let issued = Utc::now();

		let token = keys.issue_at(user, issued).unwrap();

		assert_eq!(keys.verify_at(&token, issued), Some(user));
		assert_eq!(
			keys.verify_at(&token, issued + Duration::days(29)),
			Some(user)
		);
	}

	#[test]
	fn test_token_expires_after_ttl() {
		let keys = keys();
		let user = UserId::new();
		let issued = Utc::now();

		let token = keys.issue_at(user, issued).unwrap();

		assert_eq!(keys.verify_at(&token, issued + Duration::days(31)), None);
	}

	#[test]
	fn test_token_signed_with_other_secret() {
		let token = Keys::new(b"another secret")
			.issue(UserId::new())
			.unwrap();

		assert_eq!(keys().verify(&token), None);
	}

	#[test]
	fn test_malformed_token() {
		assert_eq!(keys().verify("not a token"), None);
		assert_eq!(keys().verify(""), None);
	}
}
