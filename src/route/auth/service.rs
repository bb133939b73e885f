use std::sync::Arc;

use argon2::Argon2;
use chrono::Utc;
use uuid::Uuid;

use crate::{
	session::Keys,
	store::{StoreError, Users},
};

use super::{
	model::{self, normalize_email, Authenticated, User, UserId},
	Error,
};

pub const KEY_LENGTH: usize = 32;

/// Salt hashed against when a login names an unknown email.
const UNKNOWN_USER_SALT: UserId = UserId(Uuid::nil());

/// Registers users, checks credentials and issues session tokens.
#[derive(Clone)]
pub struct AuthService {
	users: Users,
	hasher: Argon2<'static>,
	keys: Arc<Keys>,
}

impl AuthService {
	pub fn new(users: Users, keys: Keys) -> Self {
		Self {
			users,
			hasher: Argon2::default(),
			keys: Arc::new(keys),
		}
	}

	/// Hashes a password with Argon2, using the user's id as a salt.
	fn hash_password(&self, password: &str, id: UserId) -> Result<[u8; KEY_LENGTH], Error> {
		let mut hash = [0; KEY_LENGTH];

		self.hasher
			.hash_password_into(password.as_bytes(), id.0.as_bytes(), &mut hash)?;
		Ok(hash)
	}

	/// Creates a new user and issues a session token for it.
	pub async fn register(&self, input: model::RegisterInput) -> Result<Authenticated, Error> {
		let email = normalize_email(&input.email);

		if self.users.find_by_email(&email).await?.is_some() {
			tracing::info!("registration rejected, email already taken");
			return Err(Error::EmailTaken);
		}

		let id = UserId::new();
		let now = Utc::now();
		let user = User {
			id,
			name: input.name.trim().to_owned(),
			email,
			password: self.hash_password(&input.password, id)?.to_vec(),
			created_at: now,
			updated_at: now,
		};

		self.users.insert(&user).await.map_err(|e| match e {
			StoreError::Conflict(..) => Error::EmailTaken,
			e => Error::Store(e),
		})?;

		tracing::info!(user = %user.id, "registered user");

		let token = self.keys.issue(user.id)?;

		Ok(Authenticated::new(user, token))
	}

	/// Checks an email and password, issuing a session token if they match.
	///
	/// An unknown email and a wrong password fail with the same error.
	pub async fn login(&self, input: model::LoginInput) -> Result<Authenticated, Error> {
		let email = normalize_email(&input.email);

		let Some(user) = self.users.find_by_email(&email).await? else {
			// hash anyway so unknown emails take as long as wrong passwords
			self.hash_password(&input.password, UNKNOWN_USER_SALT)?;

			tracing::info!("login rejected, unknown email");
			return Err(Error::InvalidEmailOrPassword);
		};

		let hashed = self.hash_password(&input.password, user.id)?;

		if user.password != hashed {
			tracing::info!(user = %user.id, "login rejected, wrong password");
			return Err(Error::InvalidEmailOrPassword);
		}

		let token = self.keys.issue(user.id)?;

		Ok(Authenticated::new(user, token))
	}

	/// Resolves a session token to the user it was issued to.
	pub async fn verify(&self, token: &str) -> Result<User, Error> {
		let id = self.keys.verify(token).ok_or(Error::InvalidToken)?;

		// a valid token for a deleted user is still unauthenticated
		self.users
			.find_by_id(id)
			.await?
			.ok_or(Error::InvalidToken)
	}

	/// Returns the profile of a user.
	pub async fn profile(&self, id: UserId) -> Result<User, Error> {
		self.users.find_by_id(id).await?.ok_or(Error::UnknownUser)
	}
}

#[cfg(test)]
mod test {
	use std::time::Instant;

	use chrono::Duration;

	use super::*;
	use crate::store::MemoryStore;

	fn service() -> AuthService {
		AuthService::new(Arc::new(MemoryStore::new()), Keys::new(b"test secret"))
	}

	fn register_input(email: &str) -> model::RegisterInput {
		model::RegisterInput {
			name: "John".into(),
			email: email.into(),
			password: "hunter2hunter".into(),
		}
	}

	fn login_input(email: &str, password: &str) -> model::LoginInput {
		model::LoginInput {
			email: email.into(),
			password: password.into(),
		}
	}

	#[tokio::test]
	async fn test_register_twice() {
		let service = service();

		service
			.register(register_input("john@smith.com"))
			.await
			.unwrap();

		let result = service.register(register_input("JOHN@smith.com ")).await;

		assert!(matches!(result, Err(Error::EmailTaken)));
	}

	#[tokio::test]
	async fn test_login_errors_are_identical() {
		let service = service();

		service
			.register(register_input("john@smith.com"))
			.await
			.unwrap();

		let wrong_password = service
			.login(login_input("john@smith.com", "wrong password"))
			.await
			.unwrap_err();
		let unknown_email = service
			.login(login_input("jane@smith.com", "hunter2hunter"))
			.await
			.unwrap_err();

		assert!(matches!(wrong_password, Error::InvalidEmailOrPassword));
		assert!(matches!(unknown_email, Error::InvalidEmailOrPassword));
		assert_eq!(wrong_password.to_string(), unknown_email.to_string());
	}

	#[tokio::test]
	async fn test_unknown_email_still_hashes() {
		let service = service();

		service
			.register(register_input("john@smith.com"))
			.await
			.unwrap();

		let start = Instant::now();
		service
			.login(login_input("john@smith.com", "wrong password"))
			.await
			.unwrap_err();
		let wrong_password = start.elapsed();

		let start = Instant::now();
		service
			.login(login_input("jane@smith.com", "wrong password"))
			.await
			.unwrap_err();
		let unknown_email = start.elapsed();

		// both paths pay for one hash, so they are within the same order
		assert!(
			unknown_email * 4 >= wrong_password,
			"unknown email took {unknown_email:?}, wrong password took {wrong_password:?}"
		);
	}

	#[tokio::test]
	async fn test_login_and_verify() {
		let service = service();

		let registered = service
			.register(register_input("john@smith.com"))
			.await
			.unwrap();

		let logged_in = service
			.login(login_input("john@smith.com", "hunter2hunter"))
			.await
			.unwrap();

		assert_eq!(registered.id, logged_in.id);

		let user = service.verify(&logged_in.token).await.unwrap();

		assert_eq!(user.id, registered.id);
		assert_eq!(user.name, "John");
	}

	#[tokio::test]
	async fn test_verify_expired_token() {
		let service = service();

		let registered = service
			.register(register_input("john@smith.com"))
			.await
			.unwrap();

		let token = service
			.keys
			.issue_at(registered.id, Utc::now() - Duration::days(31))
			.unwrap();

		assert!(matches!(
			service.verify(&token).await,
			Err(Error::InvalidToken)
		));
	}

	#[tokio::test]
	async fn test_verify_unknown_user() {
		let service = service();
		let token = service.keys.issue(UserId::new()).unwrap();

		assert!(matches!(
			service.verify(&token).await,
			Err(Error::InvalidToken)
		));
		assert!(matches!(
			service.profile(UserId::new()).await,
			Err(Error::UnknownUser)
		));
	}
}
