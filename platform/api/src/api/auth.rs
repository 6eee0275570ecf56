use ulid::Ulid;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("token must be ascii only")]
	HeaderToStr,
	#[error("token must be a bearer token")]
	NotBearerToken,
	#[error("not logged in")]
	NotLoggedIn,
	#[error("invalid token")]
	InvalidToken,
}

/// The verified identity behind a request's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
	pub user_id: Ulid,
}

impl Caller {
	pub fn new(user_id: Ulid) -> Self {
		Self { user_id }
	}
}
