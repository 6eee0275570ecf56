use std::sync::Arc;

use tokio::sync::RwLock;

use super::auth::{AuthError, Caller};

#[derive(Debug, Default, Clone)]
enum AuthState {
	/// No `Authorization` header was sent.
	#[default]
	Anonymous,
	Authenticated(Caller),
	Failed(AuthError),
}

/// Per request state shared between middlewares and handlers.
#[derive(Default, Clone)]
pub struct RequestContext(Arc<RwLock<AuthState>>);

impl RequestContext {
	pub async fn set_auth(&self, caller: Caller) {
		*self.0.write().await = AuthState::Authenticated(caller);
	}

	pub async fn set_auth_error(&self, err: AuthError) {
		*self.0.write().await = AuthState::Failed(err);
	}

	/// The caller if the request carried valid credentials, `None` if it
	/// carried none at all.
	pub async fn auth(&self) -> Result<Option<Caller>, AuthError> {
		match &*self.0.read().await {
			AuthState::Anonymous => Ok(None),
			AuthState::Authenticated(caller) => Ok(Some(*caller)),
			AuthState::Failed(err) => Err(err.clone()),
		}
	}

	/// Like [`RequestContext::auth`] but a missing login is an error too.
	pub async fn caller(&self) -> Result<Caller, AuthError> {
		self.auth().await?.ok_or(AuthError::NotLoggedIn)
	}
}
