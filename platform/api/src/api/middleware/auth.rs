use std::sync::{Arc, Weak};

use hyper::header::{self, HeaderValue};
use hyper::StatusCode;
use utils::http::router::ext::RequestExt;
use utils::http::router::middleware::{Middleware, Next};
use utils::http::RouteError;

use crate::api::auth::{AuthError, Caller};
use crate::api::error::ApiError;
use crate::api::jwt::AuthJwtPayload;
use crate::api::request_context::RequestContext;
use crate::api::Body;
use crate::global::ApiGlobal;

/// Checks the `Authorization` header and records the outcome in the
/// request's [`RequestContext`]. It never fails the request on its own,
/// routes that need a caller ask the context for one.
pub struct AuthMiddleware<G> {
	global: Weak<G>,
}

pub fn auth_middleware<G: ApiGlobal>(global: &Arc<G>) -> AuthMiddleware<G> {
	AuthMiddleware {
		global: Arc::downgrade(global),
	}
}

fn authenticate<G: ApiGlobal>(global: &Arc<G>, header: &HeaderValue) -> Result<Caller, AuthError> {
	let token = header
		.to_str()
		.map_err(|_| AuthError::HeaderToStr)?
		// Tokens will start with "Bearer " so we need to remove that
		.strip_prefix("Bearer ")
		.ok_or(AuthError::NotBearerToken)?;

	let jwt = AuthJwtPayload::verify(global, token).ok_or(AuthError::InvalidToken)?;

	Ok(Caller::new(jwt.user_id))
}

#[async_trait::async_trait]
impl<G: ApiGlobal, I: Send + 'static> Middleware<I, RouteError<ApiError>> for AuthMiddleware<G> {
	async fn handle(
		&self,
		mut req: hyper::Request<I>,
		next: Next<I, RouteError<ApiError>>,
	) -> Result<hyper::Response<Body>, RouteError<ApiError>> {
		let outcome = match req.headers().get(header::AUTHORIZATION) {
			Some(header) => {
				let Some(global) = self.global.upgrade() else {
					return Err((StatusCode::INTERNAL_SERVER_ERROR, "global state unavailable").into());
				};

				Some(authenticate(&global, header))
			}
			None => None,
		};

		let context = RequestContext::default();

		match outcome {
			Some(Ok(caller)) => {
				tracing::debug!(user_id = %caller.user_id, "authenticated request");
				context.set_auth(caller).await;
			}
			Some(Err(err)) => {
				tracing::debug!(error = %err, "rejected credentials");
				context.set_auth_error(err).await;
			}
			None => {}
		}

		req.provide(context);

		next.run(req).await
	}
}
