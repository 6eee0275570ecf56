use std::sync::Arc;

use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, StatusCode};
use serde_json::Value;
use ulid::Ulid;
use utils::http::router::builder::RouterBuilder;
use utils::http::router::ext::RequestExt;
use utils::http::router::middleware::ResponseHeadersRequestExt;
use utils::http::router::Router;
use utils::http::RouteError;

use crate::api::auth::{AuthError, Caller};
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::api::{Body, RequestBody};
use crate::global::ApiGlobal;

pub mod create;
pub mod delete;
pub mod get;
pub mod guard;
pub mod list;
pub mod sanitize;
pub mod update;

pub use create::create;
pub use delete::delete;
pub use get::get;
pub use list::list;
pub use update::update;

pub fn routes<G: ApiGlobal, I: RequestBody>(_: &Arc<G>) -> RouterBuilder<I, RouteError<ApiError>> {
	Router::builder()
		.get("/", list::handler::<G, I>)
		.post("/", create::handler::<G, I>)
		.get("/:id", get::handler::<G, I>)
		.patch("/:id", update::handler::<G, I>)
		.delete("/:id", delete::handler::<G, I>)
}

/// The poem id from the path. Anything that is not a ULID cannot name a
/// poem, so it is reported the same way as an unknown id.
fn poem_id<I>(req: &Request<I>) -> Result<Ulid, ApiError> {
	req.param("id")
		.and_then(|id| Ulid::from_string(id).ok())
		.ok_or(ApiError::NotFound)
}

/// Resolves the caller from the request context, a request that never passed
/// the auth middleware has no caller.
async fn require_caller(context: Option<RequestContext>) -> Result<Caller, AuthError> {
	match context {
		Some(context) => context.caller().await,
		None => Err(AuthError::NotLoggedIn),
	}
}

/// Unauthorized responses tell the client which scheme to use.
fn challenge<I, T>(req: &Request<I>, caller: Result<T, AuthError>) -> Result<T, ApiError> {
	if caller.is_err() {
		req.set_response_header(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
	}

	Ok(caller?)
}

async fn read_json(body: impl RequestBody, limit: usize) -> Result<Value, ApiError> {
	let bytes = body.read_limited(limit).await?;

	serde_json::from_slice(&bytes).map_err(|err| ApiError::BadRequest(format!("invalid json body: {err}")))
}

fn no_content() -> Response<Body> {
	let mut resp = Response::new(Body::default());
	*resp.status_mut() = StatusCode::NO_CONTENT;
	resp
}
