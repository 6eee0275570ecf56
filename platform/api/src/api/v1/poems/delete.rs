use hyper::{Request, Response};
use ulid::Ulid;
use utils::http::router::ext::RequestExt;

use super::guard::{handle_not_found, require_ownership};
use super::{challenge, no_content, poem_id, require_caller};
use crate::api::auth::Caller;
use crate::api::error::{ApiError, Result};
use crate::api::request_context::RequestContext;
use crate::api::{request_global, Body, RequestBody};
use crate::database::PoemStore;
use crate::global::ApiGlobal;

/// Permanently removes a poem the caller owns.
pub async fn delete(store: &dyn PoemStore, caller: &Caller, id: Ulid) -> Result<(), ApiError> {
	let poem = handle_not_found(store.find_by_id(id).await?)?;
	require_ownership(caller, &poem)?;

	if !store.delete(id).await? {
		return Err(ApiError::NotFound);
	}

	tracing::info!(poem_id = %id, caller = %caller.user_id, "poem deleted");

	Ok(())
}

pub async fn handler<G: ApiGlobal, I: RequestBody>(req: Request<I>) -> Result<Response<Body>> {
	let global = request_global::<G, I>(&req)?;

	let context = req.data::<RequestContext>().cloned();
	let caller = require_caller(context).await;
	let caller = challenge(&req, caller)?;

	let id = poem_id(&req)?;

	delete(global.poem_store(), &caller, id).await?;

	Ok(no_content())
}
