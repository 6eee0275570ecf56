use hyper::{Request, Response};
use ulid::Ulid;
use utils::http::router::ext::RequestExt;

use super::guard::{handle_not_found, require_ownership};
use super::sanitize::remove_blank_fields;
use super::{challenge, no_content, poem_id, read_json, require_caller};
use crate::api::auth::Caller;
use crate::api::error::{ApiError, Result};
use crate::api::request_context::RequestContext;
use crate::api::{request_global, Body, RequestBody};
use crate::config::ApiConfig;
use crate::database::{Poem, PoemInput, PoemStore};
use crate::global::ApiGlobal;

/// Applies the supplied fields of `input` to a poem the caller owns. Fields
/// that are absent stay as they are, the owner can never change.
pub async fn update(store: &dyn PoemStore, caller: &Caller, id: Ulid, input: PoemInput) -> Result<Poem, ApiError> {
	let poem = handle_not_found(store.find_by_id(id).await?)?;
	require_ownership(caller, &poem)?;

	// Only the owner learns whether the fields were valid.
	let patch = input.into_patch()?;

	if patch.is_empty() {
		tracing::debug!(poem_id = %id, "empty patch, only touching updated_at");
	}

	// The poem can be deleted between the lookup and the write.
	let poem = handle_not_found(store.update(id, patch).await?)?;

	tracing::info!(poem_id = %id, caller = %caller.user_id, "poem updated");

	Ok(poem)
}

pub async fn handler<G: ApiGlobal, I: RequestBody>(req: Request<I>) -> Result<Response<Body>> {
	let global = request_global::<G, I>(&req)?;

	let context = req.data::<RequestContext>().cloned();
	let caller = require_caller(context).await;
	let caller = challenge(&req, caller)?;

	let id = poem_id(&req)?;

	let mut body = read_json(req.into_body(), global.config::<ApiConfig>().max_body_size).await?;
	remove_blank_fields(&mut body);

	let input = PoemInput::from_body(body).map_err(ApiError::from)?;

	update(global.poem_store(), &caller, id, input).await?;

	Ok(no_content())
}
