use hyper::{Request, Response, StatusCode};
use serde_json::json;
use utils::http::router::ext::RequestExt;
use utils::http::json_response;

use super::{challenge, read_json, require_caller};
use crate::api::auth::Caller;
use crate::api::error::{ApiError, Result};
use crate::api::request_context::RequestContext;
use crate::api::{request_global, Body, RequestBody};
use crate::config::ApiConfig;
use crate::database::{Poem, PoemInput, PoemResponse, PoemStore};
use crate::global::ApiGlobal;

/// Stores a new poem owned by `caller`, whatever owner the input claims.
pub async fn create(store: &dyn PoemStore, caller: &Caller, input: PoemInput) -> Result<Poem, ApiError> {
	let poem = store.create(input.into_new(caller.user_id)?).await?;

	tracing::info!(poem_id = %poem.id, owner = %poem.owner, "poem created");

	Ok(poem)
}

pub async fn handler<G: ApiGlobal, I: RequestBody>(req: Request<I>) -> Result<Response<Body>> {
	let global = request_global::<G, I>(&req)?;

	let context = req.data::<RequestContext>().cloned();
	let caller = require_caller(context).await;
	let caller = challenge(&req, caller)?;

	let body = read_json(req.into_body(), global.config::<ApiConfig>().max_body_size).await?;
	let input = PoemInput::from_body(body).map_err(ApiError::from)?;

	let poem = create(global.poem_store(), &caller, input).await?;

	Ok(json_response(
		StatusCode::CREATED,
		json!({ "poem": PoemResponse::from(poem) }),
	))
}
