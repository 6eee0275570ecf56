use hyper::{Request, Response, StatusCode};
use serde_json::json;
use ulid::Ulid;
use utils::http::json_response;

use super::guard::handle_not_found;
use super::poem_id;
use crate::api::error::{ApiError, Result};
use crate::api::{request_global, Body, RequestBody};
use crate::database::{Poem, PoemResponse, PoemStore};
use crate::global::ApiGlobal;

pub async fn get(store: &dyn PoemStore, id: Ulid) -> Result<Poem, ApiError> {
	handle_not_found(store.find_by_id(id).await?)
}

pub async fn handler<G: ApiGlobal, I: RequestBody>(req: Request<I>) -> Result<Response<Body>> {
	let global = request_global::<G, I>(&req)?;
	let id = poem_id(&req)?;

	let poem = get(global.poem_store(), id).await?;

	Ok(json_response(
		StatusCode::OK,
		json!({ "poem": PoemResponse::from(poem) }),
	))
}
