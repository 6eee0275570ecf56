use hyper::{Request, Response, StatusCode};
use serde_json::json;
use utils::http::json_response;

use crate::api::error::{ApiError, Result};
use crate::api::{request_global, Body, RequestBody};
use crate::database::{PoemResponse, PoemStore};
use crate::global::ApiGlobal;

/// Every poem, in the store's natural order.
pub async fn list(store: &dyn PoemStore) -> Result<Vec<PoemResponse>, ApiError> {
	Ok(store.find_all().await?.into_iter().map(PoemResponse::from).collect())
}

pub async fn handler<G: ApiGlobal, I: RequestBody>(req: Request<I>) -> Result<Response<Body>> {
	let global = request_global::<G, I>(&req)?;

	let poems = list(global.poem_store()).await?;

	Ok(json_response(StatusCode::OK, json!({ "poems": poems })))
}
