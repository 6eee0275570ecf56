use std::sync::Arc;

use hyper::{Request, Response, StatusCode};
use serde_json::json;
use utils::http::router::builder::RouterBuilder;
use utils::http::router::Router;
use utils::http::{json_response, RouteError};

use crate::api::error::{ApiError, Result};
use crate::api::{Body, RequestBody};
use crate::global::ApiGlobal;

async fn health<I>(_: Request<I>) -> Result<Response<Body>> {
	Ok(json_response(
		StatusCode::OK,
		json!({
			"status": "ok"
		}),
	))
}

pub fn routes<G: ApiGlobal, I: RequestBody>(_: &Arc<G>) -> RouterBuilder<I, RouteError<ApiError>> {
	Router::builder().get("/", health::<I>)
}
