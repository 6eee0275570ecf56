use std::sync::Arc;

use utils::http::router::builder::RouterBuilder;
use utils::http::router::Router;
use utils::http::RouteError;

use super::error::ApiError;
use super::RequestBody;
use crate::global::ApiGlobal;

pub mod health;
pub mod poems;

pub fn routes<G: ApiGlobal, I: RequestBody>(global: &Arc<G>) -> RouterBuilder<I, RouteError<ApiError>> {
	Router::builder()
		.scope("/health", health::routes(global))
		.scope("/poems", poems::routes(global))
}
