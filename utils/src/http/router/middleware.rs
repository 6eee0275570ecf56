use std::sync::Arc;

use hyper::{Request, Response};

use super::{Route, RouteFuture};
use crate::http::Body;

mod cors;
mod response_headers;

pub use cors::{CorsMiddleware, CorsOptions};
pub use response_headers::{ResponseHeadersMiddleware, ResponseHeadersRequestExt};

#[async_trait::async_trait]
pub trait Middleware<I, E>: Send + Sync + 'static {
	async fn handle(&self, req: Request<I>, next: Next<I, E>) -> Result<Response<Body>, E>;
}

/// The rest of the chain after the running middleware, ending at the route.
pub struct Next<I, E> {
	route: Arc<Route<I, E>>,
	position: usize,
}

impl<I: Send + 'static, E: Send + 'static> Next<I, E> {
	pub(crate) fn new(route: Arc<Route<I, E>>) -> Self {
		Self { route, position: 0 }
	}

	pub fn run(mut self, req: Request<I>) -> RouteFuture<E> {
		match self.route.chain.get(self.position).cloned() {
			Some(middleware) => {
				self.position += 1;
				Box::pin(async move { middleware.handle(req, self).await })
			}
			None => self.route.call(req),
		}
	}
}

/// Inserts a clone of `T` into every request's extensions.
pub(crate) struct Provide<T>(pub T);

#[async_trait::async_trait]
impl<I: Send + 'static, E: Send + 'static, T: Clone + Send + Sync + 'static> Middleware<I, E> for Provide<T> {
	async fn handle(&self, mut req: Request<I>, next: Next<I, E>) -> Result<Response<Body>, E> {
		req.extensions_mut().insert(self.0.clone());
		next.run(req).await
	}
}
