use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::request::Parts;
use hyper::{Request, Response};
use path_tree::PathTree;

use self::builder::RouterBuilder;
use self::middleware::{Middleware, Next};
use super::Body;

pub mod builder;
pub mod ext;
pub mod middleware;

pub type RouteFuture<E> = Pin<Box<dyn Future<Output = Result<Response<Body>, E>> + Send + 'static>>;

pub(crate) type Handler<I, E> = Arc<dyn Fn(Request<I>) -> RouteFuture<E> + Send + Sync + 'static>;
pub(crate) type ErrorRenderer<E> = Arc<dyn Fn(&Parts, E) -> Response<Body> + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum RouterError<E> {
	#[error("unhandled error: {0:?}")]
	Unhandled(E),
	#[error("route not found")]
	NotFound,
}

/// Path parameters captured by the matched route.
#[derive(Debug, Clone, Default)]
pub struct RouteParams(Vec<(String, String)>);

impl RouteParams {
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}
}

/// A registered route with everything that runs around it.
pub(crate) struct Route<I, E> {
	handler: Handler<I, E>,
	chain: Arc<[Arc<dyn Middleware<I, E>>]>,
	on_error: Option<ErrorRenderer<E>>,
}

impl<I: Send + 'static, E: Send + 'static> Route<I, E> {
	/// Calls the handler, rendering its error when the route has a renderer.
	fn call(&self, req: Request<I>) -> RouteFuture<E> {
		let Some(render) = self.on_error.clone() else {
			return (self.handler)(req);
		};

		let (head, body) = req.into_parts();
		let fut = (self.handler)(Request::from_parts(head.clone(), body));

		Box::pin(async move {
			match fut.await {
				Ok(resp) => Ok(resp),
				Err(err) => Ok(render(&head, err)),
			}
		})
	}
}

/// Matches requests on method and path in one lookup.
///
/// Every route is stored under `/{METHOD}/{path}`, routes registered for any
/// method under `/*/{path}`.
pub struct Router<I, E> {
	routes: Vec<Arc<Route<I, E>>>,
	tree: PathTree<usize>,
}

impl<I: Send + 'static, E: Send + 'static> Router<I, E> {
	pub fn builder() -> RouterBuilder<I, E> {
		RouterBuilder::new()
	}

	pub async fn handle(&self, mut req: Request<I>) -> Result<Response<Body>, RouterError<E>> {
		let index = {
			let key = format!("/{}{}", req.method().as_str(), req.uri().path());
			let (index, path) = self.tree.find(&key).ok_or(RouterError::NotFound)?;

			let params = path.params_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();
			req.extensions_mut().insert(RouteParams(params));
			*index
		};

		let route = self.routes[index].clone();
		let next = Next::new(route.clone());

		// Errors raised by a middleware never reach the route's own renderer.
		let Some(render) = route.on_error.clone() else {
			return next.run(req).await.map_err(RouterError::Unhandled);
		};

		let (head, body) = req.into_parts();
		match next.run(Request::from_parts(head.clone(), body)).await {
			Ok(resp) => Ok(resp),
			Err(err) => Ok(render(&head, err)),
		}
	}

	pub(crate) fn insert(&mut self, key: &str, route: Route<I, E>) {
		tracing::debug!(key, "adding route");
		self.tree.insert(key, self.routes.len());
		self.routes.push(Arc::new(route));
	}
}

impl<I, E> Debug for Router<I, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router").field("routes", &self.routes.len()).finish()
	}
}
