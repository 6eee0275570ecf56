use std::future::Future;
use std::sync::Arc;

use http::request::Parts;
use hyper::{Method, Request, Response};

use super::middleware::{Middleware, Provide};
use super::{ErrorRenderer, Handler, Route, RouteFuture, Router};
use crate::http::Body;

enum Entry<I, E> {
	Route {
		method: Option<Method>,
		path: &'static str,
		handler: Handler<I, E>,
	},
	Scope {
		path: &'static str,
		builder: RouterBuilder<I, E>,
	},
}

/// Collects routes, scopes and middlewares before they are flattened into a [`Router`].
///
/// Middlewares of a scope run after those of its parents. Data always runs
/// before any other middleware of the same scope.
pub struct RouterBuilder<I, E> {
	entries: Vec<Entry<I, E>>,
	layers: Vec<Arc<dyn Middleware<I, E>>>,
	data_layers: usize,
	on_error: Option<ErrorRenderer<E>>,
}

impl<I: Send + 'static, E: Send + 'static> Default for RouterBuilder<I, E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<I: Send + 'static, E: Send + 'static> RouterBuilder<I, E> {
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
			layers: Vec::new(),
			data_layers: 0,
			on_error: None,
		}
	}

	pub fn middleware(mut self, middleware: impl Middleware<I, E>) -> Self {
		self.layers.push(Arc::new(middleware));
		self
	}

	pub fn data<T: Clone + Send + Sync + 'static>(mut self, data: T) -> Self {
		self.layers.insert(self.data_layers, Arc::new(Provide(data)));
		self.data_layers += 1;
		self
	}

	/// Turns route errors into responses. The renderer runs inside every
	/// middleware, so they all see the rendered response.
	pub fn error_handler(mut self, render: impl Fn(&Parts, E) -> Response<Body> + Send + Sync + 'static) -> Self {
		self.on_error = Some(Arc::new(render));
		self
	}

	pub fn route<F>(mut self, method: Option<Method>, path: &'static str, handler: impl Fn(Request<I>) -> F + Send + Sync + 'static) -> Self
	where
		F: Future<Output = Result<Response<Body>, E>> + Send + 'static,
	{
		let handler: Handler<I, E> = Arc::new(move |req| -> RouteFuture<E> { Box::pin(handler(req)) });

		self.entries.push(Entry::Route { method, path, handler });
		self
	}

	pub fn get<F>(self, path: &'static str, handler: impl Fn(Request<I>) -> F + Send + Sync + 'static) -> Self
	where
		F: Future<Output = Result<Response<Body>, E>> + Send + 'static,
	{
		self.route(Some(Method::GET), path, handler)
	}

	pub fn post<F>(self, path: &'static str, handler: impl Fn(Request<I>) -> F + Send + Sync + 'static) -> Self
	where
		F: Future<Output = Result<Response<Body>, E>> + Send + 'static,
	{
		self.route(Some(Method::POST), path, handler)
	}

	pub fn patch<F>(self, path: &'static str, handler: impl Fn(Request<I>) -> F + Send + Sync + 'static) -> Self
	where
		F: Future<Output = Result<Response<Body>, E>> + Send + 'static,
	{
		self.route(Some(Method::PATCH), path, handler)
	}

	pub fn delete<F>(self, path: &'static str, handler: impl Fn(Request<I>) -> F + Send + Sync + 'static) -> Self
	where
		F: Future<Output = Result<Response<Body>, E>> + Send + 'static,
	{
		self.route(Some(Method::DELETE), path, handler)
	}

	/// Matches any method on any path no other route claims.
	pub fn not_found<F>(self, handler: impl Fn(Request<I>) -> F + Send + Sync + 'static) -> Self
	where
		F: Future<Output = Result<Response<Body>, E>> + Send + 'static,
	{
		self.route(None, "*", handler)
	}

	pub fn scope(mut self, path: &'static str, builder: RouterBuilder<I, E>) -> Self {
		self.entries.push(Entry::Scope { path, builder });
		self
	}

	pub fn build(self) -> Router<I, E> {
		let mut router = Router {
			routes: Vec::new(),
			tree: path_tree::PathTree::new(),
		};

		self.flatten("", &[], None, &mut router);

		router
	}

	fn flatten(
		self,
		prefix: &str,
		parent_chain: &[Arc<dyn Middleware<I, E>>],
		parent_on_error: Option<&ErrorRenderer<E>>,
		router: &mut Router<I, E>,
	) {
		let chain: Vec<_> = parent_chain.iter().cloned().chain(self.layers).collect();
		let shared: Arc<[Arc<dyn Middleware<I, E>>]> = chain.clone().into();
		let on_error = self.on_error.or_else(|| parent_on_error.cloned());

		for entry in self.entries {
			match entry {
				Entry::Route { method, path, handler } => {
					let method = method.as_ref().map_or("*", Method::as_str);
					let key = format!("/{method}/{}", join(prefix, path));

					router.insert(
						&key,
						Route {
							handler,
							chain: shared.clone(),
							on_error: on_error.clone(),
						},
					);
				}
				Entry::Scope { path, builder } => {
					builder.flatten(&join(prefix, path), &chain, on_error.as_ref(), router);
				}
			}
		}
	}
}

fn join(prefix: &str, path: &str) -> String {
	let prefix = prefix.trim_matches('/');
	let path = path.trim_matches('/');

	match (prefix.is_empty(), path.is_empty()) {
		(true, _) => path.to_owned(),
		(_, true) => prefix.to_owned(),
		_ => format!("{prefix}/{path}"),
	}
}
