use fnv::FnvHashSet;
use http::header::{self, HeaderMap, HeaderValue, InvalidHeaderValue};
use hyper::{Method, Request, Response, StatusCode};

use super::{Middleware, Next};
use crate::http::Body;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsOptions {
	/// `*` allows any origin.
	pub allow_origins: Vec<String>,
	pub allow_methods: Vec<String>,
	pub allow_headers: Vec<String>,
	pub max_age_seconds: Option<u64>,
}

/// Answers preflight requests from allowed origins and tags every other
/// response to them with the CORS headers.
///
/// Preflights are answered before routing goes any further, so the router
/// only needs a route that matches `OPTIONS` on the path, such as a
/// not-found fallback.
pub struct CorsMiddleware {
	any_origin: bool,
	origins: FnvHashSet<String>,
	methods: HeaderValue,
	headers: HeaderValue,
	max_age: Option<HeaderValue>,
}

impl CorsMiddleware {
	pub fn new(options: &CorsOptions) -> Result<Self, InvalidHeaderValue> {
		Ok(Self {
			any_origin: options.allow_origins.iter().any(|origin| origin == "*"),
			origins: options.allow_origins.iter().map(|origin| origin.to_ascii_lowercase()).collect(),
			methods: HeaderValue::from_str(&options.allow_methods.join(", "))?,
			headers: HeaderValue::from_str(&options.allow_headers.join(", "))?,
			max_age: options.max_age_seconds.map(HeaderValue::from),
		})
	}

	/// The origin to echo back, if it is allowed.
	fn allowed_origin(&self, headers: &HeaderMap) -> Option<HeaderValue> {
		let origin = headers.get(header::ORIGIN)?;
		let allowed = self.any_origin
			|| origin
				.to_str()
				.is_ok_and(|origin| self.origins.contains(&origin.to_ascii_lowercase()));

		allowed.then(|| origin.clone())
	}

	fn decorate(&self, origin: HeaderValue, headers: &mut HeaderMap) {
		headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
		if !self.methods.is_empty() {
			headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, self.methods.clone());
		}
		if !self.headers.is_empty() {
			headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.headers.clone());
		}
		if let Some(max_age) = &self.max_age {
			headers.insert(header::ACCESS_CONTROL_MAX_AGE, max_age.clone());
		}
		headers.insert(header::VARY, HeaderValue::from_static("Origin"));
	}
}

#[async_trait::async_trait]
impl<I: Send + 'static, E: Send + 'static> Middleware<I, E> for CorsMiddleware {
	async fn handle(&self, req: Request<I>, next: Next<I, E>) -> Result<Response<Body>, E> {
		let Some(origin) = self.allowed_origin(req.headers()) else {
			return next.run(req).await;
		};

		let preflight =
			req.method() == Method::OPTIONS && req.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

		let mut resp = if preflight {
			let mut resp = Response::new(Body::default());
			*resp.status_mut() = StatusCode::NO_CONTENT;
			resp
		} else {
			next.run(req).await?
		};

		self.decorate(origin, resp.headers_mut());

		Ok(resp)
	}
}
