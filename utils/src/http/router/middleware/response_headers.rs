use std::sync::{Arc, Mutex, PoisonError};

use http::header::{HeaderMap, HeaderValue, IntoHeaderName};
use hyper::{Request, Response};

use super::{Middleware, Next};
use crate::http::router::ext::RequestExt;
use crate::http::Body;

#[derive(Clone, Default)]
struct PendingHeaders(Arc<Mutex<HeaderMap>>);

impl PendingHeaders {
	fn lock(&self) -> std::sync::MutexGuard<'_, HeaderMap> {
		// A panicking handler cannot leave a header map half written.
		self.0.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

/// Copies headers queued with [`ResponseHeadersRequestExt::set_response_header`]
/// onto the response, whoever built it.
#[derive(Default)]
pub struct ResponseHeadersMiddleware;

#[async_trait::async_trait]
impl<I: Send + 'static, E: Send + 'static> Middleware<I, E> for ResponseHeadersMiddleware {
	async fn handle(&self, mut req: Request<I>, next: Next<I, E>) -> Result<Response<Body>, E> {
		let pending = PendingHeaders::default();
		req.provide(pending.clone());

		let mut resp = next.run(req).await?;

		for (key, value) in pending.lock().drain() {
			if let Some(key) = key {
				resp.headers_mut().insert(key, value);
			}
		}

		Ok(resp)
	}
}

pub trait ResponseHeadersRequestExt {
	fn set_response_header<K: IntoHeaderName>(&self, key: K, value: impl Into<HeaderValue>);
}

impl<B> ResponseHeadersRequestExt for Request<B> {
	fn set_response_header<K: IntoHeaderName>(&self, key: K, value: impl Into<HeaderValue>) {
		if let Some(pending) = self.data::<PendingHeaders>() {
			pending.lock().insert(key, value.into());
		}
	}
}
