use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;

pub mod error;
pub mod router;

pub use error::{error_handler, RouteError, ShouldLog};

/// Every response this crate builds carries its whole body in memory.
pub type Body = Full<Bytes>;

pub fn json_response(status: StatusCode, body: serde_json::Value) -> hyper::Response<Body> {
	let mut resp = hyper::Response::new(Body::new(Bytes::from(body.to_string())));
	*resp.status_mut() = status;
	resp.headers_mut()
		.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	resp
}
