use std::borrow::Cow;
use std::fmt::{Debug, Display};
use std::panic::Location;

use http::request::Parts;
use http::StatusCode;
use serde_json::json;

use super::{json_response, Body};

/// An error a route hands back instead of a response.
///
/// Keeps where it was raised and the span it was raised in, so the log line
/// written by [`error_handler`] points at the handler and not at the router.
pub struct RouteError<E> {
	status: StatusCode,
	message: Cow<'static, str>,
	source: Option<E>,
	location: &'static Location<'static>,
	span: tracing::Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldLog {
	Yes,
	Debug,
	No,
}

impl<E> RouteError<E> {
	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}

	/// Server errors always, client errors only at debug when something caused them.
	pub fn should_log(&self) -> ShouldLog {
		if self.status.is_server_error() {
			ShouldLog::Yes
		} else if self.source.is_some() {
			ShouldLog::Debug
		} else {
			ShouldLog::No
		}
	}

	/// `{"message": .., "success": false}` with the error's status.
	pub fn response(&self) -> hyper::Response<Body> {
		json_response(self.status, json!({ "message": self.message, "success": false }))
	}
}

impl<E, S: Into<Cow<'static, str>>> From<(StatusCode, S)> for RouteError<E> {
	#[track_caller]
	fn from((status, message): (StatusCode, S)) -> Self {
		Self {
			status,
			message: message.into(),
			source: None,
			location: Location::caller(),
			span: tracing::Span::current(),
		}
	}
}

impl<E, S: Into<Cow<'static, str>>, T: Into<E>> From<(StatusCode, S, T)> for RouteError<E> {
	#[track_caller]
	fn from((status, message, source): (StatusCode, S, T)) -> Self {
		Self {
			status,
			message: message.into(),
			source: Some(source.into()),
			location: Location::caller(),
			span: tracing::Span::current(),
		}
	}
}

impl<E: Debug> Debug for RouteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteError")
			.field("status", &self.status)
			.field("message", &self.message)
			.field("source", &self.source)
			.finish()
	}
}

impl<E: Display> Display for RouteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "{} ({}): {}", self.message, self.status, err),
			None => write!(f, "{} ({})", self.message, self.status),
		}
	}
}

impl<E: std::error::Error + 'static> std::error::Error for RouteError<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source.as_ref().map(|err| err as _)
	}
}

/// Logs a route error inside the span it was raised in and renders it.
pub fn error_handler<E: std::error::Error + 'static>(head: &Parts, err: RouteError<E>) -> hyper::Response<Body> {
	let location = err.location.to_string();

	err.span.in_scope(|| match err.should_log() {
		ShouldLog::Yes => {
			tracing::error!(path = %head.uri, method = %head.method, location, error = ?err, "http error")
		}
		ShouldLog::Debug => {
			tracing::debug!(path = %head.uri, method = %head.method, location, error = ?err, "http error")
		}
		ShouldLog::No => (),
	});

	err.response()
}
