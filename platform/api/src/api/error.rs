use hyper::StatusCode;
use utils::http::RouteError;

use super::auth::AuthError;
use crate::database::{StoreError, ValidationError};

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("{0}")]
	Validation(#[from] ValidationError),
	#[error("{0}")]
	BadRequest(String),
	#[error("payload too large")]
	PayloadTooLarge,
	#[error("{0}")]
	Unauthorized(#[from] AuthError),
	#[error("forbidden")]
	Forbidden,
	#[error("not found")]
	NotFound,
	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

impl ApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Self::BadRequest(_) => StatusCode::BAD_REQUEST,
			Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
			Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<ApiError> for RouteError<ApiError> {
	#[track_caller]
	fn from(value: ApiError) -> Self {
		let message = match &value {
			// Store failures are logged with their source, never shown to clients.
			ApiError::Store(_) => "internal server error".to_string(),
			err => err.to_string(),
		};

		RouteError::from((value.status(), message, value))
	}
}
