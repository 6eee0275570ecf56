use crate::api::auth::Caller;
use crate::api::error::ApiError;
use crate::database::Poem;

/// Every lookup by id goes through here so an absent poem never reaches
/// the rest of an operation.
pub fn handle_not_found<T>(value: Option<T>) -> Result<T, ApiError> {
	value.ok_or(ApiError::NotFound)
}

/// Must pass before a poem is modified or removed.
pub fn require_ownership(caller: &Caller, poem: &Poem) -> Result<(), ApiError> {
	if caller.user_id != poem.owner {
		return Err(ApiError::Forbidden);
	}

	Ok(())
}
