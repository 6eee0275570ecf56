use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use ulid::Ulid;

#[derive(Debug, Clone, PartialEq, Eq, postgres_from_row::FromRow)]
pub struct Poem {
	/// The unique identifier for the poem.
	pub id: Ulid,
	/// The title of the poem.
	pub title: String,
	/// Who wrote the poem.
	pub writer: String,
	/// An optional description.
	pub description: Option<String>,
	/// The user that created the poem, never changes.
	pub owner: Ulid,
	/// The time the poem was created.
	pub created_at: DateTime<Utc>,
	/// The time the poem was last modified.
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
	Missing,
	Empty,
	InvalidType,
}

impl fmt::Display for ValidationReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Missing => write!(f, "is required"),
			Self::Empty => write!(f, "must not be empty"),
			Self::InvalidType => write!(f, "must be a string"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
	pub field: &'static str,
	pub reason: ValidationReason,
}

impl ValidationError {
	pub fn new(field: &'static str, reason: ValidationReason) -> Self {
		Self { field, reason }
	}
}

/// A poem as sent by a client.
///
/// Each field is `None` when absent, `Some(None)` when explicitly `null`.
/// Any `owner` the client sends is never read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoemInput {
	pub title: Option<Option<String>>,
	pub writer: Option<Option<String>>,
	pub description: Option<Option<String>>,
}

impl PoemInput {
	/// Reads the `poem` object out of a request body.
	pub fn from_body(body: Value) -> Result<Self, ValidationError> {
		match body {
			Value::Object(mut body) => match body.remove("poem") {
				Some(poem) => Self::from_value(poem),
				None => Err(ValidationError::new("poem", ValidationReason::Missing)),
			},
			_ => Err(ValidationError::new("poem", ValidationReason::Missing)),
		}
	}

	pub fn from_value(value: Value) -> Result<Self, ValidationError> {
		let Value::Object(mut poem) = value else {
			return Err(ValidationError::new("poem", ValidationReason::InvalidType));
		};

		Ok(Self {
			title: string_field(&mut poem, "title")?,
			writer: string_field(&mut poem, "writer")?,
			description: string_field(&mut poem, "description")?,
		})
	}

	pub fn into_new(self, owner: Ulid) -> Result<NewPoem, ValidationError> {
		Ok(NewPoem {
			title: required("title", self.title)?,
			writer: required("writer", self.writer)?,
			description: self.description.flatten().filter(|d| !d.is_empty()),
			owner,
		})
	}

	pub fn into_patch(self) -> Result<PoemPatch, ValidationError> {
		Ok(PoemPatch {
			title: self.title.map(|title| required("title", Some(title))).transpose()?,
			writer: self.writer.map(|writer| required("writer", Some(writer))).transpose()?,
			description: match self.description {
				Some(Some(description)) if description.is_empty() => None,
				description => description,
			},
		})
	}
}

fn string_field(
	object: &mut serde_json::Map<String, Value>,
	field: &'static str,
) -> Result<Option<Option<String>>, ValidationError> {
	match object.remove(field) {
		None => Ok(None),
		Some(Value::Null) => Ok(Some(None)),
		Some(Value::String(value)) => Ok(Some(Some(value))),
		Some(_) => Err(ValidationError::new(field, ValidationReason::InvalidType)),
	}
}

fn required(field: &'static str, value: Option<Option<String>>) -> Result<String, ValidationError> {
	match value.flatten() {
		None => Err(ValidationError::new(field, ValidationReason::Missing)),
		Some(value) if value.is_empty() => Err(ValidationError::new(field, ValidationReason::Empty)),
		Some(value) => Ok(value),
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoem {
	pub title: String,
	pub writer: String,
	pub description: Option<String>,
	pub owner: Ulid,
}

/// A validated partial update. `None` leaves a field untouched,
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoemPatch {
	pub title: Option<String>,
	pub writer: Option<String>,
	pub description: Option<Option<String>>,
}

impl PoemPatch {
	pub fn is_empty(&self) -> bool {
		self.title.is_none() && self.writer.is_none() && self.description.is_none()
	}

	pub fn apply(self, poem: &mut Poem, now: DateTime<Utc>) {
		if let Some(title) = self.title {
			poem.title = title;
		}

		if let Some(writer) = self.writer {
			poem.writer = writer;
		}

		if let Some(description) = self.description {
			poem.description = description;
		}

		poem.updated_at = now;
	}
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemResponse {
	pub id: Ulid,
	pub title: String,
	pub writer: String,
	pub description: Option<String>,
	pub owner: Ulid,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Poem> for PoemResponse {
	fn from(poem: Poem) -> Self {
		Self {
			id: poem.id,
			title: poem.title,
			writer: poem.writer,
			description: poem.description,
			owner: poem.owner,
			created_at: poem.created_at,
			updated_at: poem.updated_at,
		}
	}
}
