use chrono::{Duration, Utc};
use serde_json::json;
use ulid::Ulid;

use crate::database::{Poem, PoemInput, PoemPatch, PoemResponse, ValidationError, ValidationReason};

fn poem() -> Poem {
	let now = Utc::now();

	Poem {
		id: Ulid::new(),
		title: "Ozymandias".to_string(),
		writer: "Percy Bysshe Shelley".to_string(),
		description: Some("A sonnet".to_string()),
		owner: Ulid::new(),
		created_at: now,
		updated_at: now,
	}
}

#[test]
fn test_poem_input_requires_poem_object() {
	assert_eq!(
		PoemInput::from_body(json!({ "title": "x" })),
		Err(ValidationError::new("poem", ValidationReason::Missing))
	);
	assert_eq!(
		PoemInput::from_body(json!([1, 2, 3])),
		Err(ValidationError::new("poem", ValidationReason::Missing))
	);
	assert_eq!(
		PoemInput::from_body(json!({ "poem": "x" })),
		Err(ValidationError::new("poem", ValidationReason::InvalidType))
	);
}

#[test]
fn test_poem_input_rejects_non_string_fields() {
	let err = PoemInput::from_body(json!({ "poem": { "title": 5, "writer": "w" } })).unwrap_err();

	assert_eq!(err, ValidationError::new("title", ValidationReason::InvalidType));
	assert_eq!(err.to_string(), "title must be a string");
}

#[test]
fn test_into_new_validates_required_fields() {
	let owner = Ulid::new();

	let input = PoemInput::from_body(json!({ "poem": { "title": "t" } })).unwrap();
	assert_eq!(
		input.into_new(owner),
		Err(ValidationError::new("writer", ValidationReason::Missing))
	);

	let input = PoemInput::from_body(json!({ "poem": { "title": "", "writer": "w" } })).unwrap();
	assert_eq!(
		input.into_new(owner).unwrap_err().to_string(),
		"title must not be empty"
	);

	let input = PoemInput::from_body(json!({ "poem": { "title": null, "writer": "w" } })).unwrap();
	assert_eq!(
		input.into_new(owner),
		Err(ValidationError::new("title", ValidationReason::Missing))
	);
}

#[test]
fn test_into_new_ignores_client_owner() {
	let owner = Ulid::new();
	let other = Ulid::new();

	let input = PoemInput::from_body(json!({
		"poem": {
			"title": "t",
			"writer": "w",
			"description": "",
			"owner": other.to_string(),
		}
	}))
	.unwrap();

	let new = input.into_new(owner).unwrap();

	assert_eq!(new.owner, owner);
	assert_eq!(new.title, "t");
	assert_eq!(new.writer, "w");
	assert_eq!(new.description, None);
}

#[test]
fn test_into_patch() {
	let input = PoemInput::from_body(json!({ "poem": { "writer": "w", "description": null } })).unwrap();
	assert_eq!(
		input.into_patch().unwrap(),
		PoemPatch {
			title: None,
			writer: Some("w".to_string()),
			description: Some(None),
		}
	);

	let input = PoemInput::from_body(json!({ "poem": { "description": "" } })).unwrap();
	assert!(input.into_patch().unwrap().is_empty());

	let input = PoemInput::from_body(json!({ "poem": { "title": null } })).unwrap();
	assert_eq!(
		input.into_patch(),
		Err(ValidationError::new("title", ValidationReason::Missing))
	);

	let input = PoemInput::from_body(json!({ "poem": {} })).unwrap();
	assert!(input.into_patch().unwrap().is_empty());
}

#[test]
fn test_patch_apply_only_touches_given_fields() {
	let mut poem = poem();
	let before = poem.clone();
	let later = before.updated_at + Duration::seconds(5);

	PoemPatch {
		title: Some("Sonnet 18".to_string()),
		..Default::default()
	}
	.apply(&mut poem, later);

	assert_eq!(poem.title, "Sonnet 18");
	assert_eq!(poem.writer, before.writer);
	assert_eq!(poem.description, before.description);
	assert_eq!(poem.owner, before.owner);
	assert_eq!(poem.created_at, before.created_at);
	assert_eq!(poem.updated_at, later);

	PoemPatch {
		description: Some(None),
		..Default::default()
	}
	.apply(&mut poem, later);

	assert_eq!(poem.description, None);
}

#[test]
fn test_poem_response_json() {
	let poem = poem();
	let value = serde_json::to_value(PoemResponse::from(poem.clone())).unwrap();

	assert_eq!(value["id"], json!(poem.id.to_string()));
	assert_eq!(value["title"], json!("Ozymandias"));
	assert_eq!(value["owner"], json!(poem.owner.to_string()));
	assert!(value.get("createdAt").is_some());
	assert!(value.get("updatedAt").is_some());
	assert!(value.get("created_at").is_none());
}
