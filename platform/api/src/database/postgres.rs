use std::sync::Arc;

use ulid::Ulid;
use utils::database::{Pool, Statement};

use super::{NewPoem, Poem, PoemPatch, PoemStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_poems.sql");

/// A [`PoemStore`] backed by the `poems` table.
pub struct PgPoemStore {
	db: Arc<Pool>,
}

impl PgPoemStore {
	pub fn new(db: Arc<Pool>) -> Self {
		Self { db }
	}

	/// Creates the `poems` table if it does not exist yet.
	pub async fn migrate(&self) -> Result<(), StoreError> {
		let client = self.db.get().await?;
		client.batch_execute(SCHEMA).await?;

		tracing::debug!("poems schema applied");

		Ok(())
	}
}

pub(crate) fn insert_query(id: Ulid, poem: NewPoem) -> Statement {
	Statement::new("INSERT INTO poems (id, title, writer, description, owner) VALUES ($1, $2, $3, $4, $5) RETURNING *")
		.bind(id)
		.bind(poem.title)
		.bind(poem.writer)
		.bind(poem.description)
		.bind(poem.owner)
}

pub(crate) fn update_query(id: Ulid, patch: PoemPatch) -> Statement {
	let mut statement = Statement::new("UPDATE poems SET ");

	let mut assignments = statement.assignments();

	if let Some(title) = patch.title {
		assignments.set("title", title);
	}

	if let Some(writer) = patch.writer {
		assignments.set("writer", writer);
	}

	if let Some(description) = patch.description {
		assignments.set("description", description);
	}

	assignments.set_raw("updated_at = NOW()");

	statement.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
	statement
}

#[async_trait::async_trait]
impl PoemStore for PgPoemStore {
	async fn find_all(&self) -> Result<Vec<Poem>, StoreError> {
		Ok(Statement::new("SELECT * FROM poems ORDER BY id").fetch_all(&self.db).await?)
	}

	async fn find_by_id(&self, id: Ulid) -> Result<Option<Poem>, StoreError> {
		Ok(Statement::new("SELECT * FROM poems WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.db)
			.await?)
	}

	async fn create(&self, poem: NewPoem) -> Result<Poem, StoreError> {
		Ok(insert_query(Ulid::new(), poem).fetch_one(&self.db).await?)
	}

	async fn update(&self, id: Ulid, patch: PoemPatch) -> Result<Option<Poem>, StoreError> {
		Ok(update_query(id, patch).fetch_optional(&self.db).await?)
	}

	async fn delete(&self, id: Ulid) -> Result<bool, StoreError> {
		let deleted = Statement::new("DELETE FROM poems WHERE id = $1")
			.bind(id)
			.execute(&self.db)
			.await?;

		Ok(deleted > 0)
	}
}
