use ulid::Ulid;

use super::{NewPoem, Poem, PoemPatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("failed to query database: {0}")]
	Pool(#[from] utils::database::deadpool_postgres::PoolError),
	#[error("failed to run statement: {0}")]
	Postgres(#[from] utils::database::tokio_postgres::Error),
}

/// Persistence for poems. The store stamps `created_at` and `updated_at`
/// and assigns ids; callers never set them.
#[async_trait::async_trait]
pub trait PoemStore: Send + Sync + 'static {
	/// All poems in creation order.
	async fn find_all(&self) -> Result<Vec<Poem>, StoreError>;

	async fn find_by_id(&self, id: Ulid) -> Result<Option<Poem>, StoreError>;

	async fn create(&self, poem: NewPoem) -> Result<Poem, StoreError>;

	/// Applies the patch and returns the updated poem, `None` if there is no
	/// poem with this id.
	async fn update(&self, id: Ulid, patch: PoemPatch) -> Result<Option<Poem>, StoreError>;

	/// Returns whether a poem was removed.
	async fn delete(&self, id: Ulid) -> Result<bool, StoreError>;
}
