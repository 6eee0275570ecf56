use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;
use ulid::{Generator, Ulid};

use super::{NewPoem, Poem, PoemPatch, PoemStore, StoreError};

struct Inner {
	generator: Generator,
	poems: BTreeMap<Ulid, Poem>,
}

impl Default for Inner {
	fn default() -> Self {
		Self {
			generator: Generator::new(),
			poems: BTreeMap::new(),
		}
	}
}

/// A [`PoemStore`] that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryPoemStore(RwLock<Inner>);

impl MemoryPoemStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn len(&self) -> usize {
		self.0.read().await.poems.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}
}

#[async_trait::async_trait]
impl PoemStore for MemoryPoemStore {
	async fn find_all(&self) -> Result<Vec<Poem>, StoreError> {
		Ok(self.0.read().await.poems.values().cloned().collect())
	}

	async fn find_by_id(&self, id: Ulid) -> Result<Option<Poem>, StoreError> {
		Ok(self.0.read().await.poems.get(&id).cloned())
	}

	async fn create(&self, poem: NewPoem) -> Result<Poem, StoreError> {
		let mut inner = self.0.write().await;

		// Ids must sort in creation order, even within the same millisecond.
		let id = inner.generator.generate().unwrap_or_else(|_| Ulid::new());
		let now = Utc::now();

		let poem = Poem {
			id,
			title: poem.title,
			writer: poem.writer,
			description: poem.description,
			owner: poem.owner,
			created_at: now,
			updated_at: now,
		};

		inner.poems.insert(id, poem.clone());

		Ok(poem)
	}

	async fn update(&self, id: Ulid, patch: PoemPatch) -> Result<Option<Poem>, StoreError> {
		let mut inner = self.0.write().await;

		Ok(inner.poems.get_mut(&id).map(|poem| {
			patch.apply(poem, Utc::now());
			poem.clone()
		}))
	}

	async fn delete(&self, id: Ulid) -> Result<bool, StoreError> {
		Ok(self.0.write().await.poems.remove(&id).is_some())
	}
}
