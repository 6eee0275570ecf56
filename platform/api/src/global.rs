use std::sync::Arc;

use anyhow::Context as _;
use binary_helper::global::{setup_database, GlobalConfigProvider};
use binary_helper::impl_global_traits;
use utils::context::Context;

use crate::config::{ApiConfig, AppConfig, JwtConfig, StoreKind};
use crate::database::{MemoryPoemStore, PgPoemStore, PoemStore};

pub trait ApiState {
	fn poem_store(&self) -> &dyn PoemStore;
}

pub trait ApiGlobal:
	binary_helper::global::GlobalCtx
	+ binary_helper::global::GlobalConfigProvider<ApiConfig>
	+ binary_helper::global::GlobalConfigProvider<JwtConfig>
	+ binary_helper::global::GlobalConfig
	+ ApiState
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> ApiGlobal for T where
	T: binary_helper::global::GlobalCtx
		+ binary_helper::global::GlobalConfigProvider<ApiConfig>
		+ binary_helper::global::GlobalConfigProvider<JwtConfig>
		+ binary_helper::global::GlobalConfig
		+ ApiState
		+ Send
		+ Sync
		+ 'static
{
}

pub struct GlobalState {
	ctx: Context,
	config: AppConfig,
	store: Arc<dyn PoemStore>,
}

impl_global_traits!(GlobalState);

impl GlobalState {
	pub fn with_store(ctx: Context, config: AppConfig, store: Arc<dyn PoemStore>) -> Self {
		Self { ctx, config, store }
	}

	pub fn app_config(&self) -> &AppConfig {
		&self.config
	}
}

impl GlobalConfigProvider<ApiConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &ApiConfig {
		&self.config.extra.api
	}
}

impl GlobalConfigProvider<JwtConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &JwtConfig {
		&self.config.extra.jwt
	}
}

impl ApiState for GlobalState {
	#[inline(always)]
	fn poem_store(&self) -> &dyn PoemStore {
		self.store.as_ref()
	}
}

impl binary_helper::Global<AppConfig> for GlobalState {
	async fn new(ctx: Context, config: AppConfig) -> anyhow::Result<Self> {
		let store: Arc<dyn PoemStore> = match config.extra.store {
			StoreKind::Postgres => {
				let db = setup_database(&config.database).await?;

				let store = PgPoemStore::new(db);
				store.migrate().await.context("failed to apply poems schema")?;

				Arc::new(store)
			}
			StoreKind::Memory => {
				tracing::warn!("using the in-memory store, poems will not survive a restart");
				Arc::new(MemoryPoemStore::new())
			}
		};

		Ok(Self::with_store(ctx, config, store))
	}
}
