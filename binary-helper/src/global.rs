use std::sync::{Arc, Weak};

use anyhow::Context as _;
use hyper::StatusCode;
use utils::database::deadpool_postgres::{Manager, ManagerConfig, PoolConfig, RecyclingMethod, Runtime};
use utils::database::tokio_postgres::NoTls;
use utils::database::Pool;
use utils::http::RouteError;

use crate::config::DatabaseConfig;

#[macro_export]
macro_rules! impl_global_traits {
	($struct:ty) => {
		impl binary_helper::global::GlobalCtx for $struct {
			#[inline(always)]
			fn ctx(&self) -> &utils::context::Context {
				&self.ctx
			}
		}

		impl binary_helper::global::GlobalConfig for $struct {}
	};
}

pub trait GlobalCtx {
	fn ctx(&self) -> &utils::context::Context;
}

pub trait GlobalConfig {
	#[inline(always)]
	fn config<C>(&self) -> &C
	where
		Self: GlobalConfigProvider<C>,
	{
		GlobalConfigProvider::provide_config(self)
	}
}

pub trait GlobalConfigProvider<C> {
	fn provide_config(&self) -> &C;
}

pub async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<Arc<Pool>> {
	let pg_config = config
		.uri
		.parse::<utils::database::tokio_postgres::Config>()
		.context("invalid database uri")?;

	let manager = Manager::from_config(
		pg_config,
		NoTls,
		ManagerConfig {
			recycling_method: RecyclingMethod::Fast,
		},
	);

	Ok(Arc::new(
		Pool::builder(manager)
			.config(PoolConfig::default())
			.runtime(Runtime::Tokio1)
			.build()
			.context("failed to create database pool")?,
	))
}

/// Handlers only hold a [`Weak`] reference to the global state so that open
/// keep-alive connections do not block shutdown.
pub trait RequestGlobalExt {
	fn get_global<G: Sync + Send + 'static, E>(&self) -> std::result::Result<Arc<G>, RouteError<E>>;
}

impl<B> RequestGlobalExt for hyper::Request<B> {
	fn get_global<G: Sync + Send + 'static, E>(&self) -> std::result::Result<Arc<G>, RouteError<E>> {
		self.extensions()
			.get::<Weak<G>>()
			.and_then(Weak::upgrade)
			.ok_or_else(|| (StatusCode::INTERNAL_SERVER_ERROR, "global state unavailable").into())
	}
}
