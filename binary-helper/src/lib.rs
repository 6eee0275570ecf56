use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tokio::signal::unix::SignalKind;
use tokio::{select, time};
pub use traits::{Config, Global};
use utils::context::Context;
use utils::signal;

pub mod config;
pub mod global;
pub mod logging;
pub mod traits;


/// How long running tasks get to finish after a shutdown signal.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(60);

/// Runs `process` with an already parsed config until it exits or the
/// process receives SIGINT or SIGTERM.
pub async fn bootstrap<C: Config, G: Global<C>, F: Future<Output = anyhow::Result<()>> + Send + 'static>(
	config: C,
	process: impl FnOnce(Arc<G>) -> F,
) -> anyhow::Result<()> {
	let (ctx, handler) = Context::new();

	logging::init(&config.logging().level, config.logging().mode).context("failed to init logging")?;

	tracing::info!(name = config.name(), "starting up");

	let global = Arc::new(G::new(ctx, config).await.context("failed to create global state")?);

	tracing::debug!("global state created, starting process");

	let process_future = tokio::spawn(process(global));

	let mut signal_handler = signal::SignalHandler::new()
		.with_signal(SignalKind::interrupt())
		.and_then(|signals| signals.with_signal(SignalKind::terminate()))
		.context("failed to install signal handlers")?;

	select! {
		_ = signal_handler.recv() => tracing::info!("shutting down"),
		r = process_future => tracing::error!("process stopped unexpectedly: {:#}", match &r {
			Ok(Ok(())) => &"no error raised" as &dyn std::fmt::Display,
			Err(err) => err as &dyn std::fmt::Display,
			Ok(Err(err)) => err as &dyn std::fmt::Display,
		}),
	}

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(SHUTDOWN_GRACE_PERIOD) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutting down"),
	}

	Ok(())
}
