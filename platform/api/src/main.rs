use anyhow::Context as _;
use binary_helper::{bootstrap, logging, Config};
use poetry_api::api::jwt::AuthJwtPayload;
use poetry_api::config::AppConfig;
use poetry_api::global::GlobalState;

#[tokio::main]
pub async fn main() {
	if let Err(err) = run().await {
		tracing::error!("{:#}", err);
		std::process::exit(1);
	}
}

async fn run() -> anyhow::Result<()> {
	let config = AppConfig::parse()
		.and_then(|mut config| {
			config.pre_hook()?;
			Ok(config)
		})
		.map_err(|err| {
			let _ = logging::init("info", Default::default());
			err
		})
		.context("failed to parse config")?;

	if let Some(user_id) = config.extra.issue_token {
		let token = AuthJwtPayload::new(&config.extra.jwt, user_id)
			.sign(&config.extra.jwt)
			.context("failed to sign token")?;

		println!("{token}");

		return Ok(());
	}

	bootstrap::<AppConfig, GlobalState, _>(config, |global| async move {
		poetry_api::api::run(global).await
	})
	.await
}
