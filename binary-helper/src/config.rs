use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;

use super::Config;
use crate::logging;

/// Extensions tried, in order, when the config file is given without one.
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, bound = "")]
pub struct AppConfig<T: ConfigExtention> {
	/// The name of the application
	pub name: String,

	/// The path to the config file
	pub config_file: Option<String>,

	/// The logging configuration
	pub logging: LoggingConfig,

	/// The database configuration
	pub database: DatabaseConfig,

	#[serde(flatten)]
	pub extra: T,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use
	pub uri: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "postgres://root@localhost:5432/poetry_dev".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TlsConfig {
	/// The path to the TLS certificate
	pub cert: String,

	/// The path to the TLS private key
	pub key: String,
}

/// Command line flags shared by every binary. Anything an application adds
/// through [`ConfigExtention::Cli`] is merged over the file and environment.
#[derive(Debug, Parser)]
pub struct Cli<A: clap::Args> {
	/// The path to the config file, the extension may be omitted
	#[arg(long, env = "POETRY_CONFIG_FILE")]
	pub config_file: Option<String>,

	#[command(flatten)]
	pub extra: A,
}

pub trait ConfigExtention:
	serde::Serialize + serde::de::DeserializeOwned + Default + Clone + std::fmt::Debug + Send + Sync + 'static
{
	const APP_NAME: &'static str;

	/// Prefix for environment overrides, nested keys are split on `__`.
	const ENV_PREFIX: &'static str = "POETRY_";

	type Cli: clap::Args + serde::Serialize + std::fmt::Debug;

	fn config_default() -> AppConfig<Self> {
		AppConfig {
			name: Self::APP_NAME.to_owned(),
			config_file: Some("config".to_owned()),
			logging: Default::default(),
			database: Default::default(),
			extra: Self::default(),
		}
	}

	fn pre_hook(_config: &mut AppConfig<Self>) -> anyhow::Result<()> {
		Ok(())
	}
}

impl<T: ConfigExtention> Default for AppConfig<T> {
	fn default() -> Self {
		T::config_default()
	}
}

impl<T: ConfigExtention> AppConfig<T> {
	/// Builds the layered configuration: defaults, then the config file, then
	/// the environment, then command line flags. Also returns the config file
	/// that was loaded, if any.
	pub fn figment(cli: &Cli<T::Cli>) -> anyhow::Result<(Figment, Option<String>)> {
		let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
		let mut config_path = None;

		let explicit = cli.config_file.is_some();

		if let Some(requested) = cli.config_file.clone().or_else(|| Self::default().config_file) {
			match locate_config_file(&requested) {
				Some(path) => {
					figment = merge_config_file(figment, &path)?;
					config_path = Some(path.display().to_string());
				}
				None if explicit => anyhow::bail!("config file not found: {requested}"),
				None => tracing::debug!(path = %requested, "no config file found"),
			}
		}

		let figment = figment
			.merge(Env::prefixed(T::ENV_PREFIX).split("__").ignore(&["config_file"]))
			.merge(Serialized::defaults(&cli.extra));

		Ok((figment, config_path))
	}

	pub fn parse_from<I, S>(args: I) -> anyhow::Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<std::ffi::OsString> + Clone,
	{
		let cli = Cli::<T::Cli>::try_parse_from(args)?;
		let (figment, config_file) = Self::figment(&cli)?;

		let mut config: Self = figment.extract().context("failed to extract config")?;
		config.config_file = config_file;

		Ok(config)
	}
}

fn locate_config_file(requested: &str) -> Option<PathBuf> {
	let path = Path::new(requested);
	if path.is_file() {
		return Some(path.to_path_buf());
	}

	CONFIG_EXTENSIONS
		.iter()
		.map(|ext| PathBuf::from(format!("{requested}.{ext}")))
		.find(|path| path.is_file())
}

fn merge_config_file(figment: Figment, path: &Path) -> anyhow::Result<Figment> {
	Ok(match path.extension().and_then(|ext| ext.to_str()) {
		Some("toml") => figment.merge(Toml::file(path)),
		Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
		Some("json") => figment.merge(Json::file(path)),
		_ => anyhow::bail!("unsupported config file format: {}", path.display()),
	})
}

impl<T: ConfigExtention> Config for AppConfig<T> {
	fn logging(&self) -> &LoggingConfig {
		&self.logging
	}

	fn parse() -> anyhow::Result<Self>
	where
		Self: Sized,
	{
		Self::parse_from(std::env::args_os())
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn pre_hook(&mut self) -> anyhow::Result<()> {
		T::pre_hook(self)
	}
}
