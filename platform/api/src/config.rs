use std::net::SocketAddr;

use binary_helper::config::TlsConfig;
use ulid::Ulid;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// The poem service's additions to the shared app config
pub struct ApiExtension {
	/// API Config
	pub api: ApiConfig,

	/// JWT Config
	pub jwt: JwtConfig,

	/// Which store backs the poems
	pub store: StoreKind,

	/// If set, a token for this user id is printed to stdout and the program
	/// exits
	pub issue_token: Option<Ulid>,
}

#[derive(Debug, clap::Args, serde::Serialize)]
pub struct ApiCli {
	/// Print a bearer token for the given user id and exit
	#[arg(long)]
	#[serde(skip_serializing_if = "Option::is_none")]
	pub issue_token: Option<Ulid>,
}

impl binary_helper::config::ConfigExtention for ApiExtension {
	type Cli = ApiCli;

	const APP_NAME: &'static str = "poetry-api";
}

pub type AppConfig = binary_helper::config::AppConfig<ApiExtension>;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,

	/// If we should use TLS for the API server
	pub tls: Option<TlsConfig>,

	/// The largest request body we accept, in bytes
	pub max_body_size: usize,

	/// CORS settings
	pub cors: CorsConfig,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from(([0, 0, 0, 0, 0, 0, 0, 0], 4000)),
			tls: None,
			max_body_size: 64 * 1024,
			cors: CorsConfig::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CorsConfig {
	/// Origins allowed to call the API, `*` allows any
	pub allow_origins: Vec<String>,
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allow_origins: vec!["*".to_string()],
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JwtConfig {
	/// JWT secret
	pub secret: String,

	/// JWT issuer
	pub issuer: String,

	/// How long issued tokens stay valid, in seconds
	pub token_ttl: u64,
}

impl Default for JwtConfig {
	fn default() -> Self {
		Self {
			issuer: "poetry".to_string(),
			secret: "poetry".to_string(),
			token_ttl: 7 * 24 * 60 * 60,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
	#[default]
	Postgres,
	Memory,
}
