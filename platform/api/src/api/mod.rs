use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use binary_helper::global::RequestGlobalExt;
use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tokio::net::TcpSocket;
use tokio::select;
use utils::http::router::middleware::{CorsMiddleware, CorsOptions, ResponseHeadersMiddleware};
use utils::http::router::{Router, RouterError};
use utils::http::{error_handler, json_response, RouteError};
use utils::prelude::FutureTimeout;

use self::error::ApiError;
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub mod auth;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod request_context;
pub mod v1;

pub use utils::http::Body;

/// The global state the router was built with.
pub(crate) fn request_global<G: ApiGlobal, I>(req: &Request<I>) -> error::Result<Arc<G>> {
	req.get_global::<G, ApiError>()
}

/// A request body the API can read, [`Incoming`] when serving and any
/// in-memory body in tests.
pub trait RequestBody: Send + Sized + 'static {
	fn read_limited(self, limit: usize) -> impl std::future::Future<Output = Result<Bytes, ApiError>> + Send;
}

impl<B> RequestBody for B
where
	B: hyper::body::Body<Data = Bytes> + Send + 'static,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
	async fn read_limited(self, limit: usize) -> Result<Bytes, ApiError> {
		match Limited::new(self, limit).collect().await {
			Ok(collected) => Ok(collected.to_bytes()),
			Err(err) if err.is::<http_body_util::LengthLimitError>() => Err(ApiError::PayloadTooLarge),
			Err(err) => Err(ApiError::BadRequest(format!("failed to read body: {err}"))),
		}
	}
}

pub fn cors_options(config: &ApiConfig) -> CorsOptions {
	CorsOptions {
		allow_origins: config.cors.allow_origins.clone(),
		allow_methods: ["GET", "POST", "PATCH", "DELETE", "OPTIONS"].map(String::from).to_vec(),
		allow_headers: ["Content-Type", "Authorization"].map(String::from).to_vec(),
		max_age_seconds: Some(3600),
	}
}

async fn not_found<I>(_: Request<I>) -> error::Result<Response<Body>> {
	Ok(json_response(
		StatusCode::NOT_FOUND,
		json!({
			"message": "not found",
			"success": false,
		}),
	))
}

pub fn routes<G: ApiGlobal, I: RequestBody>(global: &Arc<G>) -> anyhow::Result<Router<I, RouteError<ApiError>>> {
	let weak = Arc::downgrade(global);

	let cors = CorsMiddleware::new(&cors_options(global.config::<ApiConfig>())).context("invalid cors config")?;

	Ok(Router::builder()
		.data(weak)
		// Lets handlers add headers to the response, even to error responses.
		.middleware(ResponseHeadersMiddleware)
		.middleware(cors)
		// Records who is calling, never rejects the request by itself.
		.middleware(middleware::auth::auth_middleware(global))
		.scope("/v1", v1::routes(global))
		.scope("/poems", v1::poems::routes(global))
		.error_handler(error_handler::<ApiError>)
		// Also the route CORS preflights reach.
		.not_found(not_found::<I>)
		.build())
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("Listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	let tls_acceptor = if let Some(tls) = &config.tls {
		tracing::info!("TLS enabled");
		let cert = tokio::fs::read(&tls.cert).await.context("failed to read api ssl cert")?;
		let key = tokio::fs::read(&tls.key).await.context("failed to read api ssl private key")?;

		let key = rustls_pemfile::pkcs8_private_keys(&mut io::BufReader::new(io::Cursor::new(key)))
			.next()
			.ok_or_else(|| anyhow::anyhow!("failed to find private key in api private key file"))??
			.into();

		let certs = rustls_pemfile::certs(&mut io::BufReader::new(io::Cursor::new(cert))).collect::<Result<Vec<_>, _>>()?;

		Some(Arc::new(tokio_rustls::TlsAcceptor::from(Arc::new(
			rustls::ServerConfig::builder()
				.with_no_client_auth()
				.with_single_cert(certs, key)?,
		))))
	} else {
		None
	};

	// Connections only see the global state through the router's Weak
	// reference, so an idle keep-alive connection cannot hold up shutdown.
	let router = Arc::new(routes::<G, Incoming>(&global)?);
	let service = service_fn(move |req| {
		let this = router.clone();
		async move {
			Ok::<_, Infallible>(match this.handle(req).await {
				Ok(resp) => resp,
				Err(RouterError::Unhandled(err)) => err.response(),
				Err(RouterError::NotFound) => RouteError::<ApiError>::from(ApiError::NotFound).response(),
			})
		}
	});

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let service = service.clone();
				let tls_acceptor = tls_acceptor.clone();

				tracing::debug!("Accepted connection from {}", addr);

				tokio::spawn(async move {
					let http = http1::Builder::new();

					if let Some(tls_acceptor) = tls_acceptor {
						let Ok(Ok(socket)) = tls_acceptor.accept(socket).timeout(Duration::from_secs(5)).await else {
							return;
						};
						tracing::debug!("TLS handshake complete");
						http.serve_connection(TokioIo::new(socket), service).await.ok();
					} else {
						http.serve_connection(TokioIo::new(socket), service).await.ok();
					}
				});
			},
		}
	}
}
