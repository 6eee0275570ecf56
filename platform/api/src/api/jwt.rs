use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;
use ulid::Ulid;

use crate::config::JwtConfig;
use crate::global::ApiGlobal;

pub struct AuthJwtPayload {
	pub user_id: Ulid,
	pub expiration: Option<DateTime<Utc>>,
	pub issued_at: DateTime<Utc>,
	pub not_before: Option<DateTime<Utc>>,
	pub audience: Option<String>,
}

impl AuthJwtPayload {
	/// A payload for `user_id` issued now and valid for the configured ttl.
	pub fn new(config: &JwtConfig, user_id: Ulid) -> Self {
		let issued_at = Utc::now();

		Self {
			user_id,
			expiration: Some(issued_at + Duration::seconds(config.token_ttl as i64)),
			issued_at,
			not_before: None,
			audience: None,
		}
	}

	pub fn serialize<G: ApiGlobal>(&self, global: &Arc<G>) -> Option<String> {
		self.sign(global.config::<JwtConfig>())
	}

	pub fn sign(&self, config: &JwtConfig) -> Option<String> {
		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let mut claims = self.to_claims();

		claims.registered.issuer = Some(config.issuer.clone());

		claims.sign_with_key(&key).ok()
	}

	pub fn verify<G: ApiGlobal>(global: &Arc<G>, token: &str) -> Option<Self> {
		Self::verify_with(global.config::<JwtConfig>(), token)
	}

	pub fn verify_with(config: &JwtConfig, token: &str) -> Option<Self> {
		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let token: Token<Header, Claims, _> = token.verify_with_key(&key).ok()?;

		let claims = token.claims();

		if claims.registered.issuer.as_ref() != Some(&config.issuer) {
			return None;
		}

		let now = Utc::now();

		let iat = timestamp(claims.registered.issued_at?)?;
		if iat > now {
			return None;
		}

		if let Some(nbf) = claims.registered.not_before.and_then(timestamp) {
			if nbf > now {
				return None;
			}
		}

		if let Some(exp) = claims.registered.expiration.and_then(timestamp) {
			if exp < now {
				return None;
			}
		}

		Self::from_claims(claims)
	}

	fn to_claims(&self) -> Claims {
		Claims::new(RegisteredClaims {
			issuer: None,
			subject: Some(self.user_id.to_string()),
			audience: self.audience.clone(),
			expiration: self.expiration.map(|x| x.timestamp() as u64),
			not_before: self.not_before.map(|x| x.timestamp() as u64),
			issued_at: Some(self.issued_at.timestamp() as u64),
			json_web_token_id: None,
		})
	}

	fn from_claims(claims: &Claims) -> Option<Self> {
		Some(Self {
			audience: claims.registered.audience.clone(),
			expiration: claims.registered.expiration.and_then(timestamp),
			issued_at: timestamp(claims.registered.issued_at?)?,
			not_before: claims.registered.not_before.and_then(timestamp),
			user_id: claims.registered.subject.as_ref().and_then(|x| Ulid::from_string(x).ok())?,
		})
	}
}

fn timestamp(seconds: u64) -> Option<DateTime<Utc>> {
	Utc.timestamp_opt(seconds as i64, 0).single()
}
