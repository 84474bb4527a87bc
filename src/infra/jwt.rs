//! Bearer token verification.
//!
//! A [`JwtDecoder`] turns a raw token into verified claims. Production
//! deployments verify against the identity provider's published keys
//! ([`JwksDecoder`]); local setups can use a shared HS256 secret
//! ([`SecretDecoder`]).

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header,
    jwk::{Jwk, JwkSet},
    Algorithm, DecodingKey, Validation,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::domain::Claims;
use crate::errors::{AppError, AppResult};

#[async_trait]
pub trait JwtDecoder: Send + Sync {
    /// Verify signature and standard claims, returning the claim set.
    async fn decode(&self, token: &str) -> AppResult<Claims>;
}

/// Pick the decoder for the configured verification source.
pub fn decoder_from_config(config: &Config) -> AppResult<Arc<dyn JwtDecoder>> {
    if let Some(issuer) = &config.jwt_issuer_uri {
        tracing::info!(issuer = %issuer, "Verifying bearer tokens against issuer keys");
        return Ok(Arc::new(JwksDecoder::new(issuer.clone())));
    }
    if let Some(secret) = config.jwt_secret_bytes() {
        tracing::warn!("Verifying bearer tokens with a shared secret");
        return Ok(Arc::new(SecretDecoder::new(secret)));
    }
    Err(AppError::internal("no JWT verification source configured"))
}

/// HS256 shared-secret decoder.
pub struct SecretDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl SecretDecoder {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl JwtDecoder for SecretDecoder {
    async fn decode(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Subset of the OpenID provider metadata document.
#[derive(Debug, Deserialize)]
struct ProviderMetadata {
    jwks_uri: String,
}

/// Decoder backed by the issuer's JWK set.
///
/// The key set is discovered through
/// `<issuer>/.well-known/openid-configuration` on first use and cached. A
/// token signed with an unknown `kid` triggers one refresh.
pub struct JwksDecoder {
    issuer: String,
    http: reqwest::Client,
    keys: RwLock<Option<JwkSet>>,
}

impl JwksDecoder {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            http: reqwest::Client::new(),
            keys: RwLock::new(None),
        }
    }

    fn discovery_url(&self) -> String {
        format!(
            "{}/.well-known/openid-configuration",
            self.issuer.trim_end_matches('/')
        )
    }

    async fn fetch_keys(&self) -> AppResult<JwkSet> {
        let metadata: ProviderMetadata = self
            .http
            .get(self.discovery_url())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::internal(format!("OIDC discovery failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Invalid OIDC metadata: {}", e)))?;

        self.http
            .get(&metadata.jwks_uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::internal(format!("JWKS fetch failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Invalid JWKS document: {}", e)))
    }

    async fn cached_key(&self, kid: &str) -> Option<Jwk> {
        self.keys.read().await.as_ref()?.find(kid).cloned()
    }

    async fn key_for(&self, kid: &str) -> AppResult<Jwk> {
        if let Some(jwk) = self.cached_key(kid).await {
            return Ok(jwk);
        }

        let fresh = self.fetch_keys().await?;
        let found = fresh.find(kid).cloned();
        *self.keys.write().await = Some(fresh);
        tracing::debug!(kid = %kid, "Refreshed issuer key set");

        found.ok_or(AppError::Unauthorized)
    }
}

#[async_trait]
impl JwtDecoder for JwksDecoder {
    async fn decode(&self, token: &str) -> AppResult<Claims> {
        let header = decode_header(token)?;
        if matches!(header.alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AppError::Unauthorized);
        }
        let kid = header.kid.ok_or(AppError::Unauthorized)?;

        let jwk = self.key_for(&kid).await.map_err(|e| match e {
            AppError::Internal(detail) => {
                tracing::warn!("Signing key lookup failed: {}", detail);
                AppError::Unauthorized
            }
            other => other,
        })?;
        let key = DecodingKey::from_jwk(&jwk)?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_aud = false;

        let data = decode::<Claims>(token, &key, &validation)?;
        Ok(data.claims)
    }
}
