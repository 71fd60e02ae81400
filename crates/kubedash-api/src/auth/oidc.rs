//! OIDC ID token verification
//!
//! Tokens are verified against the issuer's JWKS, discovered through
//! `/.well-known/openid-configuration` and cached for the configured refresh
//! interval. Issuer, audience and expiry are checked by `jsonwebtoken`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::identity::{TokenClaims, TokenVerifier};
use crate::error::{Error, Result};

/// OIDC verifier configuration
#[derive(Clone, Debug)]
pub struct OidcConfig {
    /// OIDC issuer URL
    pub issuer_url: String,
    /// OIDC client ID
    pub client_id: String,
    /// Allowed audiences (the client ID when empty)
    pub audiences: Vec<String>,
    /// JWKS refresh interval
    pub jwks_refresh_interval: Duration,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            issuer_url: String::new(),
            client_id: String::new(),
            audiences: Vec::new(),
            jwks_refresh_interval: Duration::from_secs(3600),
        }
    }
}

impl OidcConfig {
    fn effective_audiences(&self) -> Vec<String> {
        if self.audiences.is_empty() {
            vec![self.client_id.clone()]
        } else {
            self.audiences.clone()
        }
    }
}

/// Minimum cache age before an unknown kid may force a JWKS refetch
const UNKNOWN_KID_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    last_refresh: Instant,
}

/// iss, aud and exp are validated during decode and not read here
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    email: Option<String>,
    name: Option<String>,
    preferred_username: Option<String>,
    #[serde(default)]
    groups: GroupsClaim,
}

/// Groups claim can be array or single string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
enum GroupsClaim {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl GroupsClaim {
    fn into_vec(self) -> Vec<String> {
        match self {
            GroupsClaim::None => vec![],
            GroupsClaim::Single(s) => vec![s],
            GroupsClaim::Multiple(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OidcDiscovery {
    issuer: String,
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Deserialize)]
struct JwkKey {
    kty: String,
    kid: Option<String>,
    n: Option<String>,
    e: Option<String>,
    crv: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

/// [`TokenVerifier`] for OIDC ID tokens
pub struct OidcVerifier {
    config: OidcConfig,
    jwks_cache: RwLock<Option<JwksCache>>,
    http_client: reqwest::Client,
}

impl OidcVerifier {
    /// Create a verifier for `config`
    pub fn new(config: OidcConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {}", e)))?;

        info!(
            issuer = %config.issuer_url,
            client_id = %config.client_id,
            "Configured OIDC token verification"
        );

        Ok(Self {
            config,
            jwks_cache: RwLock::new(None),
            http_client,
        })
    }

    /// Get the OIDC configuration
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    fn cached_key(&self, kid: Option<&str>) -> Option<DecodingKey> {
        let cache = self.jwks_cache.read();
        let cache = cache.as_ref()?;
        match kid {
            Some(kid) => cache.keys.get(kid).cloned(),
            None => cache.keys.values().next().cloned(),
        }
    }

    fn cache_age(&self) -> Option<Duration> {
        self.jwks_cache
            .read()
            .as_ref()
            .map(|c| c.last_refresh.elapsed())
    }

    /// Decoding key for `kid`, refreshing the JWKS when stale
    ///
    /// An unknown kid against a fresh cache triggers a refresh at most once
    /// per [`UNKNOWN_KID_REFRESH_INTERVAL`].
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey> {
        if let Some(age) = self.cache_age() {
            if age <= self.config.jwks_refresh_interval {
                if let Some(key) = self.cached_key(kid) {
                    return Ok(key);
                }
                if age < UNKNOWN_KID_REFRESH_INTERVAL {
                    debug!(kid = ?kid, "Unknown kid within refresh backoff");
                    return Err(no_matching_key(kid));
                }
            }
        }

        self.refresh_jwks().await?;

        self.cached_key(kid).ok_or_else(|| no_matching_key(kid))
    }

    async fn refresh_jwks(&self) -> Result<()> {
        let discovery_url = format!(
            "{}/.well-known/openid-configuration",
            self.config.issuer_url.trim_end_matches('/')
        );

        debug!(url = %discovery_url, "Fetching OIDC discovery document");

        let discovery: OidcDiscovery = self
            .http_client
            .get(&discovery_url)
            .send()
            .await
            .map_err(|e| Error::Internal(format!("failed to fetch OIDC discovery: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::Internal(format!("invalid OIDC discovery response: {}", e)))?;

        if discovery.issuer != self.config.issuer_url {
            return Err(Error::Internal(format!(
                "issuer mismatch: expected {}, got {}",
                self.config.issuer_url, discovery.issuer
            )));
        }

        debug!(url = %discovery.jwks_uri, "Fetching JWKS");

        let jwks: JwksDocument = self
            .http_client
            .get(&discovery.jwks_uri)
            .send()
            .await
            .map_err(|e| Error::Internal(format!("failed to fetch JWKS: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::Internal(format!("invalid JWKS response: {}", e)))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            if let Some(key) = jwk_to_decoding_key(&jwk)? {
                let kid = jwk.kid.unwrap_or_else(|| "default".to_string());
                keys.insert(kid, key);
            }
        }

        if keys.is_empty() {
            return Err(Error::Internal("no usable keys found in JWKS".into()));
        }

        info!(key_count = keys.len(), "Refreshed JWKS cache");

        *self.jwks_cache.write() = Some(JwksCache {
            keys,
            last_refresh: Instant::now(),
        });

        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for OidcVerifier {
    async fn verify(&self, token: &str) -> Result<TokenClaims> {
        if self.config.issuer_url.is_empty() {
            return Err(Error::Internal("OIDC not configured".into()));
        }

        let header = decode_header(token)?;
        let kid = header.kid.as_deref();
        debug!(kid = ?kid, alg = ?header.alg, "Decoded JWT header");

        let key = self.decoding_key(kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.config.issuer_url]);
        validation.set_audience(&self.config.effective_audiences());
        validation.validate_exp = true;

        let claims = decode::<IdTokenClaims>(token, &key, &validation)?.claims;
        claims_from_id_token(claims)
    }
}

fn no_matching_key(kid: Option<&str>) -> Error {
    Error::Unauthorized(format!("no matching key found in JWKS for kid: {:?}", kid))
}

fn claims_from_id_token(claims: IdTokenClaims) -> Result<TokenClaims> {
    let email = claims
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::Unauthorized("missing required claim: email".into()))?;

    Ok(TokenClaims {
        email,
        name: claims.name.or(claims.preferred_username),
        groups: claims.groups.into_vec(),
    })
}

fn jwk_to_decoding_key(jwk: &JwkKey) -> Result<Option<DecodingKey>> {
    let missing = |field: &str| Error::Internal(format!("{} key missing '{}'", jwk.kty, field));

    match jwk.kty.as_str() {
        "RSA" => {
            let n = jwk.n.as_ref().ok_or_else(|| missing("n"))?;
            let e = jwk.e.as_ref().ok_or_else(|| missing("e"))?;
            DecodingKey::from_rsa_components(n, e)
                .map(Some)
                .map_err(|e| Error::Internal(format!("invalid RSA key: {}", e)))
        }
        "EC" => {
            let crv = jwk.crv.as_ref().ok_or_else(|| missing("crv"))?;
            let x = jwk.x.as_ref().ok_or_else(|| missing("x"))?;
            let y = jwk.y.as_ref().ok_or_else(|| missing("y"))?;
            match crv.as_str() {
                "P-256" | "P-384" => DecodingKey::from_ec_components(x, y)
                    .map(Some)
                    .map_err(|e| Error::Internal(format!("invalid EC {} key: {}", crv, e))),
                _ => {
                    warn!(crv = %crv, "Unsupported EC curve");
                    Ok(None)
                }
            }
        }
        kty => {
            warn!(kty = %kty, "Unsupported key type");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_claim_variants() {
        assert!(GroupsClaim::None.into_vec().is_empty());
        assert_eq!(GroupsClaim::Single("ops".into()).into_vec(), vec!["ops"]);
        assert_eq!(
            GroupsClaim::Multiple(vec!["ops".into(), "dev".into()]).into_vec(),
            vec!["ops", "dev"]
        );
    }

    #[test]
    fn test_claims_require_email() {
        let claims: IdTokenClaims =
            serde_json::from_value(serde_json::json!({"sub": "123", "name": "Jane"})).unwrap();
        let err = claims_from_id_token(claims).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[test]
    fn test_claims_name_falls_back_to_preferred_username() {
        let claims: IdTokenClaims = serde_json::from_value(serde_json::json!({
            "email": "jane@example.com",
            "preferred_username": "jane",
            "groups": "ops"
        }))
        .unwrap();
        let claims = claims_from_id_token(claims).unwrap();
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.name.as_deref(), Some("jane"));
        assert_eq!(claims.groups, vec!["ops"]);
    }

    #[test]
    fn test_audiences_default_to_client_id() {
        let config = OidcConfig {
            client_id: "kubedash".into(),
            ..Default::default()
        };
        assert_eq!(config.effective_audiences(), vec!["kubedash"]);
    }

    #[test]
    fn test_unsupported_key_type_is_skipped() {
        let jwk = JwkKey {
            kty: "oct".into(),
            kid: None,
            n: None,
            e: None,
            crv: None,
            x: None,
            y: None,
        };
        assert!(jwk_to_decoding_key(&jwk).unwrap().is_none());
    }

    fn verifier_with_cached_key(age: Duration) -> OidcVerifier {
        // Unroutable issuer: any refetch attempt fails with an internal error
        let verifier = OidcVerifier::new(OidcConfig {
            issuer_url: "http://127.0.0.1:1".into(),
            client_id: "kubedash".into(),
            ..Default::default()
        })
        .unwrap();
        let mut keys = HashMap::new();
        keys.insert("known".to_string(), DecodingKey::from_secret(b"secret"));
        *verifier.jwks_cache.write() = Some(JwksCache {
            keys,
            last_refresh: Instant::now() - age,
        });
        verifier
    }

    #[tokio::test]
    async fn test_known_kid_served_from_cache() {
        let verifier = verifier_with_cached_key(Duration::ZERO);
        assert!(verifier.decoding_key(Some("known")).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_kid_does_not_refetch_within_backoff() {
        let verifier = verifier_with_cached_key(Duration::from_secs(1));
        for kid in ["garbage-1", "garbage-2"] {
            let err = verifier.decoding_key(Some(kid)).await.err().expect("expected error");
            assert!(matches!(err, Error::Unauthorized(_)), "got {err:?}");
        }
        assert!(verifier.cache_age().unwrap() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_unknown_kid_refetches_after_backoff() {
        let verifier = verifier_with_cached_key(UNKNOWN_KID_REFRESH_INTERVAL + Duration::from_secs(1));
        let err = verifier.decoding_key(Some("rotated")).await.err().expect("expected error");
        assert!(matches!(err, Error::Internal(m) if m.contains("OIDC discovery")));
    }

    #[tokio::test]
    async fn test_verify_without_issuer() {
        let verifier = OidcVerifier::new(OidcConfig::default()).unwrap();
        let err = verifier.verify("some-token").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
