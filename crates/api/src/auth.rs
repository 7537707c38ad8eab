//! Bearer-token authentication.
//!
//! A request carrying a valid HS256 token gets the write capability. A
//! missing or invalid token is not rejected here: the request proceeds as
//! read-only and the service refuses any mutation it attempts.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domain::Capability;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an access token. All are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Verifies bearer tokens against a shared secret.
#[derive(Clone)]
pub struct JwtAuth {
    inner: Arc<Keys>,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but not required.
        validation.required_spec_claims.clear();

        Self {
            inner: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                validation,
            }),
        }
    }

    /// Signs `claims` into a token this verifier accepts.
    pub fn issue(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.inner.encoding)
    }

    /// Decodes and checks a token.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
            .map(|data| data.claims)
    }

    /// Capability granted by the request's `Authorization` header.
    pub fn capability(&self, headers: &HeaderMap) -> Capability {
        let Some(token) = bearer_token(headers) else {
            return Capability::ReadOnly;
        };

        let authenticated = match self.verify(token) {
            Ok(claims) => {
                tracing::debug!(subject = ?claims.sub, "bearer token accepted");
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "bearer token rejected");
                metrics::counter!("api_token_rejections_total").increment(1);
                false
            }
        };

        Capability::from_authenticated(authenticated)
    }
}

impl std::fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth").finish_non_exhaustive()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The caller's capability, resolved from the request headers.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Capability);

impl<S> FromRequestParts<S> for Caller
where
    JwtAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = JwtAuth::from_ref(state);
        Ok(Caller(auth.capability(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_token_grants_write() {
        let auth = JwtAuth::new("secret");
        let token = auth.issue(&Claims::default()).unwrap();

        let capability = auth.capability(&headers_with(&format!("Bearer {token}")));

        assert_eq!(capability, Capability::Write);
    }

    #[test]
    fn test_missing_or_foreign_token_is_read_only() {
        let auth = JwtAuth::new("secret");
        let foreign = JwtAuth::new("other-secret")
            .issue(&Claims::default())
            .unwrap();

        assert_eq!(auth.capability(&HeaderMap::new()), Capability::ReadOnly);
        assert_eq!(
            auth.capability(&headers_with(&format!("Bearer {foreign}"))),
            Capability::ReadOnly
        );
        assert_eq!(
            auth.capability(&headers_with("Bearer not.a.token")),
            Capability::ReadOnly
        );
        assert_eq!(auth.capability(&headers_with("Basic abc")), Capability::ReadOnly);
    }

    #[test]
    fn test_expired_token_is_read_only() {
        let auth = JwtAuth::new("secret");
        let token = auth
            .issue(&Claims {
                sub: Some("tester".into()),
                exp: Some(1_000),
            })
            .unwrap();

        assert!(auth.verify(&token).is_err());
        assert_eq!(
            auth.capability(&headers_with(&format!("Bearer {token}"))),
            Capability::ReadOnly
        );
    }

    #[test]
    fn test_unexpired_token_grants_write() {
        let auth = JwtAuth::new("secret");
        let token = auth
            .issue(&Claims {
                sub: Some("tester".into()),
                exp: Some(4_102_444_800),
            })
            .unwrap();

        assert_eq!(
            auth.capability(&headers_with(&format!("bearer {token}"))),
            Capability::Write
        );
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let headers = headers_with("bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    }
}
