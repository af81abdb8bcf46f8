//! HTTP Basic authentication extractor
//!
//! Every tenant-scoped route takes an [`AuthenticatedProvider`] argument;
//! the extractor verifies the `Authorization: Basic` credentials against the
//! stored bcrypt hash on each request. There are no sessions or tokens to
//! issue or revoke.

use crate::core::AccountService;
use crate::domain::{CarebaseError, Provider, ProviderScope};
use crate::http::error::ApiError;
use crate::http::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// The provider authenticated for the current request
pub struct AuthenticatedProvider {
    /// The authenticated provider entity
    pub provider: Provider,
}

impl AuthenticatedProvider {
    /// Scope for store and service calls on behalf of this provider
    pub fn scope(&self) -> ProviderScope {
        ProviderScope::new(self.provider.id)
    }
}

/// Parse a Basic authorization header value into username and password
fn parse_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

async fn authenticate(
    accounts: &AccountService,
    parts: &Parts,
) -> Result<AuthenticatedProvider, CarebaseError> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            CarebaseError::Authentication("missing authorization header".to_string())
        })?;

    let (username, password) = parse_basic(header_value).ok_or_else(|| {
        CarebaseError::Authentication("malformed authorization header".to_string())
    })?;

    let provider = accounts.authenticate(&username, &password).await?;
    Ok(AuthenticatedProvider { provider })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedProvider {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&state.accounts, parts).await.map_err(ApiError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        // "drsmith:correct horse"
        let (username, password) =
            parse_basic("Basic ZHJzbWl0aDpjb3JyZWN0IGhvcnNl").unwrap();
        assert_eq!(username, "drsmith");
        assert_eq!(password, "correct horse");
    }

    #[test]
    fn test_parse_basic_keeps_colons_in_password() {
        let encoded = BASE64.encode("user:pass:word");
        let (username, password) = parse_basic(&format!("Basic {encoded}")).unwrap();
        assert_eq!(username, "user");
        assert_eq!(password, "pass:word");
    }

    #[test]
    fn test_parse_basic_rejects_other_schemes() {
        assert!(parse_basic("Bearer abcdef").is_none());
    }

    #[test]
    fn test_parse_basic_rejects_garbage() {
        assert!(parse_basic("Basic not-base64!!").is_none());
    }
}
