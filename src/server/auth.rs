//! API-key middleware guarding `/api/*`.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use super::error::HttpError;
use super::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Key from `X-API-Key`, falling back to `Authorization: Bearer <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return Some(key);
    }

    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = auth.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(expected) = state.settings.api_key.as_deref() else {
        return Err(HttpError::Internal(
            "Server misconfiguration: API_KEY not set".to_string(),
        ));
    };

    if extract_api_key(req.headers()) == Some(expected) {
        return Ok(next.run(req).await);
    }

    tracing::warn!(
        path = %req.uri().path(),
        "Unauthorized API request - missing or invalid key"
    );
    Err(HttpError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn reads_x_api_key() {
        assert_eq!(extract_api_key(&headers(&[("x-api-key", "k1")])), Some("k1"));
    }

    #[test]
    fn reads_bearer_case_insensitively() {
        assert_eq!(
            extract_api_key(&headers(&[("authorization", "bearer k2")])),
            Some("k2")
        );
        assert_eq!(
            extract_api_key(&headers(&[("authorization", "Bearer k3")])),
            Some("k3")
        );
    }

    #[test]
    fn header_wins_over_bearer() {
        let h = headers(&[("x-api-key", "a"), ("authorization", "Bearer b")]);
        assert_eq!(extract_api_key(&h), Some("a"));
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(extract_api_key(&headers(&[("authorization", "Basic abc")])), None);
        assert_eq!(extract_api_key(&headers(&[("authorization", "Bearer")])), None);
        assert_eq!(extract_api_key(&HeaderMap::new()), None);
    }
}
