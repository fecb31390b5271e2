use axum::http::HeaderMap;

use super::domain::UserId;

/// Header carrying the caller id resolved upstream by the authentication layer.
pub const CALLER_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("missing x-user-id header")]
    Missing,
    #[error("x-user-id header is not a valid user id")]
    Malformed,
}

pub fn optional_caller(headers: &HeaderMap) -> Result<Option<UserId>, IdentityError> {
    let Some(value) = headers.get(CALLER_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(|id| Some(UserId(id)))
        .ok_or(IdentityError::Malformed)
}

pub fn resolve_caller(headers: &HeaderMap) -> Result<UserId, IdentityError> {
    optional_caller(headers)?.ok_or(IdentityError::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn resolves_numeric_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CALLER_HEADER, HeaderValue::from_static(" 42 "));
        assert_eq!(resolve_caller(&headers), Ok(UserId(42)));
    }

    #[test]
    fn distinguishes_missing_from_malformed() {
        let mut headers = HeaderMap::new();
        assert_eq!(resolve_caller(&headers), Err(IdentityError::Missing));
        assert_eq!(optional_caller(&headers), Ok(None));

        headers.insert(CALLER_HEADER, HeaderValue::from_static("bearer abc"));
        assert_eq!(resolve_caller(&headers), Err(IdentityError::Malformed));
    }
}
