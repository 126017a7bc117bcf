use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use std::convert::Infallible;

// -- Session Identity

/// The caller's session token, read from the `session_id` cookie.
///
/// Absence of the cookie is not a rejection: session-scoped telemetry
/// simply has nothing to key on, while aggregate counters still update.
pub struct SessionId(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let session = parts
            .headers
            .get("cookie")
            .and_then(|value| value.to_str().ok())
            .and_then(session_from_cookie_header);

        Ok(SessionId(session))
    }
}

fn session_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == "session_id" && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}
