use crate::error::ApiError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Header naming the user whose settings a request reads or writes.
pub const USER_HEADER: &str = "X-Application-User";

/// Builds the default headers every request carries.
///
/// The Application authenticates with a bearer token and scopes dataset
/// settings to the user named in [`USER_HEADER`].
pub fn default_headers(user: &str, token: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();

    if !token.is_empty() {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::InvalidConfig(format!("token is not a valid header value: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
    }

    let user_value = HeaderValue::from_str(user)
        .map_err(|e| ApiError::InvalidConfig(format!("user is not a valid header value: {e}")))?;
    headers.insert(USER_HEADER, user_value);

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_sent_as_sensitive_bearer() {
        let headers = default_headers("settings-user", "secret").unwrap();
        let auth = &headers[AUTHORIZATION];
        assert_eq!(auth.to_str().unwrap(), "Bearer secret");
        assert!(auth.is_sensitive());
        assert_eq!(headers[USER_HEADER], "settings-user");
    }

    #[test]
    fn empty_token_sends_no_authorization() {
        let headers = default_headers("settings-user", "").unwrap();
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn rejects_control_characters() {
        assert!(matches!(
            default_headers("bad\nuser", "t"),
            Err(ApiError::InvalidConfig(_))
        ));
    }
}
