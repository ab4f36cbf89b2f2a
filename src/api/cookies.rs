//! Cookie framing for grants: transport adapter only, no lifecycle logic.
//!
//! Three cookies travel together: the access token (short `Max-Age`), the
//! refresh tag, and the session handle (both living as long as the session).
//! `sessid` is readable by frontend script on purpose; the other two are
//! `HttpOnly`.

use axum::http::{HeaderMap, HeaderValue, header::InvalidHeaderValue, header::SET_COOKIE};

use crate::auth::{AuthConfig, Grant};

pub(crate) const TOKEN_COOKIE: &str = "token";
pub(crate) const REFRESH_COOKIE: &str = "refresh";
pub(crate) const SESSION_COOKIE: &str = "sessid";

fn cookie(
    config: &AuthConfig,
    name: &str,
    value: &str,
    max_age: i64,
    http_only: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{name}={value}; Path=/; Domain={}; SameSite=Lax; Max-Age={max_age}",
        config.cookie_domain()
    );
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Bake the three credential cookies for a fresh grant.
pub(crate) fn grant_cookies(
    config: &AuthConfig,
    grant: &Grant,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        cookie(
            config,
            TOKEN_COOKIE,
            &grant.access_token,
            config.jwt_ttl_seconds(),
            true,
        )?,
    );
    headers.append(
        SET_COOKIE,
        cookie(
            config,
            REFRESH_COOKIE,
            &grant.refresh_tag,
            config.session_ttl_seconds(),
            true,
        )?,
    );
    headers.append(
        SET_COOKIE,
        cookie(
            config,
            SESSION_COOKIE,
            &grant.session_id.to_string(),
            config.session_ttl_seconds(),
            false,
        )?,
    );
    Ok(headers)
}

/// Expire all three credential cookies.
pub(crate) fn clear_cookies(config: &AuthConfig) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    for (name, http_only) in [
        (TOKEN_COOKIE, true),
        (REFRESH_COOKIE, true),
        (SESSION_COOKIE, false),
    ] {
        headers.append(SET_COOKIE, cookie(config, name, "", 0, http_only)?);
    }
    Ok(headers)
}
