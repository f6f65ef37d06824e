//! Defines functions for handling user authentication with cookies.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::Error;

use super::Token;

pub(crate) const COOKIE_TOKEN: &str = "auth_token";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Add the auth cookie holding `token` to the cookie jar.
///
/// The cookie expires at `token.expires_at`.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_auth_cookie(jar: PrivateCookieJar, token: &Token) -> Result<PrivateCookieJar, Error> {
    let token_string = serde_json::to_string(token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(token.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the token from the auth cookie.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no auth cookie.
/// - [Error::InvalidToken] if the cookie cannot be decoded or the token has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::InvalidToken(error.to_string()))?;

    if token.is_expired(OffsetDateTime::now_utc()) {
        return Err(Error::InvalidToken("the session has expired".to_owned()));
    }

    Ok(token)
}

/// Set the expiry of the auth cookie in `jar` to the latest of UTC now
/// plus `duration` and the token's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    mut token: Token,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidToken("the cookie expiry overflowed".to_owned()))?;

    token.expires_at = max(token.expires_at, new_expiry);

    set_auth_cookie(jar, &token)
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{Error, api::AccessToken, auth::Token, user::Role};

    use super::{
        COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed,
        get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn token(duration: Duration) -> Token {
        Token {
            user_id: "u-1".to_owned(),
            name: "Asha Rao".to_owned(),
            role: Role::Admin,
            access_token: AccessToken::new("access"),
            refresh_token: None,
            access_expires_at: OffsetDateTime::now_utc() + duration,
            expires_at: OffsetDateTime::now_utc() + duration,
        }
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_and_read_cookie() {
        let want = token(DEFAULT_COOKIE_DURATION);

        let jar = set_auth_cookie(get_jar(), &want).unwrap();
        let got = get_token_from_cookies(&jar).unwrap();

        assert_eq!(got, want);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        assert_date_time_close!(cookie.expires_datetime().unwrap(), want.expires_at);
    }

    #[test]
    fn missing_cookie() {
        assert_eq!(
            get_token_from_cookies(&get_jar()),
            Err(Error::CookieMissing)
        );
    }

    #[test]
    fn garbage_cookie_is_invalid() {
        let jar = get_jar().add(Cookie::build((COOKIE_TOKEN, "FOOBAR")));

        assert!(matches!(
            get_token_from_cookies(&jar),
            Err(Error::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_invalid() {
        let jar = set_auth_cookie(get_jar(), &token(Duration::seconds(-1))).unwrap();

        assert!(matches!(
            get_token_from_cookies(&jar),
            Err(Error::InvalidToken(_))
        ));
    }

    #[test]
    fn can_extend_cookie_duration() {
        let initial = token(Duration::minutes(5));
        let jar = set_auth_cookie(get_jar(), &initial).unwrap();

        let jar =
            extend_auth_cookie_duration_if_needed(jar, initial, Duration::minutes(10)).unwrap();

        let got = get_token_from_cookies(&jar).unwrap();
        assert_date_time_close!(got.expires_at, OffsetDateTime::now_utc() + Duration::minutes(10));
    }

    #[test]
    fn cookie_duration_does_not_shrink() {
        let initial = token(Duration::days(7));
        let want = initial.expires_at;
        let jar = set_auth_cookie(get_jar(), &initial).unwrap();

        let jar =
            extend_auth_cookie_duration_if_needed(jar, initial, Duration::minutes(5)).unwrap();

        assert_eq!(get_token_from_cookies(&jar).unwrap().expires_at, want);
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(get_jar(), &token(DEFAULT_COOKIE_DURATION)).unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert!(get_token_from_cookies(&jar).is_err());
    }
}
