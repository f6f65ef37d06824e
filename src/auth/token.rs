//! Defines the token stored in the auth cookie.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    api::{AccessToken, AuthSession},
    user::{Role, UserId},
};

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the cookie expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// How long an access token is assumed to last when the backend does not say.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::minutes(15);

/// The expiry of an access token issued now that lasts `expires_in` seconds.
pub(crate) fn access_expiry(expires_in: Option<i64>, now: OffsetDateTime) -> OffsetDateTime {
    let lifetime = expires_in
        .map(Duration::seconds)
        .unwrap_or(DEFAULT_ACCESS_TOKEN_LIFETIME);

    now.checked_add(lifetime).unwrap_or(now)
}

/// The session details kept in the encrypted auth cookie.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub user_id: UserId,
    /// Shown in the navigation bar.
    pub name: String,
    pub role: Role,
    pub access_token: AccessToken,
    pub refresh_token: Option<String>,

    /// When the backend stops accepting `access_token`.
    #[serde(with = "datetime_format")]
    pub access_expires_at: OffsetDateTime,

    /// When the session ends. Activity pushes this back.
    #[serde(with = "datetime_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// The token for a fresh log in, valid for `duration` from now.
    pub fn new(session: &AuthSession, duration: Duration) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            user_id: session.user.id.clone(),
            name: session.user.name.clone(),
            role: session.user.role,
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            access_expires_at: access_expiry(session.expires_in, now),
            expires_at: now + duration,
        }
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("access_token", &self.access_token)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("access_expires_at", &self.access_expires_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, UtcOffset, macros::datetime};

    use crate::{api::AccessToken, user::Role};

    use super::{DEFAULT_ACCESS_TOKEN_LIFETIME, Token, access_expiry};

    fn token_expiring_at(expires_at: time::OffsetDateTime) -> Token {
        Token {
            user_id: "u-1".to_owned(),
            name: "Asha Rao".to_owned(),
            role: Role::User,
            access_token: AccessToken::new("access"),
            refresh_token: Some("refresh".to_owned()),
            access_expires_at: expires_at,
            expires_at,
        }
    }

    #[test]
    fn serialise_token() {
        let expires_at = datetime!(2025-12-21 03:54:00).assume_offset(UtcOffset::UTC);
        let expected = r#"{"user_id":"u-1","name":"Asha Rao","role":"USER","access_token":"access","refresh_token":"refresh","access_expires_at":"2025-12-21 03:54:00.0 +00:00:00","expires_at":"2025-12-21 03:54:00.0 +00:00:00"}"#;

        let actual = serde_json::to_string(&token_expiring_at(expires_at)).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn deserialise_token_with_midnight_expiry() {
        let expires_at = datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC);
        let token_string = r#"{"user_id":"u-1","name":"Asha Rao","role":"USER","access_token":"access","refresh_token":"refresh","access_expires_at":"2025-12-21 00:00:00.0 +00:00:00","expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

        let actual: Token = serde_json::from_str(token_string).unwrap();

        assert_eq!(token_expiring_at(expires_at), actual);
    }

    #[test]
    fn debug_hides_secrets() {
        let token = token_expiring_at(datetime!(2025-12-21 00:00 UTC));

        let debug = format!("{token:?}");

        assert!(!debug.contains("access\""));
        assert!(!debug.contains("\"refresh\""));
    }

    #[test]
    fn access_expiry_follows_backend_lifetime() {
        let now = datetime!(2025-12-21 00:00 UTC);

        assert_eq!(access_expiry(Some(600), now), now + Duration::minutes(10));
        assert_eq!(
            access_expiry(None, now),
            now + DEFAULT_ACCESS_TOKEN_LIFETIME
        );
    }

    #[test]
    fn expiry_is_inclusive() {
        let expires_at = datetime!(2025-12-21 00:00 UTC);
        let token = token_expiring_at(expires_at);

        assert!(token.is_expired(expires_at));
        assert!(!token.is_expired(expires_at - Duration::seconds(1)));
    }
}
