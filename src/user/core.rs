use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::listing::Searchable;

/// The backend's identifier for a user.
pub type UserId = String;

/// What a user is allowed to do in the portal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    #[serde(alias = "user")]
    User,
    #[serde(alias = "admin")]
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("User"),
            Self::Admin => f.write_str("Admin"),
        }
    }
}

/// A registered user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_portal_access: bool,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_phone_verified: bool,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl User {
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.id.as_str(), self.name.as_str(), self.email.as_str()];

        if let Some(phone_number) = &self.phone_number {
            fields.push(phone_number);
        }

        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.role.as_query_value())
    }
}

/// The summary of a user embedded in requests and transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// The profile fields a user can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// An admin's decision on a user's portal access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalAccessDecision {
    Approve,
    Deny,
}

impl PortalAccessDecision {
    pub fn grants_access(self) -> bool {
        self == PortalAccessDecision::Approve
    }

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Deny => "deny",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim() {
            "approve" => Some(Self::Approve),
            "deny" => Some(Self::Deny),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::listing::ListFilter;

    use super::{Role, User};

    #[test]
    fn deserializes_backend_user() {
        let json = r#"{
            "id": "u-1",
            "email": "asha@example.com",
            "name": "Asha Rao",
            "phoneNumber": "+91 98765 43210",
            "role": "USER",
            "isPortalAccess": false,
            "isEmailVerified": true,
            "isPhoneVerified": false,
            "createdAt": "2025-03-01T10:00:00Z"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.role, Role::User);
        assert!(user.is_email_verified);
        assert!(!user.is_portal_access);
        assert!(user.created_at.is_some());
    }

    #[test]
    fn missing_flags_default_to_false() {
        let user: User =
            serde_json::from_str(r#"{"id":"u-2","email":"a@b.c","name":"A"}"#).unwrap();

        assert_eq!(user.role, Role::User);
        assert!(!user.is_portal_access);
        assert!(user.phone_number.is_none());
    }

    #[test]
    fn search_matches_email() {
        let user: User =
            serde_json::from_str(r#"{"id":"u-2","email":"Ravi@Example.com","name":"Ravi"}"#)
                .unwrap();

        assert!(ListFilter::new("ravi@", "").matches(&user));
        assert!(!ListFilter::new("ravi@", "ADMIN").matches(&user));
    }
}
