//! Defines the `User` type, the only entity that does not belong to another
//! user. Passwords are stored as bcrypt hashes and never serialized into API
//! responses; see [UserProfile].

use serde::{Deserialize, Serialize};

use crate::{
    models::{RecordId, Timestamp},
    stores::Record,
};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub name: String,
    /// Unique across all users.
    pub email: String,
    /// The bcrypt hash of the user's password.
    pub password: String,
    /// A free-text savings goal shown on the overview page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// The fields needed to create a [User].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl Record for User {
    type Draft = NewUser;

    const COLLECTION: &'static str = "users";
    const FIELDS: &'static [&'static str] = &["name", "email", "password", "goal"];

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// The client-facing view of a [User], without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            name: user.name,
            email: user.email,
            goal: user.goal,
        }
    }
}

#[cfg(test)]
mod user_tests {
    use super::{User, UserProfile};

    fn test_user() -> User {
        User {
            id: "user-1".to_string(),
            created_at: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            goal: Some("Save for a bicycle".to_string()),
        }
    }

    #[test]
    fn profile_drops_the_password_hash() {
        let profile = UserProfile::from(test_user());

        let json = serde_json::to_string(&profile).unwrap();

        assert!(!json.contains("password"));
        assert!(json.contains("ada@example.com"));
    }

    #[test]
    fn missing_goal_is_omitted_from_json() {
        let user = User {
            goal: None,
            ..test_user()
        };

        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("goal").is_none());
    }
}
