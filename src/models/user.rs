use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(
        default,
        alias = "_id",
        deserialize_with = "wire::opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub username: String,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}

/// Bearer token plus the profile it was issued for.
///
/// Library code never looks this up on its own; callers load it and pass it
/// to whatever needs to authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

/// Login/register response. Backends disagree on whether the profile is
/// nested under `user` or sits next to the token.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AuthResponse {
    Nested {
        token: String,
        user: UserProfile,
    },
    Flat {
        token: String,
        #[serde(flatten)]
        user: UserProfile,
    },
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        match response {
            AuthResponse::Nested { token, user } | AuthResponse::Flat { token, user } => {
                Session::new(token, user)
            }
        }
    }
}
