use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    User,
    Vendor,
    Admin,
}

/// Signed-in user, persisted in the client store.
///
/// Replaces the `user` local-storage key. The bearer token is held as a
/// secret; it is only exposed when installed on the HTTP client and when
/// written to the state file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(serialize_with = "expose_token", deserialize_with = "read_token")]
    pub token: SecretString,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

fn expose_token<S: serde::Serializer>(token: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    use secrecy::ExposeSecret;
    s.serialize_str(token.expose_secret())
}

fn read_token<'de, D: serde::Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
    String::deserialize(d).map(SecretString::from)
}
