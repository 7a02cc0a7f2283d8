use std::fmt;

use eoex_core::AuthToken;
use eoex_core::Identity;
use eoex_core::Role;
use eoex_core::UserDirectory;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserPayload,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// User record returned by the backend. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserPayload {
    #[serde(default, deserialize_with = "opt_id")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub tenant_id: Option<String>,
    pub email: String,
    pub role: Role,
}

impl UserPayload {
    /// Builds the shell identity. The display label comes from the demo
    /// directory when the account is known, else from the email local part.
    pub fn into_identity(self, directory: &UserDirectory) -> Identity {
        let label = directory
            .find_by_email(&self.email)
            .map(|entry| entry.label.clone())
            .unwrap_or_else(|| {
                self.email
                    .split('@')
                    .next()
                    .unwrap_or(&self.email)
                    .to_string()
            });
        Identity {
            label,
            email: self.email,
            role: self.role,
            user_id: self.user_id,
            tenant_id: self.tenant_id,
        }
    }
}

impl LoginResponse {
    pub fn into_session(self, directory: &UserDirectory) -> (Identity, AuthToken) {
        (
            self.user.into_identity(directory),
            AuthToken::new(self.access_token),
        )
    }
}

/// Accepts identifiers serialized either as strings (UUIDs) or integers.
fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("crm.manager@eoex.com", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("crm.manager@eoex.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn known_account_uses_directory_label() {
        let response: LoginResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "token_type": "bearer",
            "user": {
                "user_id": "4f1c",
                "tenant_id": 7,
                "email": "HR.Manager@eoex.com",
                "role": "erp_hr_manager",
                "is_active": true
            }
        }))
        .unwrap();

        let (identity, token) = response.into_session(&UserDirectory::default());
        assert_eq!(identity.label, "HR Manager");
        assert_eq!(identity.role, Role::from("erp_hr_manager"));
        assert_eq!(identity.user_id.as_deref(), Some("4f1c"));
        assert_eq!(identity.tenant_id.as_deref(), Some("7"));
        assert_eq!(token.as_str(), "abc");
    }

    #[test]
    fn unknown_account_uses_email_local_part() {
        let user: UserPayload = serde_json::from_value(json!({
            "email": "jane.doe@example.com",
            "role": "contractor"
        }))
        .unwrap();
        let identity = user.into_identity(&UserDirectory::default());
        assert_eq!(identity.label, "jane.doe");
        assert_eq!(identity.user_id, None);
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        let response: LoginResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "user": {"email": "ceo@eoex.com", "role": "erp_ceo"}
        }))
        .unwrap();
        assert_eq!(response.token_type, "bearer");
    }
}
