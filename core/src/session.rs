use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::catalog::AppId;
use crate::catalog::ModuleId;
use crate::policy::Role;

/// Authenticated user as issued by the auth service. Replaced wholesale on
/// login and cleared on logout; never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub label: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Identity {
    pub fn new(label: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            label: label.into(),
            email: email.into(),
            role,
            user_id: None,
            tenant_id: None,
        }
    }
}

/// Bearer credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Navigation session. Only the navigation controller writes to it; every
/// other component reads it through accessors or a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) identity: Option<Identity>,
    pub(crate) token: Option<AuthToken>,
    pub(crate) current_app: Option<AppId>,
    pub(crate) current_module: Option<ModuleId>,
    pub(crate) impersonated_role: Option<Role>,
    pub(crate) menu_expanded: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            identity: None,
            token: None,
            current_app: None,
            current_module: None,
            impersonated_role: None,
            menu_expanded: true,
        }
    }
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn current_app(&self) -> Option<&AppId> {
        self.current_app.as_ref()
    }

    pub fn current_module(&self) -> Option<&ModuleId> {
        self.current_module.as_ref()
    }

    pub fn impersonated_role(&self) -> Option<&Role> {
        self.impersonated_role.as_ref()
    }

    pub fn menu_expanded(&self) -> bool {
        self.menu_expanded
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Impersonated role if set, else the identity's role.
    pub fn effective_role(&self) -> Option<&Role> {
        self.impersonated_role
            .as_ref()
            .or_else(|| self.identity.as_ref().map(|identity| &identity.role))
    }

    pub(crate) fn clear_selection(&mut self) {
        self.current_app = None;
        self.current_module = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_session_is_empty_with_menu_open() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(session.effective_role().is_none());
        assert!(session.menu_expanded());
    }

    #[test]
    fn impersonation_overrides_identity_role() {
        let mut session = Session {
            identity: Some(Identity::new(
                "System Admin",
                "system.admin@eoex.com",
                Role::from("system_admin"),
            )),
            ..Session::default()
        };
        assert_eq!(session.effective_role(), Some(&Role::from("system_admin")));

        session.impersonated_role = Some(Role::from("erp_hr_manager"));
        assert_eq!(session.effective_role(), Some(&Role::from("erp_hr_manager")));
        assert_eq!(
            session.identity().map(|identity| &identity.role),
            Some(&Role::from("system_admin"))
        );
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AuthToken::new("eyJhbGciOi.secret");
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
        assert_eq!(token.as_str(), "eyJhbGciOi.secret");
    }
}
