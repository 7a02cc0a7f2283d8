use serde::Deserialize;
use serde::Serialize;
use std::fmt;

use crate::catalog::AppId;
use crate::catalog::ModuleId;
use crate::policy::Role;
use crate::session::AuthToken;
use crate::session::Identity;

/// Identifier for navigation actions. These strings are stable so that
/// keymaps, CLI invocations and logs can rely on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavActionId {
    #[serde(rename = "session.login")]
    Login,
    #[serde(rename = "session.logout")]
    Logout,
    #[serde(rename = "access.impersonate")]
    Impersonate,
    #[serde(rename = "nav.select_app")]
    SelectApplication,
    #[serde(rename = "nav.select_module")]
    SelectModule,
    #[serde(rename = "nav.toggle_menu")]
    ToggleMenu,
}

impl NavActionId {
    pub const fn as_str(self) -> &'static str {
        match self {
            NavActionId::Login => "session.login",
            NavActionId::Logout => "session.logout",
            NavActionId::Impersonate => "access.impersonate",
            NavActionId::SelectApplication => "nav.select_app",
            NavActionId::SelectModule => "nav.select_module",
            NavActionId::ToggleMenu => "nav.toggle_menu",
        }
    }

    /// Whether the action can change the effective role and therefore must be
    /// followed by a reconcile pass.
    pub const fn affects_role(self) -> bool {
        matches!(
            self,
            NavActionId::Login | NavActionId::Logout | NavActionId::Impersonate
        )
    }
}

impl fmt::Display for NavActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete action carrying its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id", content = "payload")]
pub enum NavAction {
    #[serde(rename = "session.login")]
    LoginSucceeded { identity: Identity, token: AuthToken },
    #[serde(rename = "session.logout")]
    LoggedOut,
    #[serde(rename = "access.impersonate")]
    ImpersonationChanged { role: Option<Role> },
    #[serde(rename = "nav.select_app")]
    ApplicationSelected { app: AppId },
    #[serde(rename = "nav.select_module")]
    ModuleSelected { app: AppId, module: ModuleId },
    #[serde(rename = "nav.toggle_menu")]
    MenuToggled,
}

impl NavAction {
    pub fn id(&self) -> NavActionId {
        match self {
            NavAction::LoginSucceeded { .. } => NavActionId::Login,
            NavAction::LoggedOut => NavActionId::Logout,
            NavAction::ImpersonationChanged { .. } => NavActionId::Impersonate,
            NavAction::ApplicationSelected { .. } => NavActionId::SelectApplication,
            NavAction::ModuleSelected { .. } => NavActionId::SelectModule,
            NavAction::MenuToggled => NavActionId::ToggleMenu,
        }
    }

    pub fn select_app(app: impl Into<AppId>) -> Self {
        NavAction::ApplicationSelected { app: app.into() }
    }

    pub fn select_module(app: impl Into<AppId>, module: impl Into<ModuleId>) -> Self {
        NavAction::ModuleSelected {
            app: app.into(),
            module: module.into(),
        }
    }

    pub fn impersonate(role: Option<Role>) -> Self {
        NavAction::ImpersonationChanged { role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn wire_ids_match_action_ids() {
        let action = NavAction::select_module("CRM", "Leads");
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value,
            json!({"id": "nav.select_module", "payload": {"app": "CRM", "module": "Leads"}})
        );
        assert_eq!(value["id"], action.id().as_str());
    }

    #[test]
    fn unit_actions_parse_without_payload() {
        let action: NavAction = serde_json::from_value(json!({"id": "nav.toggle_menu"})).unwrap();
        assert_eq!(action, NavAction::MenuToggled);
    }

    #[test]
    fn only_session_and_access_actions_affect_role() {
        assert!(NavActionId::Login.affects_role());
        assert!(NavActionId::Impersonate.affects_role());
        assert!(!NavActionId::SelectModule.affects_role());
        assert!(!NavActionId::ToggleMenu.affects_role());
    }
}
