use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::AppId;
use crate::catalog::ModuleId;
use crate::nav::action::NavAction;
use crate::nav::state::LoginTicket;
use crate::policy::RolePolicy;
use crate::session::Session;

/// Read-only view of everything a guard decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    pub policy: &'a RolePolicy,
    pub session: &'a Session,
}

/// Why an action was dropped. Rejections are never surfaced to the user;
/// they leave the session untouched and are only logged.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum RejectReason {
    #[error("no authenticated identity")]
    NotAuthenticated,
    #[error("impersonation requires the privileged role")]
    ImpersonationNotPermitted,
    #[error("application '{0}' is not permitted for the effective role")]
    ApplicationNotPermitted(AppId),
    #[error("application '{0}' is not the current application")]
    ApplicationNotCurrent(AppId),
    #[error("module '{module}' is not declared by application '{app}'")]
    ModuleNotDeclared { app: AppId, module: ModuleId },
    #[error("login response for ticket {0} is stale")]
    StaleLogin(LoginTicket),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AccessGuard;

impl AccessGuard {
    pub fn validate(&self, action: &NavAction, ctx: GuardContext<'_>) -> Result<(), RejectReason> {
        let session = ctx.session;
        match action {
            NavAction::LoginSucceeded { .. } | NavAction::LoggedOut | NavAction::MenuToggled => {
                Ok(())
            }
            NavAction::ImpersonationChanged { .. } => {
                let identity = session.identity().ok_or(RejectReason::NotAuthenticated)?;
                // Checked against the authenticated role, not the effective
                // one: an impersonating admin can still change or reset it.
                if !ctx.policy.is_privileged(&identity.role) {
                    return Err(RejectReason::ImpersonationNotPermitted);
                }
                Ok(())
            }
            NavAction::ApplicationSelected { app } => {
                if !session.is_authenticated() {
                    return Err(RejectReason::NotAuthenticated);
                }
                if !ctx.policy.is_app_permitted(session.effective_role(), app) {
                    return Err(RejectReason::ApplicationNotPermitted(app.clone()));
                }
                Ok(())
            }
            NavAction::ModuleSelected { app, module } => {
                if !session.is_authenticated() {
                    return Err(RejectReason::NotAuthenticated);
                }
                if session.current_app() != Some(app) {
                    return Err(RejectReason::ApplicationNotCurrent(app.clone()));
                }
                if !ctx.policy.catalog().declares_module(app, module) {
                    return Err(RejectReason::ModuleNotDeclared {
                        app: app.clone(),
                        module: module.clone(),
                    });
                }
                Ok(())
            }
        }
    }
}
