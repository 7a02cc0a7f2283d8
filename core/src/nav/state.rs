//! Navigation state machine.
//!
//! Every user intent enters through [`NavigationController::handle_action`].
//! The controller validates it with [`AccessGuard`], applies it to the owned
//! [`Session`], and repairs the selection whenever the effective role may
//! have changed. Invalid requests are dropped without touching the session.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::catalog::AppId;
use crate::catalog::ModuleId;
use crate::dispatch::DispatchTable;
use crate::dispatch::Resolution;
use crate::dispatch::ViewKind;
use crate::nav::action::NavAction;
use crate::nav::action::NavActionId;
use crate::nav::event::NavEvent;
use crate::nav::guard::AccessGuard;
use crate::nav::guard::GuardContext;
use crate::nav::guard::RejectReason;
use crate::nav::snapshot::AppTab;
use crate::nav::snapshot::ModuleTab;
use crate::nav::snapshot::NavSnapshot;
use crate::nav::snapshot::ViewState;
use crate::policy::Role;
use crate::policy::RolePolicy;
use crate::session::AuthToken;
use crate::session::Identity;
use crate::session::Session;
use crate::store::PersistedSession;
use crate::store::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionApplied {
    NoChange,
    StateChanged,
    Rejected(RejectReason),
}

/// Identifies the single outstanding authentication request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginTicket(u64);

impl fmt::Display for LoginTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of an authentication round-trip, as delivered back to the
/// controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Succeeded { identity: Identity, token: AuthToken },
    Failed { message: String },
}

#[derive(Debug)]
pub struct NavigationController {
    session: Session,
    policy: RolePolicy,
    dispatch: DispatchTable<ViewKind>,
    store: Arc<dyn SessionStore>,
    guard: AccessGuard,
    events: Vec<NavEvent>,
    last_ticket: u64,
    pending_login: Option<LoginTicket>,
}

impl NavigationController {
    pub fn new(
        policy: RolePolicy,
        dispatch: DispatchTable<ViewKind>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            session: Session::default(),
            policy,
            dispatch,
            store,
            guard: AccessGuard,
            events: Vec::new(),
            last_ticket: 0,
            pending_login: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }

    pub fn dispatch(&self) -> &DispatchTable<ViewKind> {
        &self.dispatch
    }

    pub fn effective_role(&self) -> Option<&Role> {
        self.session.effective_role()
    }

    pub fn permitted_applications(&self) -> Vec<AppId> {
        self.policy
            .permitted_applications(self.session.effective_role())
    }

    pub fn take_events(&mut self) -> Vec<NavEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_login(&self) -> Option<LoginTicket> {
        self.pending_login
    }

    /// Restores credentials from the session store. Called once at startup.
    pub fn hydrate(&mut self) -> ActionApplied {
        let persisted = match self.store.load() {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return ActionApplied::NoChange,
            Err(err) => {
                warn!("failed to read persisted session: {err}");
                self.events.push(NavEvent::HydrateFailed {
                    message: err.to_string(),
                });
                return ActionApplied::NoChange;
            }
        };
        info!(
            email = %persisted.user.email,
            role = %persisted.user.role,
            "restored persisted session"
        );
        self.session = Session {
            menu_expanded: self.session.menu_expanded,
            identity: Some(persisted.user),
            token: Some(persisted.token),
            ..Session::default()
        };
        self.reconcile(false);
        self.note_dispatch_gap();
        ActionApplied::StateChanged
    }

    /// Issues a ticket for a new authentication request. Any previously
    /// issued ticket becomes stale.
    pub fn begin_login(&mut self) -> LoginTicket {
        self.last_ticket += 1;
        let ticket = LoginTicket(self.last_ticket);
        self.pending_login = Some(ticket);
        debug!(%ticket, "login started");
        ticket
    }

    /// Applies the outcome of the request identified by `ticket`. Responses
    /// for anything but the outstanding ticket are discarded.
    pub fn complete_login(&mut self, ticket: LoginTicket, outcome: LoginOutcome) -> ActionApplied {
        if self.pending_login != Some(ticket) {
            debug!(%ticket, "discarding stale login response");
            return ActionApplied::Rejected(RejectReason::StaleLogin(ticket));
        }
        self.pending_login = None;
        match outcome {
            LoginOutcome::Succeeded { identity, token } => {
                self.handle_action(NavAction::LoginSucceeded { identity, token })
            }
            LoginOutcome::Failed { message } => {
                info!(%ticket, "login failed: {message}");
                self.events.push(NavEvent::LoginFailed { message });
                ActionApplied::NoChange
            }
        }
    }

    pub fn handle_action(&mut self, action: NavAction) -> ActionApplied {
        let action_id = action.id();
        let ctx = GuardContext {
            policy: &self.policy,
            session: &self.session,
        };
        if let Err(reason) = self.guard.validate(&action, ctx) {
            debug!(action = %action_id, %reason, "navigation action rejected");
            return ActionApplied::Rejected(reason);
        }

        let before = self.session.clone();
        match action {
            NavAction::LoginSucceeded { identity, token } => self.apply_login(identity, token),
            NavAction::LoggedOut => self.apply_logout(),
            NavAction::ImpersonationChanged { role } => self.apply_impersonation(role),
            NavAction::ApplicationSelected { app } => self.apply_select_app(app),
            NavAction::ModuleSelected { module, .. } => {
                self.session.current_module = Some(module);
            }
            NavAction::MenuToggled => {
                self.session.menu_expanded = !self.session.menu_expanded;
            }
        }
        if action_id.affects_role() {
            // A changed impersonation starts over at the first permitted
            // application.
            let restart = action_id == NavActionId::Impersonate
                && self.session.impersonated_role != before.impersonated_role;
            self.reconcile(restart);
        }

        if self.session == before {
            return ActionApplied::NoChange;
        }
        if self.session.current_app != before.current_app
            || self.session.current_module != before.current_module
        {
            self.note_dispatch_gap();
        }
        ActionApplied::StateChanged
    }

    pub fn login(&mut self, identity: Identity, token: AuthToken) -> ActionApplied {
        self.handle_action(NavAction::LoginSucceeded { identity, token })
    }

    pub fn logout(&mut self) -> ActionApplied {
        self.handle_action(NavAction::LoggedOut)
    }

    pub fn impersonate(&mut self, role: Option<Role>) -> ActionApplied {
        self.handle_action(NavAction::ImpersonationChanged { role })
    }

    pub fn select_application(&mut self, app: AppId) -> ActionApplied {
        self.handle_action(NavAction::ApplicationSelected { app })
    }

    pub fn select_module(&mut self, app: AppId, module: ModuleId) -> ActionApplied {
        self.handle_action(NavAction::ModuleSelected { app, module })
    }

    pub fn toggle_menu(&mut self) -> ActionApplied {
        self.handle_action(NavAction::MenuToggled)
    }

    fn apply_login(&mut self, identity: Identity, token: AuthToken) {
        info!(email = %identity.email, role = %identity.role, "login applied");
        let persisted = PersistedSession {
            token: token.clone(),
            user: identity.clone(),
        };
        self.pending_login = None;
        self.session.identity = Some(identity);
        self.session.token = Some(token);
        self.session.impersonated_role = None;
        self.session.clear_selection();
        match self.store.save(&persisted) {
            Ok(()) => self.events.push(NavEvent::Persisted),
            Err(err) => {
                warn!("failed to persist session: {err}");
                self.events.push(NavEvent::PersistFailed {
                    message: err.to_string(),
                });
            }
        }
    }

    fn apply_logout(&mut self) {
        if self.session.is_authenticated() {
            info!("logout applied");
        }
        self.pending_login = None;
        self.session.identity = None;
        self.session.token = None;
        self.session.impersonated_role = None;
        self.session.clear_selection();
        match self.store.clear() {
            Ok(_) => self.events.push(NavEvent::Persisted),
            Err(err) => {
                warn!("failed to clear persisted session: {err}");
                self.events.push(NavEvent::PersistFailed {
                    message: err.to_string(),
                });
            }
        }
    }

    fn apply_impersonation(&mut self, role: Option<Role>) {
        // Impersonating the privileged role is the same as not impersonating.
        let role = role.filter(|role| !self.policy.is_privileged(role));
        match &role {
            Some(role) => info!(%role, "impersonation enabled"),
            None if self.session.impersonated_role.is_some() => info!("impersonation cleared"),
            None => {}
        }
        self.session.impersonated_role = role;
    }

    fn apply_select_app(&mut self, app: AppId) {
        self.session.current_module = self.policy.catalog().first_module(&app).cloned();
        self.session.current_app = Some(app);
    }

    /// Restores the selection invariants after the effective role changed:
    /// the current application must be permitted and the current module must
    /// belong to it. With `restart`, the selection always moves to the first
    /// permitted application and its first module.
    fn reconcile(&mut self, restart: bool) {
        if !self.session.is_authenticated() {
            self.session.clear_selection();
            return;
        }
        let permitted = self.permitted_applications();
        let from = self.session.current_app.clone();
        let app_still_permitted =
            !restart && from.as_ref().is_some_and(|app| permitted.contains(app));

        if !app_still_permitted {
            let next = permitted.into_iter().next();
            self.session.current_module = next
                .as_ref()
                .and_then(|app| self.policy.catalog().first_module(app))
                .cloned();
            self.session.current_app = next;
            if self.session.current_app.is_none() {
                info!(
                    role = ?self.session.effective_role(),
                    "no applications available for role"
                );
            }
        } else if let Some(app) = self.session.current_app.as_ref() {
            let module_declared = self
                .session
                .current_module
                .as_ref()
                .is_some_and(|module| self.policy.catalog().declares_module(app, module));
            if !module_declared {
                self.session.current_module = self.policy.catalog().first_module(app).cloned();
            }
        }

        if from != self.session.current_app {
            debug!(from = ?from, to = ?self.session.current_app, "selection reconciled");
            self.events.push(NavEvent::Reconciled {
                from,
                to: self.session.current_app.clone(),
            });
        }
    }

    fn note_dispatch_gap(&mut self) {
        let (Some(app), Some(module)) = (
            self.session.current_app.as_ref(),
            self.session.current_module.as_ref(),
        ) else {
            return;
        };
        if let Resolution::NotFound = self.dispatch.resolve(app, module) {
            warn!(%app, %module, "no renderer registered for module");
            self.events.push(NavEvent::DispatchGap {
                app: app.clone(),
                module: module.clone(),
            });
        }
    }

    pub fn snapshot(&self) -> NavSnapshot {
        let Some(identity) = self.session.identity() else {
            return NavSnapshot::signed_out(self.session.menu_expanded);
        };
        let catalog = self.policy.catalog();
        let current_app = self.session.current_app();
        let current_module = self.session.current_module();

        let apps = self
            .permitted_applications()
            .into_iter()
            .map(|id| AppTab {
                label: catalog.label(&id).unwrap_or(id.as_str()).to_string(),
                active: current_app == Some(&id),
                id,
            })
            .collect();
        let modules = current_app
            .and_then(|app| catalog.get(app))
            .map(|entry| {
                entry
                    .modules
                    .iter()
                    .map(|module| ModuleTab {
                        id: module.clone(),
                        active: current_module == Some(module),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let view = match (current_app, current_module) {
            (Some(app), Some(module)) => match self.dispatch.resolve(app, module) {
                Resolution::Found(view) => ViewState::Module {
                    app: app.clone(),
                    module: module.clone(),
                    view: view.clone(),
                },
                Resolution::NotFound => ViewState::ModuleUnavailable {
                    app: app.clone(),
                    module: module.clone(),
                },
            },
            _ => ViewState::NoApplications,
        };

        NavSnapshot {
            identity: Some(identity.clone()),
            effective_role: self.session.effective_role().cloned(),
            impersonating: self.session.impersonated_role().is_some(),
            apps,
            modules,
            menu_expanded: self.session.menu_expanded,
            view,
        }
    }
}
