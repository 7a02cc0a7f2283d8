use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use eoex_core::RolePolicy;
use eoex_core::UserDirectory;
use eoex_core::directory::DirectoryEntry;
use eoex_core::nav::ActionApplied;
use eoex_core::nav::LoginOutcome;
use eoex_core::nav::LoginTicket;
use eoex_core::nav::NavAction;
use eoex_core::nav::NavActionId;
use eoex_core::nav::NavEvent;
use eoex_core::nav::NavSnapshot;
use eoex_core::nav::NavigationController;
use eoex_core::nav::RejectReason;
use eoex_login::Credentials;
use eoex_login::LoginResponse;
use tracing::debug;

use crate::shell::keymap::KeymapEngine;
use crate::shell::keymap::ShellCommand;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    /// Set while a request for this form is in flight.
    pub pending: Option<LoginTicket>,
    pub error: Option<String>,
}

impl LoginForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

/// Picker over the directory accounts. Row 0 is "no impersonation".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpersonationPicker {
    pub options: Vec<DirectoryEntry>,
    pub selected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    Login(LoginForm),
    Impersonate(ImpersonationPicker),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerOutcome {
    Consumed {
        action: NavActionId,
        applied: ActionApplied,
    },
    /// Only shell-local state (overlays, form input) changed.
    Ui,
    LoginRequested {
        ticket: LoginTicket,
        credentials: Credentials,
    },
    Exit,
    Unhandled,
}

/// Owns the navigation controller for the lifetime of the TUI and turns key
/// presses into navigation actions.
#[derive(Debug)]
pub struct ShellController {
    nav: NavigationController,
    keymap: KeymapEngine,
    directory: UserDirectory,
    overlay: Overlay,
    status: Option<String>,
}

impl ShellController {
    pub fn new(nav: NavigationController, directory: UserDirectory) -> Self {
        Self {
            nav,
            keymap: KeymapEngine::new(),
            directory,
            overlay: Overlay::None,
            status: None,
        }
    }

    /// Restores the persisted session, if any.
    pub fn hydrate(&mut self) -> ActionApplied {
        let applied = self.nav.hydrate();
        self.absorb_events();
        applied
    }

    pub fn snapshot(&self) -> NavSnapshot {
        self.nav.snapshot()
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn policy(&self) -> &RolePolicy {
        self.nav.policy()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.nav
    }

    pub fn handle_key_event(&mut self, event: KeyEvent) -> ControllerOutcome {
        if !matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return ControllerOutcome::Unhandled;
        }
        match self.overlay {
            Overlay::Login(_) => self.handle_login_key(event),
            Overlay::Impersonate(_) => self.handle_picker_key(event),
            Overlay::None => match self.keymap.resolve(event) {
                Some(command) => self.run_command(command),
                None => ControllerOutcome::Unhandled,
            },
        }
    }

    /// Delivers the result of the login request issued for `ticket`.
    pub fn complete_login(
        &mut self,
        ticket: LoginTicket,
        result: Result<LoginResponse, String>,
    ) -> ActionApplied {
        let outcome = match result {
            Ok(response) => {
                let (identity, token) = response.into_session(&self.directory);
                LoginOutcome::Succeeded { identity, token }
            }
            Err(message) => LoginOutcome::Failed { message },
        };
        let succeeded = matches!(outcome, LoginOutcome::Succeeded { .. });
        let applied = self.nav.complete_login(ticket, outcome);
        if let ActionApplied::Rejected(RejectReason::StaleLogin(_)) = applied {
            return applied;
        }

        if succeeded {
            if matches!(&self.overlay, Overlay::Login(form) if form.pending == Some(ticket)) {
                self.overlay = Overlay::None;
            }
            self.status = self
                .nav
                .session()
                .identity()
                .map(|identity| format!("Signed in as {}", identity.email));
        }
        self.absorb_events();
        applied
    }

    fn run_command(&mut self, command: ShellCommand) -> ControllerOutcome {
        let snapshot = self.nav.snapshot();
        match command {
            ShellCommand::Quit => ControllerOutcome::Exit,
            ShellCommand::ToggleMenu => self.apply(NavAction::MenuToggled),
            ShellCommand::NextApp | ShellCommand::PrevApp => {
                let forward = command == ShellCommand::NextApp;
                match neighbour(&snapshot.apps, |tab| tab.active, forward) {
                    Some(tab) => self.apply(NavAction::select_app(tab.id.clone())),
                    None => ControllerOutcome::Unhandled,
                }
            }
            ShellCommand::SelectApp(index) => match snapshot.apps.get(index) {
                Some(tab) => self.apply(NavAction::select_app(tab.id.clone())),
                None => ControllerOutcome::Unhandled,
            },
            ShellCommand::NextModule | ShellCommand::PrevModule => {
                let forward = command == ShellCommand::NextModule;
                let app = snapshot.active_app().map(|tab| tab.id.clone());
                match (app, neighbour(&snapshot.modules, |tab| tab.active, forward)) {
                    (Some(app), Some(tab)) => {
                        self.apply(NavAction::select_module(app, tab.id.clone()))
                    }
                    _ => ControllerOutcome::Unhandled,
                }
            }
            ShellCommand::OpenLogin => {
                if snapshot.identity.is_some() {
                    return ControllerOutcome::Unhandled;
                }
                self.overlay = Overlay::Login(LoginForm::default());
                ControllerOutcome::Ui
            }
            ShellCommand::Logout => {
                if snapshot.identity.is_none() {
                    return ControllerOutcome::Unhandled;
                }
                let outcome = self.apply(NavAction::LoggedOut);
                self.status = Some("Signed out".to_string());
                outcome
            }
            ShellCommand::OpenImpersonation => self.open_impersonation(&snapshot),
        }
    }

    fn open_impersonation(&mut self, snapshot: &NavSnapshot) -> ControllerOutcome {
        let policy = self.nav.policy();
        let Some(identity) = snapshot.identity.as_ref() else {
            return ControllerOutcome::Unhandled;
        };
        if !policy.is_privileged(&identity.role) {
            self.status = Some(format!(
                "Impersonation is limited to {}",
                policy.privileged_role()
            ));
            return ControllerOutcome::Ui;
        }
        let options: Vec<DirectoryEntry> = self
            .directory
            .impersonation_options(policy)
            .into_iter()
            .cloned()
            .collect();
        let current = self.nav.session().impersonated_role();
        let selected = options
            .iter()
            .position(|entry| Some(&entry.role) == current)
            .map_or(0, |index| index + 1);
        self.overlay = Overlay::Impersonate(ImpersonationPicker { options, selected });
        ControllerOutcome::Ui
    }

    fn handle_login_key(&mut self, event: KeyEvent) -> ControllerOutcome {
        let Overlay::Login(form) = &mut self.overlay else {
            return ControllerOutcome::Unhandled;
        };
        match event.code {
            KeyCode::Esc => {
                self.overlay = Overlay::None;
                ControllerOutcome::Ui
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.focus = match form.focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
                ControllerOutcome::Ui
            }
            KeyCode::Backspace => {
                form.focused_mut().pop();
                ControllerOutcome::Ui
            }
            KeyCode::Enter => {
                if form.pending.is_some() {
                    return ControllerOutcome::Ui;
                }
                if form.focus == LoginField::Email && form.password.is_empty() {
                    form.focus = LoginField::Password;
                    return ControllerOutcome::Ui;
                }
                let email = form.email.trim().to_string();
                if email.is_empty() {
                    form.error = Some("Enter an email address".to_string());
                    return ControllerOutcome::Ui;
                }
                let credentials = Credentials::new(email, form.password.clone());
                let ticket = self.nav.begin_login();
                form.pending = Some(ticket);
                form.error = None;
                ControllerOutcome::LoginRequested {
                    ticket,
                    credentials,
                }
            }
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                ControllerOutcome::Exit
            }
            KeyCode::Char(c) if !event.modifiers.contains(KeyModifiers::CONTROL) => {
                form.focused_mut().push(c);
                ControllerOutcome::Ui
            }
            _ => ControllerOutcome::Unhandled,
        }
    }

    fn handle_picker_key(&mut self, event: KeyEvent) -> ControllerOutcome {
        let Overlay::Impersonate(picker) = &mut self.overlay else {
            return ControllerOutcome::Unhandled;
        };
        let rows = picker.options.len() + 1;
        match event.code {
            KeyCode::Esc => {
                self.overlay = Overlay::None;
                ControllerOutcome::Ui
            }
            KeyCode::Up | KeyCode::Char('k') => {
                picker.selected = (picker.selected + rows - 1) % rows;
                ControllerOutcome::Ui
            }
            KeyCode::Down | KeyCode::Char('j') => {
                picker.selected = (picker.selected + 1) % rows;
                ControllerOutcome::Ui
            }
            KeyCode::Enter => {
                let role = picker
                    .selected
                    .checked_sub(1)
                    .and_then(|index| picker.options.get(index))
                    .map(|entry| entry.role.clone());
                self.overlay = Overlay::None;
                self.status = Some(match &role {
                    Some(role) => format!("Impersonating {role}"),
                    None => "Impersonation cleared".to_string(),
                });
                self.apply(NavAction::impersonate(role))
            }
            _ => ControllerOutcome::Unhandled,
        }
    }

    fn apply(&mut self, action: NavAction) -> ControllerOutcome {
        let id = action.id();
        let applied = self.nav.handle_action(action);
        if let ActionApplied::Rejected(reason) = &applied {
            debug!(action = %id, %reason, "shell action rejected");
        }
        self.absorb_events();
        ControllerOutcome::Consumed {
            action: id,
            applied,
        }
    }

    fn absorb_events(&mut self) {
        for event in self.nav.take_events() {
            match event {
                NavEvent::PersistFailed { message } => {
                    self.status = Some(format!("Session not saved: {message}"));
                }
                NavEvent::HydrateFailed { message } => {
                    self.status = Some(format!("Saved session unreadable: {message}"));
                }
                NavEvent::LoginFailed { message } => {
                    let text = format!("Login failed. {message}");
                    match &mut self.overlay {
                        Overlay::Login(form) => {
                            form.pending = None;
                            form.error = Some(text);
                        }
                        _ => self.status = Some(text),
                    }
                }
                NavEvent::Persisted
                | NavEvent::Reconciled { .. }
                | NavEvent::DispatchGap { .. } => {}
            }
        }
    }
}

/// Item after (or before) the active one, wrapping around. Falls back to the
/// first item when none is active.
fn neighbour<T>(items: &[T], is_active: impl Fn(&T) -> bool, forward: bool) -> Option<&T> {
    let len = items.len();
    if len == 0 {
        return None;
    }
    let index = match items.iter().position(is_active) {
        Some(current) if forward => (current + 1) % len,
        Some(current) => (current + len - 1) % len,
        None => 0,
    };
    items.get(index)
}
