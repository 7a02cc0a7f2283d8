use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyEvent;
use eoex_core::nav::LoginTicket;
use eoex_login::AuthClient;
use eoex_login::Credentials;
use ratatui::Frame;
use tokio::select;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;
use tracing::info;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::shell::ControllerOutcome;
use crate::shell::ShellController;
use crate::shell::ShellView;
use crate::tui;

pub(crate) struct App {
    shell: ShellController,
    auth: Arc<dyn AuthClient>,
    app_event_tx: AppEventSender,
}

impl App {
    pub(crate) fn new(
        shell: ShellController,
        auth: Arc<dyn AuthClient>,
        app_event_tx: AppEventSender,
    ) -> Self {
        Self {
            shell,
            auth,
            app_event_tx,
        }
    }

    pub async fn run(
        terminal: &mut tui::Terminal,
        shell: ShellController,
        auth: Arc<dyn AuthClient>,
    ) -> Result<()> {
        let (app_event_tx, mut app_event_rx) = unbounded_channel();
        let mut app = App::new(shell, auth, AppEventSender::new(app_event_tx));
        let mut terminal_events = EventStream::new();

        terminal.draw(|frame| app.draw(frame))?;
        while select! {
            Some(event) = app_event_rx.recv() => app.handle_event(event),
            Some(Ok(event)) = terminal_events.next() => app.handle_terminal_event(event),
            else => false,
        } {
            terminal.draw(|frame| app.draw(frame))?;
        }
        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let snapshot = self.shell.snapshot();
        frame.render_widget(ShellView::new(&self.shell, &snapshot), frame.area());
    }

    /// Returns `false` once the app should exit.
    pub(crate) fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::LoginRequested {
                ticket,
                credentials,
            } => {
                self.spawn_login(ticket, credentials);
            }
            AppEvent::LoginCompleted { ticket, result } => {
                self.shell.complete_login(ticket, result);
            }
            AppEvent::ExitRequest => return false,
        }
        true
    }

    fn handle_terminal_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            // Everything else only needs a redraw.
            _ => true,
        }
    }

    pub(crate) fn handle_key_event(&mut self, key_event: KeyEvent) -> bool {
        match self.shell.handle_key_event(key_event) {
            ControllerOutcome::LoginRequested {
                ticket,
                credentials,
            } => self.app_event_tx.send(AppEvent::LoginRequested {
                ticket,
                credentials,
            }),
            ControllerOutcome::Exit => self.app_event_tx.send(AppEvent::ExitRequest),
            ControllerOutcome::Consumed { .. }
            | ControllerOutcome::Ui
            | ControllerOutcome::Unhandled => {}
        }
        true
    }

    /// Runs the auth request off the event loop. Exactly one
    /// `LoginCompleted` is posted back per ticket.
    fn spawn_login(&self, ticket: LoginTicket, credentials: Credentials) {
        let auth = Arc::clone(&self.auth);
        let tx = self.app_event_tx.clone();
        info!(%ticket, email = %credentials.email, "login requested");
        tokio::spawn(async move {
            let result = auth
                .login(&credentials)
                .await
                .map_err(|err| err.to_string());
            tx.send(AppEvent::LoginCompleted { ticket, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossterm::event::KeyCode;
    use crossterm::event::KeyModifiers;
    use eoex_core::DispatchTable;
    use eoex_core::MemorySessionStore;
    use eoex_core::NavigationController;
    use eoex_core::Role;
    use eoex_core::RolePolicy;
    use eoex_core::UserDirectory;
    use eoex_login::LoginError;
    use eoex_login::LoginResponse;
    use eoex_login::UserPayload;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct FakeAuth;

    #[async_trait]
    impl AuthClient for FakeAuth {
        async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError> {
            if credentials.password != "demo" {
                return Err(LoginError::Rejected("Invalid email or password".to_string()));
            }
            Ok(LoginResponse {
                access_token: "jwt".to_string(),
                token_type: "bearer".to_string(),
                user: UserPayload {
                    user_id: None,
                    tenant_id: None,
                    email: credentials.email.clone(),
                    role: Role::from("crm_bdr"),
                },
            })
        }
    }

    fn make_test_app() -> (App, UnboundedReceiver<AppEvent>) {
        let nav = NavigationController::new(
            RolePolicy::default(),
            DispatchTable::standard(),
            Arc::new(MemorySessionStore::new()),
        );
        let shell = ShellController::new(nav, UserDirectory::default());
        let (tx, rx) = unbounded_channel();
        let app = App::new(shell, Arc::new(FakeAuth), AppEventSender::new(tx));
        (app, rx)
    }

    fn key(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn submit_login(app: &mut App, email: &str, password: &str) {
        key(app, KeyCode::Char('l'));
        for c in email.chars() {
            key(app, KeyCode::Char(c));
        }
        key(app, KeyCode::Tab);
        for c in password.chars() {
            key(app, KeyCode::Char(c));
        }
        key(app, KeyCode::Enter);
    }

    /// Pumps events until the login round-trip has been delivered back.
    async fn drain_login(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
        while let Some(event) = rx.recv().await {
            let done = matches!(event, AppEvent::LoginCompleted { .. });
            app.handle_event(event);
            if done {
                break;
            }
        }
    }

    #[tokio::test]
    async fn login_round_trip_signs_in() {
        let (mut app, mut rx) = make_test_app();
        submit_login(&mut app, "bdr@eoex.com", "demo");
        drain_login(&mut app, &mut rx).await;

        let snapshot = app.shell.snapshot();
        let identity = snapshot.identity.as_ref().expect("signed in");
        assert_eq!(identity.label, "Business Development");
        assert_eq!(
            snapshot.active_app().map(|tab| tab.label.clone()),
            Some("CRM".to_string())
        );
    }

    #[tokio::test]
    async fn rejected_login_stays_signed_out() {
        let (mut app, mut rx) = make_test_app();
        submit_login(&mut app, "bdr@eoex.com", "nope");
        drain_login(&mut app, &mut rx).await;
        assert!(app.shell.snapshot().identity.is_none());
    }

    #[tokio::test]
    async fn quit_posts_exit_request() {
        let (mut app, mut rx) = make_test_app();
        key(&mut app, KeyCode::Char('q'));
        let event = rx.recv().await.expect("event");
        assert!(!app.handle_event(event));
    }
}
