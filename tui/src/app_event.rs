use eoex_core::nav::LoginTicket;
use eoex_login::Credentials;
use eoex_login::LoginResponse;

#[derive(Debug)]
pub(crate) enum AppEvent {
    /// Send credentials to the auth service. The result comes back as
    /// `LoginCompleted` carrying the same ticket.
    LoginRequested {
        ticket: LoginTicket,
        credentials: Credentials,
    },

    LoginCompleted {
        ticket: LoginTicket,
        result: Result<LoginResponse, String>,
    },

    /// Request to exit the application gracefully.
    ExitRequest,
}
