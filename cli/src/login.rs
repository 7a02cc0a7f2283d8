use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use anyhow::anyhow;
use anyhow::bail;
use eoex_core::DispatchTable;
use eoex_core::FileSessionStore;
use eoex_core::Identity;
use eoex_core::NavEvent;
use eoex_core::NavigationController;
use eoex_core::SessionStore;
use eoex_core::ShellConfig;
use eoex_core::UserDirectory;
use eoex_core::find_eoex_home;
use eoex_core::nav::LoginOutcome;
use eoex_login::AuthClient;
use eoex_login::Credentials;
use eoex_login::HttpAuthClient;
use tracing::info;

/// Authenticates against the configured API and persists the session the
/// same way the interactive shell does.
pub async fn login_with_password(
    config: &ShellConfig,
    auth: &dyn AuthClient,
    credentials: Credentials,
) -> anyhow::Result<Identity> {
    let store = Arc::new(FileSessionStore::new(&config.eoex_home));
    let mut nav =
        NavigationController::new(config.policy.clone(), DispatchTable::standard(), store);
    let directory = UserDirectory::default();

    let ticket = nav.begin_login();
    let outcome = match auth.login(&credentials).await {
        Ok(response) => {
            let (identity, token) = response.into_session(&directory);
            LoginOutcome::Succeeded { identity, token }
        }
        Err(err) => LoginOutcome::Failed {
            message: err.to_string(),
        },
    };
    nav.complete_login(ticket, outcome);

    for event in nav.take_events() {
        match event {
            NavEvent::LoginFailed { message } => bail!(message),
            NavEvent::PersistFailed { message } => bail!("session not saved: {message}"),
            _ => {}
        }
    }
    nav.session()
        .identity()
        .cloned()
        .ok_or_else(|| anyhow!("login did not produce a session"))
}

pub async fn run_login(email: String, password: Option<String>) -> ! {
    let config = load_config_or_exit();

    let password = match password {
        Some(password) => password,
        None => match read_password_from_stdin() {
            Ok(password) => password,
            Err(e) => {
                eprintln!("Error reading password: {e}");
                std::process::exit(1);
            }
        },
    };

    let auth = match HttpAuthClient::from_config(&config) {
        Ok(auth) => auth,
        Err(e) => {
            eprintln!("Error logging in: {e}");
            std::process::exit(1);
        }
    };

    match login_with_password(&config, &auth, Credentials::new(email, password)).await {
        Ok(identity) => {
            info!(email = %identity.email, role = %identity.role, "logged in");
            eprintln!(
                "Successfully logged in as {} ({})",
                identity.email, identity.role
            );
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error logging in: {e}");
            std::process::exit(1);
        }
    }
}

pub fn run_login_status() -> ! {
    let config = load_config_or_exit();

    match FileSessionStore::new(&config.eoex_home).load() {
        Ok(Some(session)) => {
            eprintln!(
                "Logged in as {} ({})",
                session.user.email, session.user.role
            );
            std::process::exit(0);
        }
        Ok(None) => {
            eprintln!("Not logged in");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error checking login status: {e}");
            std::process::exit(1);
        }
    }
}

/// Signs out through the navigation controller, the same path the
/// interactive shell uses. Returns whether a session was present.
pub fn logout(config: &ShellConfig) -> anyhow::Result<bool> {
    let store = Arc::new(FileSessionStore::new(&config.eoex_home));
    let mut nav =
        NavigationController::new(config.policy.clone(), DispatchTable::standard(), store);
    nav.hydrate();
    let was_signed_in = nav.session().is_authenticated();
    nav.logout();

    for event in nav.take_events() {
        if let NavEvent::PersistFailed { message } = event {
            bail!(message);
        }
    }
    Ok(was_signed_in)
}

pub fn run_logout() -> ! {
    let config = load_config_or_exit();

    match logout(&config) {
        Ok(true) => {
            info!("logged out");
            eprintln!("Successfully logged out");
            std::process::exit(0);
        }
        Ok(false) => {
            eprintln!("Not logged in");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error logging out: {e}");
            std::process::exit(1);
        }
    }
}

pub(crate) fn load_config() -> anyhow::Result<ShellConfig> {
    let eoex_home = find_eoex_home()?;
    ShellConfig::load_with_env(&eoex_home)
        .with_context(|| format!("failed to load config from {}", eoex_home.display()))
}

fn load_config_or_exit() -> ShellConfig {
    match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading configuration: {err:#}");
            std::process::exit(1)
        }
    }
}

fn read_password_from_stdin() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("no password provided on stdin");
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use eoex_core::Role;
    use eoex_login::LoginError;
    use eoex_login::LoginResponse;
    use eoex_login::UserPayload;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct StaticAuth(Result<Role, String>);

    #[async_trait]
    impl AuthClient for StaticAuth {
        async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError> {
            match &self.0 {
                Ok(role) => Ok(LoginResponse {
                    access_token: "jwt".to_string(),
                    token_type: "bearer".to_string(),
                    user: UserPayload {
                        user_id: Some("7".to_string()),
                        tenant_id: None,
                        email: credentials.email.clone(),
                        role: role.clone(),
                    },
                }),
                Err(message) => Err(LoginError::Rejected(message.clone())),
            }
        }
    }

    fn config(home: &TempDir) -> ShellConfig {
        ShellConfig::load(home.path()).expect("default config")
    }

    #[tokio::test]
    async fn successful_login_persists_session() {
        let home = TempDir::new().expect("tempdir");
        let config = config(&home);
        let auth = StaticAuth(Ok(Role::from("erp_ceo")));

        let identity = login_with_password(&config, &auth, Credentials::new("ceo@eoex.com", "pw"))
            .await
            .expect("login");
        assert_eq!(identity.label, "CEO");

        let saved = FileSessionStore::new(home.path())
            .load()
            .expect("load")
            .expect("session saved");
        assert_eq!(saved.user, identity);
        assert_eq!(saved.token.as_str(), "jwt");
    }

    #[tokio::test]
    async fn logout_clears_session_through_controller() {
        let home = TempDir::new().expect("tempdir");
        let config = config(&home);
        let auth = StaticAuth(Ok(Role::from("crm_bdr")));
        login_with_password(&config, &auth, Credentials::new("bdr@eoex.com", "pw"))
            .await
            .expect("login");

        assert!(logout(&config).expect("logout"));
        assert_eq!(FileSessionStore::new(home.path()).load().expect("load"), None);
        assert!(!logout(&config).expect("second logout"));
    }

    #[test]
    fn logout_removes_unreadable_session() {
        let home = TempDir::new().expect("tempdir");
        std::fs::write(home.path().join("session.json"), "{not json").expect("write");

        assert!(!logout(&config(&home)).expect("logout"));
        assert!(!home.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn rejected_login_reports_message_and_saves_nothing() {
        let home = TempDir::new().expect("tempdir");
        let config = config(&home);
        let auth = StaticAuth(Err("Invalid email or password".to_string()));

        let err = login_with_password(&config, &auth, Credentials::new("ceo@eoex.com", "bad"))
            .await
            .expect_err("rejected");
        assert_eq!(err.to_string(), "Invalid email or password");
        assert_eq!(FileSessionStore::new(home.path()).load().expect("load"), None);
    }
}
