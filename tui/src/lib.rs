// Forbid accidental stdout/stderr writes; the alternate screen owns the
// terminal while the shell runs.
#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::Result;
use color_eyre::eyre::WrapErr;
use eoex_core::DispatchTable;
use eoex_core::FileSessionStore;
use eoex_core::NavigationController;
use eoex_core::ShellConfig;
use eoex_core::UserDirectory;
use eoex_core::find_eoex_home;
use eoex_login::AuthClient;
use eoex_login::HttpAuthClient;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod app_event;
mod app_event_sender;
mod cli;
pub mod shell;
mod tui;

pub use cli::Cli;

const LOG_FILE_NAME: &str = "eoex-tui.log";

pub async fn run_main(cli: Cli) -> std::io::Result<()> {
    run_ratatui_app(cli)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))
}

async fn run_ratatui_app(cli: Cli) -> Result<()> {
    color_eyre::install()?;

    let eoex_home = find_eoex_home()?;
    let mut config = ShellConfig::load_with_env(&eoex_home)
        .wrap_err_with(|| format!("failed to load config from {}", eoex_home.display()))?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }

    let _log_guard = init_logging(&eoex_home)?;

    let store = Arc::new(FileSessionStore::new(&eoex_home));
    let nav = NavigationController::new(config.policy.clone(), DispatchTable::standard(), store);
    for (app, module) in nav.dispatch().gaps(config.policy.catalog()) {
        warn!(%app, %module, "catalog module has no renderer");
    }
    let mut shell = shell::ShellController::new(nav, UserDirectory::default());
    shell.hydrate();

    let auth: Arc<dyn AuthClient> = Arc::new(HttpAuthClient::from_config(&config)?);

    let mut terminal = tui::init()?;
    let result = app::App::run(&mut terminal, shell, auth).await;
    tui::restore()?;
    result
}

/// Logs go to `$EOEX_HOME/log/eoex-tui.log`; writing to the terminal would
/// corrupt the alternate screen.
fn init_logging(eoex_home: &Path) -> Result<WorkerGuard> {
    let log_dir = eoex_home.join("log");
    std::fs::create_dir_all(&log_dir)?;

    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    // Ensure the file is only readable and writable by the current user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_file = log_file_opts.open(log_dir.join(LOG_FILE_NAME))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("eoex_core=info,eoex_login=info,eoex_tui=info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();
    Ok(guard)
}
