use clap::Parser;
use eoex_cli::AppsCli;
use eoex_cli::login::run_login;
use eoex_cli::login::run_login_status;
use eoex_cli::login::run_logout;
use eoex_cli::run_apps;
use tracing_subscriber::EnvFilter;

/// EOEX workspace shell.
///
/// If no subcommand is specified, the interactive shell starts.
#[derive(Debug, Parser)]
#[clap(
    author,
    version,
    // If a sub-command is given, ignore requirements of the default args.
    subcommand_negates_reqs = true,
    bin_name = "eoex"
)]
struct MultitoolCli {
    #[clap(flatten)]
    interactive: eoex_tui::Cli,

    #[clap(subcommand)]
    subcommand: Option<Subcommand>,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Sign in and persist the session.
    Login(LoginCommand),

    /// Remove the persisted session.
    Logout,

    /// Show who is signed in.
    Status,

    /// List the applications a role can open.
    Apps(AppsCli),

    /// Run the interactive shell.
    #[clap(visible_alias = "ui")]
    Tui(eoex_tui::Cli),
}

#[derive(Debug, Parser)]
struct LoginCommand {
    #[arg(long, value_name = "EMAIL")]
    email: String,

    /// Read from stdin when omitted.
    #[arg(long, value_name = "PASSWORD")]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = MultitoolCli::parse();

    // The interactive shell installs its own file logger.
    if !matches!(cli.subcommand, None | Some(Subcommand::Tui(_))) {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.subcommand {
        None => {
            eoex_tui::run_main(cli.interactive).await?;
        }
        Some(Subcommand::Tui(tui_cli)) => {
            eoex_tui::run_main(tui_cli).await?;
        }
        Some(Subcommand::Login(login_cli)) => {
            run_login(login_cli.email, login_cli.password).await;
        }
        Some(Subcommand::Logout) => {
            run_logout();
        }
        Some(Subcommand::Status) => {
            run_login_status();
        }
        Some(Subcommand::Apps(apps_cli)) => {
            run_apps(apps_cli)?;
        }
    }

    Ok(())
}
