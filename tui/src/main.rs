use clap::Parser;
use eoex_tui::Cli;
use eoex_tui::run_main;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    run_main(cli).await
}
