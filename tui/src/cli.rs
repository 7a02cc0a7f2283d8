use clap::Parser;

#[derive(Parser, Debug, Default, Clone)]
#[command(version)]
pub struct Cli {
    /// Base URL of the auth API, e.g. `http://localhost:8000/api/v1`.
    /// Overrides `api_base_url` from config.toml and `EOEX_API_BASE_URL`.
    #[arg(long = "api-base-url", value_name = "URL")]
    pub api_base_url: Option<String>,
}
