pub mod apps_cmd;
pub mod login;

pub use apps_cmd::AppsCli;
pub use apps_cmd::run_apps;
