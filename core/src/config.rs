//! Shell configuration loaded from `$EOEX_HOME/config.toml`.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::catalog::ApplicationEntry;
use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::policy::DEFAULT_PRIVILEGED_ROLE;
use crate::policy::Role;
use crate::policy::RolePolicy;

pub const CONFIG_TOML_FILE: &str = "config.toml";
pub const EOEX_HOME_ENV_VAR: &str = "EOEX_HOME";
pub const API_BASE_URL_ENV_VAR: &str = "EOEX_API_BASE_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConfigToml {
    pub api_base_url: Option<String>,
    pub privileged_role: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Replaces the built-in catalog when present.
    pub applications: Option<Vec<ApplicationEntry>>,
}

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub eoex_home: PathBuf,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub policy: RolePolicy,
}

impl ShellConfig {
    /// Loads `config.toml` from `eoex_home`; a missing file yields defaults.
    pub fn load(eoex_home: &Path) -> Result<Self, ConfigError> {
        let path = eoex_home.join(CONFIG_TOML_FILE);
        let config_toml = match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str::<ConfigToml>(&contents)
                .map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}; using defaults", path.display());
                ConfigToml::default()
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::from_toml(config_toml, eoex_home.to_path_buf())
    }

    /// Like [`ShellConfig::load`], then applies `EOEX_API_BASE_URL`.
    pub fn load_with_env(eoex_home: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(eoex_home)?;
        if let Some(url) = std::env::var(API_BASE_URL_ENV_VAR)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            config.api_base_url = url;
        }
        Ok(config)
    }

    pub fn from_toml(config_toml: ConfigToml, eoex_home: PathBuf) -> Result<Self, ConfigError> {
        let privileged_role = config_toml
            .privileged_role
            .unwrap_or_else(|| DEFAULT_PRIVILEGED_ROLE.to_string());
        if privileged_role.trim().is_empty() {
            return Err(ConfigError::EmptyPrivilegedRole);
        }
        let catalog = match config_toml.applications {
            Some(entries) => Catalog::new(entries)?,
            None => Catalog::default(),
        };
        let api_base_url = config_toml
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            eoex_home,
            api_base_url,
            request_timeout: Duration::from_secs(
                config_toml
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            policy: RolePolicy::new(Role::new(privileged_role), catalog),
        })
    }
}

/// Returns `$EOEX_HOME` if set, else `~/.eoex`. The directory is not created.
pub fn find_eoex_home() -> Result<PathBuf, ConfigError> {
    if let Some(home) = std::env::var_os(EOEX_HOME_ENV_VAR).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let mut home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
    home.push(".eoex");
    Ok(home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AppId;
    use crate::error::CatalogError;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ShellConfig::load(dir.path()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.policy.privileged_role(), &Role::from("system_admin"));
        assert_eq!(config.policy.catalog(), &Catalog::default());
    }

    #[test]
    fn applications_replace_default_catalog() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_TOML_FILE),
            r#"
api_base_url = "https://eoex.example.com/api/v1/"
privileged_role = "root"

[[applications]]
id = "OPS"
label = "Operations"
role_prefix = "ops_"
modules = ["Dashboard", "Runbooks"]

[[applications]]
id = "ADMIN"
label = "Admin Portal"
modules = ["Dashboard"]
"#,
        )
        .unwrap();

        let config = ShellConfig::load(dir.path()).unwrap();
        assert_eq!(config.api_base_url, "https://eoex.example.com/api/v1");
        let ids: Vec<&str> = config.policy.catalog().app_ids().map(AppId::as_str).collect();
        assert_eq!(ids, vec!["OPS", "ADMIN"]);
        assert_eq!(
            config.policy.permitted_applications(Some(&Role::from("ops_oncall"))),
            vec![AppId::from("OPS")]
        );
        assert_eq!(
            config.policy.permitted_applications(Some(&Role::from("root"))).len(),
            2
        );
    }

    #[test]
    fn duplicate_applications_are_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_TOML_FILE),
            r#"
[[applications]]
id = "CRM"
label = "CRM"
modules = ["Dashboard"]

[[applications]]
id = "CRM"
label = "CRM again"
modules = ["Dashboard"]
"#,
        )
        .unwrap();

        let err = ShellConfig::load(dir.path()).unwrap_err();
        assert_matches!(err, ConfigError::Catalog(CatalogError::DuplicateApp(app)) if app.as_str() == "CRM");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_TOML_FILE), "api_base_url = [").unwrap();
        assert_matches!(ShellConfig::load(dir.path()), Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_privileged_role_is_rejected() {
        let config_toml = ConfigToml {
            privileged_role: Some("  ".to_string()),
            ..ConfigToml::default()
        };
        assert_matches!(
            ShellConfig::from_toml(config_toml, PathBuf::from("/tmp")),
            Err(ConfigError::EmptyPrivilegedRole)
        );
    }
}
