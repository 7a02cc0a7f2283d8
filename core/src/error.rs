use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::AppId;
use crate::catalog::ModuleId;

/// Structural problems found while validating an application catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog declares no applications")]
    Empty,

    #[error("application id must not be empty")]
    EmptyAppId,

    #[error("application '{0}' is declared more than once")]
    DuplicateApp(AppId),

    #[error("application '{0}' declares no modules")]
    NoModules(AppId),

    #[error("application '{0}' declares an empty module id")]
    EmptyModuleId(AppId),

    #[error("application '{app}' declares module '{module}' more than once")]
    DuplicateModule { app: AppId, module: ModuleId },

    #[error("application '{0}' declares an empty role prefix")]
    EmptyRolePrefix(AppId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("privileged role must not be empty")]
    EmptyPrivilegedRole,

    #[error("invalid application catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("could not determine home directory; set EOEX_HOME")]
    NoHome,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store contains invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
