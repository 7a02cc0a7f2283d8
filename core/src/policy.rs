//! Role policy: maps a role to the ordered set of applications it may open.
//!
//! Roles arrive as opaque strings from the auth service. Every access check
//! goes through [`RolePolicy::classify`], which turns the string into a
//! [`RoleScope`] against the configured catalog; callers never match on role
//! prefixes themselves.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::catalog::AppId;
use crate::catalog::Catalog;

pub const DEFAULT_PRIVILEGED_ROLE: &str = "system_admin";

/// Opaque role identifier issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "app", rename_all = "kebab-case")]
pub enum RoleScope {
    /// Full access to every application in the catalog.
    Privileged,
    /// Access to exactly one application family.
    Scoped(AppId),
    /// Recognised by nobody; sees no applications.
    Unscoped,
}

#[derive(Debug, Clone)]
pub struct RolePolicy {
    privileged_role: Role,
    catalog: Arc<Catalog>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self::new(Role::from(DEFAULT_PRIVILEGED_ROLE), Catalog::default())
    }
}

impl RolePolicy {
    pub fn new(privileged_role: Role, catalog: Catalog) -> Self {
        Self {
            privileged_role,
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn privileged_role(&self) -> &Role {
        &self.privileged_role
    }

    pub fn is_privileged(&self, role: &Role) -> bool {
        role == &self.privileged_role
    }

    /// Classifies a role against the catalog's role prefixes.
    ///
    /// Prefixes are expected to be mutually exclusive. Should a role match
    /// more than one, the first matching application in catalog declaration
    /// order wins.
    pub fn classify(&self, role: &Role) -> RoleScope {
        if self.is_privileged(role) {
            return RoleScope::Privileged;
        }
        self.catalog
            .entries()
            .iter()
            .find(|entry| {
                entry
                    .role_prefix
                    .as_deref()
                    .is_some_and(|prefix| role.as_str().starts_with(prefix))
            })
            .map_or(RoleScope::Unscoped, |entry| {
                RoleScope::Scoped(entry.id.clone())
            })
    }

    /// Ordered set of applications the role may open. Total: an absent or
    /// unrecognised role yields an empty list.
    #[must_use]
    pub fn permitted_applications(&self, role: Option<&Role>) -> Vec<AppId> {
        let Some(role) = role else {
            return Vec::new();
        };
        match self.classify(role) {
            RoleScope::Privileged => self.catalog.app_ids().cloned().collect(),
            RoleScope::Scoped(app) => vec![app],
            RoleScope::Unscoped => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_app_permitted(&self, role: Option<&Role>, app: &AppId) -> bool {
        let Some(role) = role else {
            return false;
        };
        match self.classify(role) {
            RoleScope::Privileged => self.catalog.get(app).is_some(),
            RoleScope::Scoped(scoped) => &scoped == app,
            RoleScope::Unscoped => false,
        }
    }

    /// Human label of what a role can reach, as shown in the user directory.
    pub fn scope_label(&self, role: &Role) -> String {
        match self.classify(role) {
            RoleScope::Privileged => "All Apps".to_string(),
            RoleScope::Scoped(app) => self
                .catalog
                .label(&app)
                .map_or_else(|| app.to_string(), str::to_string),
            RoleScope::Unscoped => String::new(),
        }
    }
}
