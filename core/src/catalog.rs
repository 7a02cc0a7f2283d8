//! Static application catalog: which top-level applications exist, how they
//! are labelled and which modules each one declares.
//!
//! The catalog is process-wide configuration. It is validated once when it is
//! built and never mutated afterwards; session state is kept consistent with
//! it, never the other way round.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::CatalogError;

/// Identifier of a top-level application (e.g. `CRM`, `ERP`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a navigable module inside an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationEntry {
    pub id: AppId,
    pub label: String,
    /// Roles starting with this prefix are scoped to this application. `None`
    /// means only the privileged role can reach it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_prefix: Option<String>,
    pub modules: Vec<ModuleId>,
}

impl ApplicationEntry {
    pub fn new<M>(id: &str, label: &str, role_prefix: Option<&str>, modules: M) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            id: AppId::new(id),
            label: label.to_string(),
            role_prefix: role_prefix.map(str::to_string),
            modules: modules.into_iter().map(ModuleId::new).collect(),
        }
    }

    pub fn first_module(&self) -> Option<&ModuleId> {
        self.modules.first()
    }

    pub fn declares(&self, module: &ModuleId) -> bool {
        self.modules.contains(module)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<ApplicationEntry>,
}

impl Catalog {
    /// Builds a catalog after checking ids, module lists and role prefixes.
    pub fn new(entries: Vec<ApplicationEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen_apps = HashSet::new();
        for entry in &entries {
            if entry.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyAppId);
            }
            if !seen_apps.insert(&entry.id) {
                return Err(CatalogError::DuplicateApp(entry.id.clone()));
            }
            if entry.modules.is_empty() {
                return Err(CatalogError::NoModules(entry.id.clone()));
            }
            if entry
                .role_prefix
                .as_deref()
                .is_some_and(|prefix| prefix.is_empty())
            {
                return Err(CatalogError::EmptyRolePrefix(entry.id.clone()));
            }
            let mut seen_modules = HashSet::new();
            for module in &entry.modules {
                if module.as_str().trim().is_empty() {
                    return Err(CatalogError::EmptyModuleId(entry.id.clone()));
                }
                if !seen_modules.insert(module) {
                    return Err(CatalogError::DuplicateModule {
                        app: entry.id.clone(),
                        module: module.clone(),
                    });
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ApplicationEntry] {
        &self.entries
    }

    pub fn get(&self, app: &AppId) -> Option<&ApplicationEntry> {
        self.entries.iter().find(|entry| &entry.id == app)
    }

    pub fn app_ids(&self) -> impl Iterator<Item = &AppId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    pub fn label(&self, app: &AppId) -> Option<&str> {
        self.get(app).map(|entry| entry.label.as_str())
    }

    pub fn first_module(&self, app: &AppId) -> Option<&ModuleId> {
        self.get(app).and_then(ApplicationEntry::first_module)
    }

    pub fn declares_module(&self, app: &AppId, module: &ModuleId) -> bool {
        self.get(app).is_some_and(|entry| entry.declares(module))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            entries: default_entries(),
        }
    }
}

pub fn default_entries() -> Vec<ApplicationEntry> {
    vec![
        ApplicationEntry::new(
            "CRM",
            "CRM",
            Some("crm_"),
            [
                "Dashboard",
                "Campaigns",
                "Leads",
                "Opportunities",
                "Accounts",
                "Contacts",
                "Tasks",
                "Reports",
                "Calendar",
            ],
        ),
        ApplicationEntry::new(
            "STUDIO",
            "Studio",
            Some("studio_"),
            [
                "Dashboard",
                "Campaigns",
                "Leads",
                "Calendar",
                "Message Editor",
                "Contents Scheduler",
            ],
        ),
        ApplicationEntry::new(
            "ERP",
            "ERP",
            Some("erp_"),
            [
                "Dashboard",
                "Asset Manager",
                "Finances",
                "HR",
                "Strategies",
                "QA & Risk",
                "Calendar",
            ],
        ),
        ApplicationEntry::new(
            "SERVICE",
            "Service",
            Some("service_"),
            [
                "Dashboard",
                "High SLA Tickets",
                "Mid SLA Tickets",
                "Low SLA Tickets",
                "Calendar",
            ],
        ),
        ApplicationEntry::new(
            "ADMIN",
            "Admin Portal",
            None,
            ["Dashboard", "User Directory", "Audit", "Setup"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_catalog_passes_validation() {
        let built = Catalog::new(default_entries()).expect("default catalog is valid");
        assert_eq!(built, Catalog::default());
    }

    #[test]
    fn default_order_is_declaration_order() {
        let catalog = Catalog::default();
        let ids: Vec<&str> = catalog.app_ids().map(AppId::as_str).collect();
        assert_eq!(ids, vec!["CRM", "STUDIO", "ERP", "SERVICE", "ADMIN"]);
    }

    #[test]
    fn rejects_duplicate_application() {
        let err = Catalog::new(vec![
            ApplicationEntry::new("CRM", "CRM", Some("crm_"), ["Dashboard"]),
            ApplicationEntry::new("CRM", "Other", None, ["Dashboard"]),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateApp(AppId::from("CRM")));
    }

    #[test]
    fn rejects_duplicate_module() {
        let err = Catalog::new(vec![ApplicationEntry::new(
            "ERP",
            "ERP",
            Some("erp_"),
            ["HR", "HR"],
        )])
        .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateModule {
                app: AppId::from("ERP"),
                module: ModuleId::from("HR"),
            }
        );
    }

    #[test]
    fn rejects_application_without_modules() {
        let modules: [&str; 0] = [];
        let err = Catalog::new(vec![ApplicationEntry::new("X", "X", None, modules)]).unwrap_err();
        assert_eq!(err, CatalogError::NoModules(AppId::from("X")));
    }

    #[test]
    fn rejects_empty_role_prefix() {
        let err = Catalog::new(vec![ApplicationEntry::new(
            "X",
            "X",
            Some(""),
            ["Dashboard"],
        )])
        .unwrap_err();
        assert_eq!(err, CatalogError::EmptyRolePrefix(AppId::from("X")));
    }

    #[test]
    fn module_lookup_is_scoped_to_application() {
        let catalog = Catalog::default();
        assert!(catalog.declares_module(&"STUDIO".into(), &"Message Editor".into()));
        assert!(!catalog.declares_module(&"CRM".into(), &"Message Editor".into()));
        assert!(!catalog.declares_module(&"NOPE".into(), &"Dashboard".into()));
        assert_eq!(
            catalog.first_module(&"SERVICE".into()),
            Some(&ModuleId::from("Dashboard"))
        );
    }
}
